//! Connector port — opens the byte stream a device reports on.
//!
//! Vendor handshakes and authentication happen behind this trait; the core
//! only sees bytes, which it frames into lines.

use std::future::Future;

use hestia_domain::device::Device;
use hestia_domain::error::HestiaError;
use tokio::io::AsyncRead;

pub trait Connector: Send + Sync {
    type Stream: AsyncRead + Unpin + Send + 'static;

    fn connect(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<Self::Stream, HestiaError>> + Send;
}
