//! Delivers built commands to hardware.

use std::future::Future;
use std::sync::Arc;

use hestia_domain::device::Device;
use hestia_domain::error::HestiaError;

use super::BuiltCommand;

pub trait Transport: Send + Sync {
    /// Transmit `command` to `device`.
    ///
    /// Failures are reported as [`HestiaError::Transport`].
    fn send(
        &self,
        device: &Device,
        command: &BuiltCommand,
    ) -> impl Future<Output = Result<(), HestiaError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        device: &Device,
        command: &BuiltCommand,
    ) -> impl Future<Output = Result<(), HestiaError>> + Send {
        (**self).send(device, command)
    }
}
