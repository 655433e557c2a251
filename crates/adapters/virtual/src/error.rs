//! Virtual bridge error types.

use hestia_domain::error::HestiaError;

#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    #[error("level {0} is outside 0..=100")]
    LevelOutOfRange(f32),

    #[error("malformed payload: {0:?}")]
    MalformedPayload(String),

    #[error("device {0} is not served by the virtual bridge")]
    UnknownDevice(String),

    #[error("bridge link failed")]
    Link(#[from] std::io::Error),
}

impl From<VirtualError> for HestiaError {
    fn from(err: VirtualError) -> Self {
        Self::Transport(Box::new(err))
    }
}
