use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether the failure happened while moving bytes over the wire.
    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Transport(_) | BridgeError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
