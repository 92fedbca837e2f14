use core_shm::SlotLayoutError;
use thiserror::Error;

/// Error taxonomy shared across the bridge.
///
/// Message-based commands surface these as human-readable strings in the
/// reply's `error` field; slot-based commands surface only the numeric
/// failure sentinel, so no variant ever crosses that channel.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("init called twice")]
    AlreadyInitialized,

    #[error("not yet initialized")]
    NotInitialized,

    #[error("unknown session id {0}")]
    UnknownSession(u64),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("expecting {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("operation failed: {0}")]
    OperationFailed(String),
}

impl From<SlotLayoutError> for BridgeError {
    fn from(err: SlotLayoutError) -> Self {
        BridgeError::TypeMismatch {
            expected: "8-byte slot region".to_string(),
            got: format!("{}-byte region", err.0),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
