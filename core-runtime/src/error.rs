use thiserror::Error;

/// Errors from the ambient runtime layer.
///
/// Configuration problems carry actionable messages pointing at the
/// builder call that fixes them; logging errors mostly mean the global
/// subscriber was installed twice.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
