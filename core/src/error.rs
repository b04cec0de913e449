use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("multiplicative depth exhausted: operand at level {level} has no modulus left to consume")]
    DepthExhausted { level: usize },
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    #[error("multiplication requires a relinearization key")]
    MissingRelinearizationKey,
    #[error("operand mismatch: {0}")]
    Mismatch(String),
    #[error("encoding failed: {0}")]
    Encoding(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}
