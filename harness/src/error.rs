use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Faults that abort the evaluation of one parameter set.
///
/// A decrypted value that disagrees with the reference is not an error: it
/// is reported as a failed verdict in the sweep and probe results.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("parameter validation failed: {0}")]
    ParameterValidation(String),
    #[error("depth exhausted at level {level}")]
    DepthExhaustion { level: usize },
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Consistent parameters that exceed what this harness is able to run.
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Engine(hedist_core::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<hedist_core::Error> for HarnessError {
    fn from(err: hedist_core::Error) -> Self {
        match err {
            hedist_core::Error::InvalidParameters(msg) => HarnessError::ParameterValidation(msg),
            hedist_core::Error::DepthExhausted { level } => HarnessError::DepthExhaustion { level },
            hedist_core::Error::KeyGeneration(msg) => HarnessError::KeyGeneration(msg),
            err => HarnessError::Engine(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_harness_taxonomy() {
        assert!(matches!(
            HarnessError::from(hedist_core::Error::DepthExhausted { level: 0 }),
            HarnessError::DepthExhaustion { level: 0 }
        ));
        assert!(matches!(
            HarnessError::from(hedist_core::Error::InvalidParameters("q".into())),
            HarnessError::ParameterValidation(_)
        ));
        assert!(matches!(
            HarnessError::from(hedist_core::Error::MissingRelinearizationKey),
            HarnessError::Engine(hedist_core::Error::MissingRelinearizationKey)
        ));
    }
}
