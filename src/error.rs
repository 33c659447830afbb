use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that end a run without publishing a decision.
///
/// Anything not covered here travels as a plain `anyhow::Error` and is
/// reported the same way by the binary.
#[derive(Debug, Error)]
pub enum GateError {
    /// A required input is missing or an input could not be understood.
    /// Raised before any classification happens.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A GitHub API call returned a non-success status or an unreadable body.
    #[error("{operation} failed")]
    Host {
        operation: &'static str,
        #[source]
        source: BoxError,
    },
}

impl GateError {
    pub fn config(message: impl Into<String>) -> Self {
        GateError::Configuration(message.into())
    }

    pub fn host(operation: &'static str, source: impl Into<BoxError>) -> Self {
        GateError::Host {
            operation,
            source: source.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, GateError::Configuration(_))
    }

    pub fn is_host(&self) -> bool {
        matches!(self, GateError::Host { .. })
    }
}
