//! Result algebra for every public operation.
//!
//! Nothing in this crate reports failure by panicking. Every operation on the
//! facade returns a [`RandomResult`], whose error side is a typed, inspectable
//! [`RandomError`]. Callers decide whether to retry, substitute a default, or
//! abort. Composition uses the ordinary `Result` combinators (`map`,
//! `and_then`, `?`).

use alloc::string::{String, ToString};
use core::fmt;

use crate::entropy::SourceError;

/// Outcome of every public operation.
pub type RandomResult<T> = Result<T, RandomError>;

/// Category of a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No candidate source in the fallback chain could be committed.
    InitializationFailure,
    /// The committed source failed while serving a request.
    GenerationFailure,
    /// A precondition on an argument was violated. No entropy was consumed.
    InvalidParameter {
        /// Argument name, e.g. `"bound"`.
        name: &'static str,
        /// Offending value, rendered for diagnostics.
        value: String,
    },
    /// The platform has no candidate sources at all.
    UnsupportedPlatform,
    /// A host resource (memory, handles) could not be obtained.
    InsufficientResources {
        /// Which resource ran out.
        resource: &'static str,
    },
}

impl ErrorKind {
    /// Stable status code used at the C boundary.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::InitializationFailure => 1,
            ErrorKind::GenerationFailure => 2,
            ErrorKind::InvalidParameter { .. } => 3,
            ErrorKind::UnsupportedPlatform => 4,
            ErrorKind::InsufficientResources { .. } => 5,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InitializationFailure => write!(f, "initialization failure"),
            ErrorKind::GenerationFailure => write!(f, "generation failure"),
            ErrorKind::InvalidParameter { name, value } => {
                write!(f, "invalid parameter {} = {}", name, value)
            }
            ErrorKind::UnsupportedPlatform => write!(f, "unsupported platform"),
            ErrorKind::InsufficientResources { resource } => {
                write!(f, "insufficient resources: {}", resource)
            }
        }
    }
}

/// A failed operation: its kind, a message, and the source failure behind it
/// when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomError {
    kind: ErrorKind,
    message: String,
    cause: Option<SourceError>,
}

impl RandomError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches the originating source failure.
    pub fn with_cause(mut self, cause: SourceError) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn initialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InitializationFailure, message)
    }

    /// Wraps a source failure observed while serving a request.
    pub fn generation(source: &'static str, cause: SourceError) -> Self {
        Self::new(
            ErrorKind::GenerationFailure,
            alloc::format!("{} failed: {}", source, cause),
        )
        .with_cause(cause)
    }

    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::InvalidParameter {
                name,
                value: value.to_string(),
            },
            message,
        )
    }

    pub fn unsupported_platform(platform: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedPlatform,
            alloc::format!("no entropy source candidates for {}", platform),
        )
    }

    pub fn insufficient(resource: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientResources { resource }, message)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&SourceError> {
        self.cause.as_ref()
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidParameter { .. })
    }
}

impl fmt::Display for RandomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RandomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::SourceErrorKind;
    use std::error::Error;

    #[test]
    fn test_generation_preserves_cause() {
        let cause = SourceError::with_code(SourceErrorKind::WouldBlock, 11);
        let err = RandomError::generation("getrandom", cause);

        assert_eq!(err.kind(), &ErrorKind::GenerationFailure);
        assert_eq!(err.cause(), Some(&cause));
        assert!(err.source().is_some());
        assert!(err.message().contains("getrandom"));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = RandomError::invalid_parameter("bound", -3, "bound must be positive");
        assert!(err.is_invalid_parameter());
        assert_eq!(
            err.to_string(),
            "invalid parameter bound = -3: bound must be positive"
        );
        assert_eq!(err.kind().code(), 3);
    }

    #[test]
    fn test_map_and_then_compose() {
        let ok: RandomResult<i32> = Ok(4);
        assert_eq!(ok.map(|v| v * 2).and_then(|v| Ok::<_, RandomError>(v + 1)), Ok(9));

        let failed: RandomResult<i32> = Err(RandomError::initialization("none"));
        assert!(failed.map(|v| v * 2).is_err());
    }
}
