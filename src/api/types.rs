//! Common session types and the error taxonomy

use crate::core::ERROR_NAMESPACE;
use crate::hardware::DriverError;
use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Failures raised by session operations.
///
/// Each variant maps to a stable symbolic name at the bus edge; driver
/// failures pass through untranslated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Connect while a driver is open
    #[error("Module is already connected.")]
    AlreadyConnected,
    /// Operation needs an open driver
    #[error("Module is not connected.")]
    NotConnected,
    /// Required field missing or empty
    #[error("{0}")]
    Value(String),
    /// Field present with the wrong shape
    #[error("{0}")]
    Type(String),
    /// Operation declared by the interface but not provided
    #[error("Function not supported.")]
    NotImplemented,
    /// Active configuration cannot be applied
    #[error("Invalid {parameter}: {reason}")]
    Configuration {
        parameter: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Error class, independent of the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection state does not allow the operation
    Io,
    Value,
    Type,
    NotImplemented,
    Configuration,
    Driver,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::AlreadyConnected | SessionError::NotConnected => ErrorKind::Io,
            SessionError::Value(_) => ErrorKind::Value,
            SessionError::Type(_) => ErrorKind::Type,
            SessionError::NotImplemented => ErrorKind::NotImplemented,
            SessionError::Configuration { .. } => ErrorKind::Configuration,
            SessionError::Driver(_) => ErrorKind::Driver,
        }
    }

    /// Stable identifier used when the error crosses the bus
    pub fn symbolic_name(&self) -> String {
        match self {
            SessionError::Driver(err) => err.symbolic_name(),
            other => {
                let suffix = match other.kind() {
                    ErrorKind::Io => "IOError",
                    ErrorKind::Value => "ValueError",
                    ErrorKind::Type => "TypeError",
                    ErrorKind::NotImplemented => "NotImplemented",
                    ErrorKind::Configuration => "ConfigurationError",
                    ErrorKind::Driver => "DriverError",
                };
                format!("{}.{}", ERROR_NAMESPACE, suffix)
            }
        }
    }

    pub(crate) fn configuration(parameter: &'static str, reason: impl Into<String>) -> Self {
        SessionError::Configuration {
            parameter,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbolic_names() {
        assert_eq!(SessionError::AlreadyConnected.symbolic_name(), "org.agile-rfm69.IOError");
        assert_eq!(SessionError::NotConnected.symbolic_name(), "org.agile-rfm69.IOError");
        assert_eq!(
            SessionError::Value("x".to_string()).symbolic_name(),
            "org.agile-rfm69.ValueError"
        );
        assert_eq!(
            SessionError::Type("x".to_string()).symbolic_name(),
            "org.agile-rfm69.TypeError"
        );
        assert_eq!(
            SessionError::NotImplemented.symbolic_name(),
            "org.agile-rfm69.NotImplemented"
        );
        assert_eq!(
            SessionError::configuration("channel", "bad").symbolic_name(),
            "org.agile-rfm69.ConfigurationError"
        );
    }

    #[test]
    fn test_driver_errors_pass_through() {
        let driver = DriverError::RegisterWrite { address: 0x02 };
        let err: SessionError = driver.clone().into();
        assert_eq!(err.kind(), ErrorKind::Driver);
        assert_eq!(err.to_string(), driver.to_string());
        assert_eq!(err.symbolic_name(), "org.agile-rfm69.DriverError");
    }

    #[test]
    fn test_messages() {
        assert_eq!(SessionError::AlreadyConnected.to_string(), "Module is already connected.");
        assert_eq!(SessionError::NotConnected.to_string(), "Module is not connected.");
        assert_eq!(SessionError::NotImplemented.to_string(), "Function not supported.");
    }
}
