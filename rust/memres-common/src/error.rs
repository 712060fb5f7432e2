use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns `true` if this is an upstream allocation failure.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::AllocationFailure { .. })
    }

    /// Returns `true` if this error was raised while resolving configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration { .. })
    }

    pub fn configuration(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Configuration {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn allocation_failure(bytes: usize, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::AllocationFailure {
                bytes,
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_format(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("failed to allocate {bytes} bytes: {message}")]
    AllocationFailure { bytes: usize, message: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let e = Error::allocation_failure(100, "out of memory");
        assert!(e.is_allocation_failure());
        assert!(!e.is_configuration());
        assert_eq!(e.to_string(), "failed to allocate 100 bytes: out of memory");

        let e = Error::configuration("no log target");
        assert!(e.is_configuration());
        assert!(matches!(e.into_kind(), ErrorKind::Configuration { .. }));

        let e: Error = std::io::Error::other("disk full").into();
        assert!(matches!(e.kind(), ErrorKind::Io { .. }));
    }
}
