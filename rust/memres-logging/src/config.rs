//! Resolution of the allocation log destination.
//!
//! A log target is picked once, at adaptor construction, in this order:
//! 1. an explicit file path,
//! 2. an explicit output stream,
//! 3. the path named by the [`LOG_FILE_ENV_VAR`] environment variable.
//!
//! The environment is accessed through [`EnvLookup`], so tests can substitute it.

use std::{
    borrow::Borrow,
    collections::HashMap,
    ffi::{OsStr, OsString},
    hash::Hash,
    io::Write,
    path::PathBuf,
};

use memres_common::{Result, error::Error};

/// Environment variable holding the default allocation log path.
pub const LOG_FILE_ENV_VAR: &str = "MEMRES_LOG_FILE";

/// Read access to environment variables.
pub trait EnvLookup {
    fn var_os(&self, name: &str) -> Option<OsString>;
}

/// Looks variables up in the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var_os(&self, name: &str) -> Option<OsString> {
        std::env::var_os(name)
    }
}

/// An environment in which no variable is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnv;

impl EnvLookup for NoEnv {
    fn var_os(&self, _name: &str) -> Option<OsString> {
        None
    }
}

impl<K, V> EnvLookup for HashMap<K, V>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<OsStr>,
{
    fn var_os(&self, name: &str) -> Option<OsString> {
        self.get(name).map(|v| v.as_ref().to_os_string())
    }
}

/// An already-open output stream the log can be attached to.
pub enum OutputStream {
    Stdout,
    Stderr,
    /// Any other writer, e.g. a socket or an in-memory buffer.
    Writer(Box<dyn Write + Send>),
}

impl OutputStream {
    pub fn writer(writer: impl Write + Send + 'static) -> OutputStream {
        OutputStream::Writer(Box::new(writer))
    }
}

impl std::fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("Stdout"),
            OutputStream::Stderr => f.write_str("Stderr"),
            OutputStream::Writer(_) => f.write_str("Writer"),
        }
    }
}

/// The resolved log destination.
#[derive(Debug)]
pub enum SinkTarget {
    File(PathBuf),
    Stream(OutputStream),
}

/// Construction-time options of a logging adaptor.
///
/// Leaving both fields empty defers to the environment.
#[derive(Debug, Default)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub stream: Option<OutputStream>,
}

impl LogConfig {
    pub fn file(path: impl Into<PathBuf>) -> LogConfig {
        LogConfig {
            file: Some(path.into()),
            stream: None,
        }
    }

    pub fn stream(stream: OutputStream) -> LogConfig {
        LogConfig {
            file: None,
            stream: Some(stream),
        }
    }

    pub fn from_env() -> LogConfig {
        LogConfig::default()
    }

    /// Picks the log destination, consulting `env` only when no explicit target is set.
    ///
    /// No file is opened here.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when neither an explicit target nor a non-empty
    /// [`LOG_FILE_ENV_VAR`] is available, or when the explicit path is empty.
    pub fn resolve(self, env: &dyn EnvLookup) -> Result<SinkTarget> {
        if let Some(file) = self.file {
            if file.as_os_str().is_empty() {
                return Err(Error::configuration("explicit log file path is empty"));
            }
            return Ok(SinkTarget::File(file));
        }
        if let Some(stream) = self.stream {
            return Ok(SinkTarget::Stream(stream));
        }
        match env.var_os(LOG_FILE_ENV_VAR) {
            Some(path) if !path.is_empty() => Ok(SinkTarget::File(path.into())),
            _ => Err(Error::configuration(format!(
                "no log file or stream was given and {LOG_FILE_ENV_VAR} is not set"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_path(path: &str) -> HashMap<&'static str, String> {
        HashMap::from([(LOG_FILE_ENV_VAR, path.to_string())])
    }

    #[test]
    fn test_file_takes_precedence() {
        let config = LogConfig {
            file: Some("explicit.csv".into()),
            stream: Some(OutputStream::Stdout),
        };
        let target = config.resolve(&env_with_path("env.csv")).unwrap();
        assert!(matches!(target, SinkTarget::File(p) if p == PathBuf::from("explicit.csv")));
    }

    #[test]
    fn test_stream_before_env() {
        let target = LogConfig::stream(OutputStream::Stderr)
            .resolve(&env_with_path("env.csv"))
            .unwrap();
        assert!(matches!(target, SinkTarget::Stream(OutputStream::Stderr)));
    }

    #[test]
    fn test_env_fallback() {
        let target = LogConfig::from_env()
            .resolve(&env_with_path("logs/env.csv"))
            .unwrap();
        assert!(matches!(target, SinkTarget::File(p) if p == PathBuf::from("logs/env.csv")));
    }

    #[test]
    fn test_nothing_resolves() {
        let err = LogConfig::from_env().resolve(&NoEnv).unwrap_err();
        assert!(err.is_configuration());

        let err = LogConfig::from_env().resolve(&env_with_path("")).unwrap_err();
        assert!(err.is_configuration());

        let err = LogConfig::file("").resolve(&NoEnv).unwrap_err();
        assert!(err.is_configuration());
    }
}
