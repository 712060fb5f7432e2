//! `LoggingResourceAdaptor`: a memory resource decorator that logs every allocate/free.

use std::{path::PathBuf, ptr::NonNull};

use memres_common::Result;
use memres_mr::{MemoryResource, StreamId, same_instance};

use crate::{
    config::{EnvLookup, LogConfig, OutputStream, ProcessEnv},
    record::{Action, HEADER, LogRecord},
    sink::LogSink,
};

/// A memory resource that forwards to an upstream resource and appends one CSV row to
/// its log for every successful allocation and every deallocation.
///
/// The adaptor borrows its upstream, which therefore outlives it, and exclusively owns
/// its log sink. The header row is written during construction, before any record.
/// Addresses, sizes and errors coming from the upstream are returned unchanged.
///
/// # Concurrency
///
/// The adaptor may be shared between threads. Each row is written and flushed under the
/// sink lock, so rows never interleave; rows from different threads may appear in any
/// order relative to each other.
pub struct LoggingResourceAdaptor<'a> {
    upstream: &'a dyn MemoryResource,
    sink: LogSink,
}

impl<'a> LoggingResourceAdaptor<'a> {
    /// Creates an adaptor logging to the file at `path`.
    ///
    /// The file is truncated and its parent directories are created as needed.
    pub fn new(
        upstream: &'a dyn MemoryResource,
        path: impl Into<PathBuf>,
    ) -> Result<LoggingResourceAdaptor<'a>> {
        Self::with_config(upstream, LogConfig::file(path), &ProcessEnv)
    }

    /// Creates an adaptor logging to an already-open output stream.
    pub fn with_stream(
        upstream: &'a dyn MemoryResource,
        stream: OutputStream,
    ) -> Result<LoggingResourceAdaptor<'a>> {
        Self::with_config(upstream, LogConfig::stream(stream), &ProcessEnv)
    }

    /// Creates an adaptor logging to the file named by the
    /// [`LOG_FILE_ENV_VAR`](crate::LOG_FILE_ENV_VAR) environment variable.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if the variable is unset or empty.
    pub fn from_env(upstream: &'a dyn MemoryResource) -> Result<LoggingResourceAdaptor<'a>> {
        Self::with_config(upstream, LogConfig::from_env(), &ProcessEnv)
    }

    /// Creates an adaptor from explicit options, resolving the environment through `env`.
    ///
    /// The environment is consulted at most once. On failure no sink is left open.
    pub fn with_config(
        upstream: &'a dyn MemoryResource,
        config: LogConfig,
        env: &dyn EnvLookup,
    ) -> Result<LoggingResourceAdaptor<'a>> {
        let target = config.resolve(env)?;
        let sink = LogSink::open(target)?;
        sink.write_line(HEADER)?;
        Ok(LoggingResourceAdaptor { upstream, sink })
    }

    /// The CSV header written at the top of every log.
    pub fn header() -> &'static str {
        HEADER
    }

    /// The wrapped resource.
    pub fn upstream_resource(&self) -> &'a dyn MemoryResource {
        self.upstream
    }

    /// Destination name of the log (file path or stream name).
    pub fn log_name(&self) -> &str {
        self.sink.name()
    }

    /// Flushes the log. Rows are already flushed as they are written.
    pub fn flush(&self) -> Result<()> {
        self.sink.flush()
    }

    fn log(&self, action: Action, ptr: NonNull<u8>, bytes: usize, stream: StreamId) -> Result<()> {
        let record = LogRecord::now(action, ptr, bytes, stream);
        self.sink.write_line(&record.to_string()).inspect_err(|e| {
            log::error!("lost allocation log record '{record}': {e}");
        })
    }
}

impl MemoryResource for LoggingResourceAdaptor<'_> {
    fn allocate(&self, bytes: usize, stream: StreamId) -> Result<NonNull<u8>> {
        let ptr = self.upstream.allocate(bytes, stream)?;
        if let Err(e) = self.log(Action::Allocate, ptr, bytes, stream) {
            // The caller never sees `ptr`, so it goes back to the upstream.
            // SAFETY: `ptr` was just allocated from upstream with these `bytes` and `stream`.
            if let Err(release) = unsafe { self.upstream.deallocate(ptr, bytes, stream) } {
                log::error!("failed to release unlogged allocation {ptr:p}: {release}");
            }
            return Err(e);
        }
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: usize, stream: StreamId) -> Result<()> {
        // The row goes out before the upstream call, so the trace survives an upstream
        // failure or an abnormal termination inside it.
        self.log(Action::Free, ptr, bytes, stream)?;
        // SAFETY: forwarded from the caller's contract; this adaptor hands out upstream
        // addresses unchanged.
        unsafe { self.upstream.deallocate(ptr, bytes, stream) }
    }

    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        if same_instance(self, other) {
            return true;
        }
        other.kind() == self.kind()
            && other
                .upstream()
                .is_some_and(|upstream| self.upstream.is_equal(upstream))
    }

    fn kind(&self) -> &'static str {
        "logging_adaptor"
    }

    fn alignment(&self) -> usize {
        self.upstream.alignment()
    }

    fn upstream(&self) -> Option<&dyn MemoryResource> {
        Some(self.upstream)
    }
}

impl std::fmt::Debug for LoggingResourceAdaptor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingResourceAdaptor")
            .field("upstream", &self.upstream.kind())
            .field("sink", &self.sink)
            .finish()
    }
}
