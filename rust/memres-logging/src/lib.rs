//! Allocation logging for memory resources.
//!
//! [`LoggingResourceAdaptor`] wraps any [`MemoryResource`](memres_mr::MemoryResource) and
//! records every allocate/free call as one CSV row:
//!
//! ```text
//! Time,Action,Pointer,Size,Stream
//! 14:03:27.120443,allocate,0x7f31c4000100,100,0x0
//! 14:03:27.120519,free,0x7f31c4000100,100,0x0
//! ```
//!
//! The log destination is chosen at construction time (see [`config`]), and every row
//! is flushed as soon as it is written. [`summary`] reads such a log back.

pub mod adaptor;
pub mod config;
pub mod record;
pub mod sink;
pub mod summary;

pub use adaptor::LoggingResourceAdaptor;
pub use config::{
    EnvLookup, LOG_FILE_ENV_VAR, LogConfig, NoEnv, OutputStream, ProcessEnv, SinkTarget,
};
pub use record::{Action, HEADER, LogRecord};
pub use sink::LogSink;
pub use summary::LogSummary;
