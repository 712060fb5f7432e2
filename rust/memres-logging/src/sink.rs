//! `LogSink`: an exclusively owned, line-oriented log destination.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use memres_common::{Result, error::Error};

use crate::config::{OutputStream, SinkTarget};

/// A log destination shared by many threads.
///
/// Each [`write_line`](LogSink::write_line) call appends exactly one line and flushes it
/// while holding the sink lock, so lines written concurrently never interleave and every
/// line reaches the destination before the call returns.
pub struct LogSink {
    writer: Mutex<Box<dyn Write + Send>>,
    name: String,
}

impl LogSink {
    /// Opens (or attaches to) the resolved target.
    ///
    /// A file target is truncated if it exists; missing parent directories are created.
    pub fn open(target: SinkTarget) -> Result<LogSink> {
        match target {
            SinkTarget::File(path) => Self::create_file(&path),
            SinkTarget::Stream(stream) => Ok(Self::attach(stream)),
        }
    }

    fn create_file(path: &Path) -> Result<LogSink> {
        let name = path.display().to_string();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("create log directory {}", parent.display()), e))?;
        }
        let file = File::create(path).map_err(|e| Error::io(format!("create {name}"), e))?;
        log::debug!("allocation log opened at {name}");
        Ok(LogSink {
            writer: Mutex::new(Box::new(BufWriter::new(file))),
            name,
        })
    }

    fn attach(stream: OutputStream) -> LogSink {
        let (writer, name): (Box<dyn Write + Send>, _) = match stream {
            OutputStream::Stdout => (Box::new(std::io::stdout()), "<stdout>"),
            OutputStream::Stderr => (Box::new(std::io::stderr()), "<stderr>"),
            OutputStream::Writer(writer) => (writer, "<writer>"),
        };
        log::debug!("allocation log attached to {name}");
        LogSink {
            writer: Mutex::new(writer),
            name: name.to_string(),
        }
    }

    /// Human-readable name of the destination (file path or stream name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes `line` followed by a newline, then flushes the destination.
    pub fn write_line(&self, line: &str) -> Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut writer = self.lock();
        writer
            .write_all(buf.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| Error::io(format!("write to {}", self.name), e))
    }

    pub fn flush(&self) -> Result<()> {
        self.lock()
            .flush()
            .map_err(|e| Error::io(format!("flush {}", self.name), e))
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        // Lines are handed to the writer in a single call, so a poisoned lock never
        // guards a partial line.
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        let writer = self.writer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.flush() {
            log::error!("failed to flush allocation log {}: {e}", self.name);
        }
        log::debug!("allocation log {} closed", self.name);
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use memres_testkit::capture::SharedBuffer;

    use super::*;

    #[test]
    fn test_file_sink_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logs").join("alloc.csv");
        let sink = LogSink::open(SinkTarget::File(path.clone())).unwrap();
        sink.write_line("a,b").unwrap();
        // Flushed without dropping the sink.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n");
        drop(sink);
    }

    #[test]
    fn test_file_sink_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alloc.csv");
        std::fs::write(&path, "stale contents\n").unwrap();
        let sink = LogSink::open(SinkTarget::File(path.clone())).unwrap();
        sink.write_line("fresh").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_unopenable_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a file.
        let err = LogSink::open(SinkTarget::File(dir.path().to_path_buf())).unwrap_err();
        assert!(matches!(
            err.kind(),
            memres_common::error::ErrorKind::Io { .. }
        ));
    }

    #[test]
    fn test_writer_sink() {
        let buffer = SharedBuffer::new();
        let sink = LogSink::open(SinkTarget::Stream(OutputStream::writer(buffer.clone()))).unwrap();
        assert_eq!(sink.name(), "<writer>");
        sink.write_line("one").unwrap();
        sink.write_line("two").unwrap();
        assert_eq!(buffer.contents(), "one\ntwo\n");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let sink = LogSink::open(SinkTarget::Stream(OutputStream::writer(
            memres_testkit::capture::FailingWriter,
        )))
        .unwrap();
        assert!(sink.write_line("lost").is_err());
    }
}
