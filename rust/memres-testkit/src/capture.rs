//! In-memory writers for capturing log output.

use std::{
    io::Write,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

/// A cloneable, thread-safe byte buffer implementing [`Write`].
///
/// One clone is handed to the code under test, another one is kept by the test to
/// inspect what was written. Writes can be made to fail on demand.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    data: Arc<Mutex<Vec<u8>>>,
    fail: Arc<AtomicBool>,
}

impl SharedBuffer {
    pub fn new() -> SharedBuffer {
        SharedBuffer::default()
    }

    /// Everything written so far, decoded as UTF-8 (lossily).
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.data.lock().unwrap_or_else(PoisonError::into_inner))
            .into_owned()
    }

    /// Makes subsequent writes and flushes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::Release);
    }

    fn check(&self) -> std::io::Result<()> {
        if self.fail.load(Ordering::Acquire) {
            Err(std::io::Error::other("injected write failure"))
        } else {
            Ok(())
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.check()?;
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.check()
    }
}

/// A writer whose every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("write refused"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::other("flush refused"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_buffer() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.clone();
        writer.write_all(b"hello ").unwrap();
        writeln!(writer, "world").unwrap();
        assert_eq!(buffer.contents(), "hello world\n");

        buffer.fail_writes(true);
        assert!(writer.write_all(b"dropped").is_err());
        assert!(writer.flush().is_err());
        buffer.fail_writes(false);
        assert_eq!(buffer.contents(), "hello world\n");
    }
}
