//! One row of the allocation log.

use std::{ptr::NonNull, str::FromStr};

use chrono::NaiveTime;
use memres_common::{Result, error::Error};
use memres_mr::StreamId;

/// The first line of every allocation log.
pub const HEADER: &str = "Time,Action,Pointer,Size,Stream";

const TIME_FORMAT: &str = "%H:%M:%S%.6f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Allocate,
    Free,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allocate => "allocate",
            Action::Free => "free",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Action> {
        match s {
            "allocate" => Ok(Action::Allocate),
            "free" => Ok(Action::Free),
            _ => Err(Error::invalid_format("Action", format!("unknown action '{s}'"))),
        }
    }
}

/// A single allocate or free event.
///
/// Renders as `<HH:MM:SS.ffffff>,<action>,<0xaddress>,<bytes>,<0xstream>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Local wall-clock time of the event.
    pub timestamp: NaiveTime,
    pub action: Action,
    pub address: usize,
    pub size: usize,
    pub stream: StreamId,
}

impl LogRecord {
    /// Creates a record stamped with the current local time.
    pub fn now(action: Action, ptr: NonNull<u8>, size: usize, stream: StreamId) -> LogRecord {
        LogRecord {
            timestamp: chrono::Local::now().time(),
            action,
            address: ptr.as_ptr().addr(),
            size,
            stream,
        }
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{:#x},{},{}",
            self.timestamp.format(TIME_FORMAT),
            self.action,
            self.address,
            self.size,
            self.stream
        )
    }
}

impl FromStr for LogRecord {
    type Err = Error;

    fn from_str(line: &str) -> Result<LogRecord> {
        let fields = line.trim_end().split(',').collect::<Vec<_>>();
        let [time, action, address, size, stream] = fields[..] else {
            return Err(Error::invalid_format(
                "LogRecord",
                format!("expected 5 fields, found {}", fields.len()),
            ));
        };

        let timestamp = NaiveTime::parse_from_str(time, "%H:%M:%S%.f")
            .map_err(|e| Error::invalid_format("Time", format!("'{time}': {e}")))?;
        if !size.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_format("Size", format!("'{size}' is not a decimal number")));
        }
        let size = size
            .parse::<usize>()
            .map_err(|e| Error::invalid_format("Size", format!("'{size}': {e}")))?;
        Ok(LogRecord {
            timestamp,
            action: action.parse()?,
            address: parse_hex("Pointer", address)? as usize,
            size,
            stream: StreamId::new(parse_hex("Stream", stream)?),
        })
    }
}

fn parse_hex(field: &str, s: &str) -> Result<u64> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| Error::invalid_format(field, format!("'{s}' lacks the 0x prefix")))?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::invalid_format(field, format!("'{s}' is not a hex number")));
    }
    u64::from_str_radix(digits, 16).map_err(|e| Error::invalid_format(field, format!("'{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LogRecord {
        LogRecord {
            timestamp: NaiveTime::from_hms_micro_opt(9, 5, 7, 42).unwrap(),
            action: Action::Allocate,
            address: 0x7f00_0000_0100,
            size: 100,
            stream: StreamId::new(0x1f),
        }
    }

    #[test]
    fn test_render() {
        assert_eq!(
            sample().to_string(),
            "09:05:07.000042,allocate,0x7f0000000100,100,0x1f"
        );
        let free = LogRecord {
            action: Action::Free,
            ..sample()
        };
        assert_eq!(free.to_string().split(',').nth(1), Some("free"));
    }

    #[test]
    fn test_parse_rendered() {
        let parsed: LogRecord = sample().to_string().parse().unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_parse_rejects_malformed_rows() {
        for line in [
            "",
            HEADER,
            "09:05:07.000042,allocate,0x100,100",
            "09:05:07.000042,allocate,0x100,100,0x0,extra",
            "09:05:07.000042,reserve,0x100,100,0x0",
            "09:05:07.000042,allocate,100,100,0x0",
            "09:05:07.000042,allocate,0x100,-1,0x0",
            "9 o'clock,allocate,0x100,100,0x0",
            "09:05:07.000042,allocate,0x+100,100,0x0",
            "09:05:07.000042,allocate,0x100,100,0x+0",
            "09:05:07.000042,allocate,0x100,+100,0x0",
            "09:05:07.000042,allocate,0x,100,0x0",
        ] {
            assert!(line.parse::<LogRecord>().is_err(), "{line}");
        }
    }

    #[test]
    fn test_now_uses_pointer_address() {
        let ptr = NonNull::new(std::ptr::without_provenance_mut::<u8>(0x4000)).unwrap();
        let record = LogRecord::now(Action::Free, ptr, 8, StreamId::DEFAULT);
        assert_eq!(record.address, 0x4000);
        assert!(record.to_string().ends_with(",free,0x4000,8,0x0"));
    }
}
