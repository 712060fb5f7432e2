//! Reading an allocation log back and summarizing it.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use memres_common::{Result, error::Error, verify_data};
use serde::Serialize;

use crate::record::{Action, HEADER, LogRecord};

/// An allocation (or a free) identified by its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    #[serde(serialize_with = "serialize_hex")]
    pub address: usize,
    pub size: usize,
    pub stream: u64,
}

/// Aggregate view over an allocation log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub allocations: u64,
    pub frees: u64,
    pub bytes_allocated: u64,
    pub bytes_freed: u64,
    /// Largest number of bytes outstanding at any point of the log, in log order.
    pub peak_outstanding_bytes: u64,
    /// Allocations never freed, sorted by address.
    pub outstanding: Vec<LogEntry>,
    /// Frees of addresses with no outstanding allocation, in log order.
    pub unmatched_frees: Vec<LogEntry>,
}

impl LogSummary {
    pub fn from_path(path: impl AsRef<Path>) -> Result<LogSummary> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses a log, starting with its header line. Blank lines are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<LogSummary> {
        let mut lines = reader.lines();
        let header = lines.next().transpose()?.unwrap_or_default();
        verify_data!(header, header.trim_end() == HEADER);

        let mut summary = LogSummary::default();
        let mut live = HashMap::<usize, LogEntry>::new();
        let mut outstanding_bytes = 0u64;
        for (idx, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 2;
            let record = line
                .parse::<LogRecord>()
                .map_err(|e| Error::invalid_format(format!("line {line_no}"), e.to_string()))?;
            let add = |total: u64, size: usize| {
                total.checked_add(size as u64).ok_or_else(|| {
                    Error::invalid_format(format!("line {line_no}"), "byte total overflows u64")
                })
            };
            let entry = LogEntry {
                address: record.address,
                size: record.size,
                stream: record.stream.value(),
            };
            match record.action {
                Action::Allocate => {
                    summary.allocations += 1;
                    summary.bytes_allocated = add(summary.bytes_allocated, entry.size)?;
                    outstanding_bytes = add(outstanding_bytes, entry.size)?;
                    if let Some(previous) = live.insert(entry.address, entry) {
                        outstanding_bytes -= previous.size as u64;
                    }
                    summary.peak_outstanding_bytes =
                        summary.peak_outstanding_bytes.max(outstanding_bytes);
                }
                Action::Free => {
                    summary.frees += 1;
                    summary.bytes_freed = add(summary.bytes_freed, entry.size)?;
                    match live.remove(&entry.address) {
                        Some(allocated) => outstanding_bytes -= allocated.size as u64,
                        None => summary.unmatched_frees.push(entry),
                    }
                }
            }
        }

        summary.outstanding = live.into_values().collect();
        summary.outstanding.sort_unstable_by_key(|e| e.address);
        Ok(summary)
    }

    /// Total size of the allocations that were never freed.
    pub fn outstanding_bytes(&self) -> u64 {
        self.outstanding.iter().map(|e| e.size as u64).sum()
    }

    /// `true` when every allocation was freed and every free matched an allocation.
    pub fn is_balanced(&self) -> bool {
        self.outstanding.is_empty() && self.unmatched_frees.is_empty()
    }
}

fn serialize_hex<S>(address: &usize, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&format_args!("{address:#x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarize(rows: &[&str]) -> Result<LogSummary> {
        let text = std::iter::once(HEADER)
            .chain(rows.iter().copied())
            .collect::<Vec<_>>()
            .join("\n");
        LogSummary::from_reader(text.as_bytes())
    }

    #[test]
    fn test_balanced_log() {
        let summary = summarize(&[
            "10:00:00.000001,allocate,0x100,100,0x0",
            "10:00:00.000002,allocate,0x200,50,0x0",
            "10:00:00.000003,free,0x100,100,0x0",
            "10:00:00.000004,free,0x200,50,0x0",
            "",
        ])
        .unwrap();
        assert_eq!(summary.allocations, 2);
        assert_eq!(summary.frees, 2);
        assert_eq!(summary.bytes_allocated, 150);
        assert_eq!(summary.peak_outstanding_bytes, 150);
        assert!(summary.is_balanced());
        assert_eq!(summary.outstanding_bytes(), 0);
    }

    #[test]
    fn test_leaks_and_unmatched_frees() {
        let summary = summarize(&[
            "10:00:00.000001,allocate,0x300,10,0x0",
            "10:00:00.000002,allocate,0x100,20,0x5",
            "10:00:00.000003,free,0x900,8,0x0",
            "10:00:00.000004,free,0x300,10,0x0",
        ])
        .unwrap();
        assert!(!summary.is_balanced());
        assert_eq!(
            summary.outstanding,
            vec![LogEntry {
                address: 0x100,
                size: 20,
                stream: 5
            }]
        );
        assert_eq!(summary.unmatched_frees.len(), 1);
        assert_eq!(summary.unmatched_frees[0].address, 0x900);
        assert_eq!(summary.peak_outstanding_bytes, 30);
    }

    #[test]
    fn test_rejects_missing_header() {
        let err = LogSummary::from_reader("10:00:00.000001,allocate,0x300,10,0x0\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            memres_common::error::ErrorKind::InvalidFormat { .. }
        ));
        assert!(LogSummary::from_reader("".as_bytes()).is_err());
    }

    #[test]
    fn test_reports_bad_line_number() {
        let err = summarize(&["10:00:00.000001,allocate,0x300,10,0x0", "garbage"]).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn test_byte_total_overflow_is_an_error() {
        let huge = format!("10:00:00.000001,allocate,0x100,{},0x0", usize::MAX);
        let again = format!("10:00:00.000002,allocate,0x200,{},0x0", usize::MAX);
        let err = summarize(&[&huge, &again]).unwrap_err();
        assert!(matches!(
            err.kind(),
            memres_common::error::ErrorKind::InvalidFormat { .. }
        ));
        assert!(err.to_string().contains("line 3"), "{err}");

        let free = format!("10:00:00.000001,free,0x100,{},0x0", usize::MAX);
        let free_again = format!("10:00:00.000002,free,0x200,{},0x0", usize::MAX);
        assert!(summarize(&[&free, &free_again]).is_err());
    }
}
