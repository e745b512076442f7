//! Deletion audit log: one line per successfully deleted file.
//!
//! Each line is assembled in memory and written with a single `write_all`,
//! then flushed, so a reader tailing the log never sees a partial record and
//! an aborted run still leaves a complete prefix behind.
//!
//! Two line formats:
//! - `text`: `DELETED FILE: 2026/10/16 09:30:00 /var/tmp/app/old.log`
//! - `jsonl`: `{"ts":"…","event":"file_delete","path":"…","size":15}`

#![allow(missing_docs)]

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::{FswError, Result};

/// Prefix of every text-format audit line.
pub const TEXT_PREFIX: &str = "DELETED FILE: ";

/// Line format of the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditFormat {
    #[default]
    Text,
    Jsonl,
}

impl FromStr for AuditFormat {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "jsonl" | "json" => Ok(Self::Jsonl),
            other => Err(format!("unknown audit format {other:?} (expected text or jsonl)")),
        }
    }
}

impl fmt::Display for AuditFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Jsonl => "jsonl",
        })
    }
}

/// A single JSONL audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    /// Always `file_delete`.
    pub event: String,
    pub path: String,
    pub size: u64,
}

/// Append-only audit writer over an injected sink.
pub struct AuditLog<W: Write> {
    sink: W,
    format: AuditFormat,
    lines_written: u64,
}

impl<W: Write> AuditLog<W> {
    pub fn new(sink: W, format: AuditFormat) -> Self {
        Self {
            sink,
            format,
            lines_written: 0,
        }
    }

    /// Record one completed deletion.
    pub fn record_deletion(&mut self, path: &Path, size: u64) -> Result<()> {
        let line = match self.format {
            AuditFormat::Text => format!(
                "{TEXT_PREFIX}{} {}\n",
                Utc::now().format("%Y/%m/%d %H:%M:%S"),
                path.display()
            ),
            AuditFormat::Jsonl => {
                let record = AuditRecord {
                    ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    event: "file_delete".to_string(),
                    path: path.to_string_lossy().into_owned(),
                    size,
                };
                format!("{}\n", serde_json::to_string(&record)?)
            }
        };

        self.sink
            .write_all(line.as_bytes())
            .and_then(|()| self.sink.flush())
            .map_err(|source| FswError::sink("audit", source))?;
        self.lines_written += 1;
        Ok(())
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn format(&self) -> AuditFormat {
        self.format
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn text_lines_carry_prefix_and_path() {
        let mut log = AuditLog::new(Vec::new(), AuditFormat::Text);
        log.record_deletion(Path::new("/tmp/a.log"), 15).unwrap();
        log.record_deletion(Path::new("/tmp/b.log"), 3).unwrap();
        assert_eq!(log.lines_written(), 2);

        let out = String::from_utf8(log.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(TEXT_PREFIX));
        assert!(lines[0].ends_with(" /tmp/a.log"));
        assert!(lines[1].ends_with(" /tmp/b.log"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn jsonl_lines_parse_back() {
        let mut log = AuditLog::new(Vec::new(), AuditFormat::Jsonl);
        log.record_deletion(&PathBuf::from("/srv/x.tmp"), 42).unwrap();

        let out = String::from_utf8(log.into_inner()).unwrap();
        let record: AuditRecord = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(record.event, "file_delete");
        assert_eq!(record.path, "/srv/x.tmp");
        assert_eq!(record.size, 42);
        assert!(record.ts.ends_with('Z'));
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failure_is_reported_and_not_counted() {
        let mut log = AuditLog::new(BrokenSink, AuditFormat::Text);
        let err = log.record_deletion(Path::new("/tmp/a.log"), 1).unwrap_err();
        assert_eq!(err.code(), "FSW-3003");
        assert_eq!(log.lines_written(), 0);
    }

    #[test]
    fn format_parses_from_str() {
        assert_eq!("text".parse::<AuditFormat>().unwrap(), AuditFormat::Text);
        assert_eq!("JSONL".parse::<AuditFormat>().unwrap(), AuditFormat::Jsonl);
        assert!("xml".parse::<AuditFormat>().is_err());
        assert_eq!(AuditFormat::Jsonl.to_string(), "jsonl");
    }
}
