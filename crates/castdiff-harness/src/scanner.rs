//! Exception window scanner.
//!
//! A record whose read value is still the sentinel after ingestion may hide
//! a statement that failed silently. For such records both console logs of
//! the combination are searched: each time a line carries one of the row's
//! start markers, the following lines (up to the window, and never past a
//! marker of the next row) are checked against the exception catalog. The
//! first hit per log becomes evidence; no hit leaves the record untouched.

use std::collections::HashMap;
use std::fmt;
use std::fs;

use castdiff_types::RowId;
use tracing::{debug, info};

use crate::behavior::{BehaviorRecord, BehaviorTable};
use crate::canonical::EXCEPTION_NOTE;
use crate::config::OracleConfig;
use crate::log_dir::LogDir;

/// Substrings that mark an engine error in console output.
pub const EXCEPTION_PATTERNS: [&str; 13] = [
    "error:",
    "Exception:",
    "InsertIntoStatement",
    "mismatched input",
    "safely cast",
    "unresolvedalias",
    "Cannot",
    "Error parsing",
    "not supported",
    "Can only",
    "does not match",
    "Table not found",
    "illegal character",
];

/// Statement echoes that open a row's block in any interface's log.
#[must_use]
pub fn start_markers(row: RowId) -> [String; 4] {
    [
        format!("insert into ws{row} "),
        format!("val rdd{row} "),
        format!("df{row}.show"),
        format!("select * from ws{row};"),
    ]
}

/// Which statement log a match came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSide {
    Write,
    Read,
}

impl LogSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for LogSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exception line attributed to a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    pub side: LogSide,
    pub file: String,
    /// 1-based.
    pub line_number: usize,
    /// Trimmed line text.
    pub line: String,
}

impl Evidence {
    /// `(<side>) <file> (line <n>)`
    #[must_use]
    pub fn location(&self) -> String {
        format!("({}) {} (line {})", self.side, self.file, self.line_number)
    }

    /// Append the note to the value for this side and record the location.
    pub fn apply(&self, record: &mut BehaviorRecord) {
        let target = match self.side {
            LogSide::Write => &mut record.write_value,
            LogSide::Read => &mut record.read_value,
        };
        target.push_str(EXCEPTION_NOTE);
        target.push_str(&self.line);
        record.log_location = Some(self.location());
    }
}

/// Zero-based index of the first exception line attributable to `row`.
#[must_use]
pub fn find_exception<S: AsRef<str>>(
    lines: &[S],
    row: RowId,
    config: &OracleConfig,
) -> Option<usize> {
    let markers = start_markers(row);
    let next_markers = start_markers(row.saturating_add(1));
    let has_any = |line: &str, patterns: &[String]| patterns.iter().any(|p| line.contains(p.as_str()));

    for (i, line) in lines.iter().enumerate().skip(config.log_start_line) {
        if !has_any(line.as_ref(), &markers) {
            continue;
        }
        let end = lines.len().min(i.saturating_add(config.scan_window));
        for (j, candidate) in lines.iter().enumerate().take(end).skip(i + 1) {
            let candidate = candidate.as_ref();
            if has_any(candidate, &next_markers) {
                break;
            }
            if EXCEPTION_PATTERNS.iter().any(|p| candidate.contains(p)) {
                return Some(j);
            }
        }
    }
    None
}

/// Scan counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScanStats {
    /// Records whose read value was still the sentinel.
    pub candidates: usize,
    pub write_hits: usize,
    pub read_hits: usize,
    /// Logs referenced by a candidate but absent from the directory.
    pub missing_logs: usize,
}

/// Scans a log directory, reading each log at most once.
pub struct ExceptionScanner<'a> {
    dir: &'a LogDir,
    config: &'a OracleConfig,
    logs: HashMap<String, Option<Vec<String>>>,
}

impl<'a> ExceptionScanner<'a> {
    #[must_use]
    pub fn new(dir: &'a LogDir, config: &'a OracleConfig) -> Self {
        Self {
            dir,
            config,
            logs: HashMap::new(),
        }
    }

    fn lines(&mut self, file: &str) -> Option<&[String]> {
        let dir = self.dir;
        self.logs
            .entry(file.to_owned())
            .or_insert_with(|| match fs::read_to_string(dir.path(file)) {
                Ok(content) => Some(content.lines().map(str::to_owned).collect()),
                Err(err) => {
                    debug!(file, error = %err, "log unavailable, no evidence");
                    None
                }
            })
            .as_deref()
    }

    fn evidence(&mut self, side: LogSide, file: &str, row: RowId) -> Option<Evidence> {
        let config = *self.config;
        let lines = self.lines(file)?;
        let idx = find_exception(lines, row, &config)?;
        Some(Evidence {
            side,
            file: file.to_owned(),
            line_number: idx + 1,
            line: lines[idx].trim().to_owned(),
        })
    }

    /// Amend every sentinel record in `table` with whatever evidence its
    /// logs hold. Never fails: an unreadable log is no evidence.
    pub fn scan(&mut self, table: &mut BehaviorTable) -> ScanStats {
        let mut stats = ScanStats::default();
        for (row, records) in table.iter_mut() {
            for record in records.values_mut() {
                if !record.read_is_no_output() {
                    continue;
                }
                stats.candidates += 1;
                let read_table = record.table();
                for (side, file) in [
                    (LogSide::Write, read_table.write_log_name()),
                    (LogSide::Read, read_table.read_log_name()),
                ] {
                    if !record.read_is_no_output() {
                        break;
                    }
                    if self.lines(&file).is_none() {
                        stats.missing_logs += 1;
                        continue;
                    }
                    if let Some(evidence) = self.evidence(side, &file, row) {
                        debug!(
                            row,
                            location = %evidence.location(),
                            line = %evidence.line,
                            "exception attributed"
                        );
                        evidence.apply(record);
                        match side {
                            LogSide::Write => stats.write_hits += 1,
                            LogSide::Read => stats.read_hits += 1,
                        }
                    }
                }
            }
        }
        info!(
            candidates = stats.candidates,
            write_hits = stats.write_hits,
            read_hits = stats.read_hits,
            missing_logs = stats.missing_logs,
            "exception scan complete"
        );
        stats
    }
}
