//! Log ingestion: table dumps to behavior records.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use castdiff_error::Result;
use castdiff_types::{FormatType, Interface, RowId, TestPlan};
use tracing::info;

use crate::behavior::{BehaviorRecord, BehaviorTable};
use crate::canonical::{NO_OUTPUT, canonicalize};
use crate::log_dir::{LogDir, ReadTable};

/// Split one captured line into its leading row token and canonical value.
///
/// Returns `None` for a line without the interface's delimiter. The token is
/// returned as text; deciding whether it names a row is up to the caller.
#[must_use]
pub fn parse_line(line: &str, interface: Interface) -> Option<(&str, String)> {
    let delimiter = interface.delimiter();
    let idx = line.find(delimiter)?;
    let token = line[..idx].trim();
    let mut rest = &line[idx + delimiter.len_utf8()..];
    if interface.drops_trailing_char() {
        rest = match rest.char_indices().next_back() {
            Some((last, _)) => &rest[..last],
            None => rest,
        };
    }
    Some((token, canonicalize(rest.trim())))
}

/// Lines of a table dump up to the first blank line.
fn table_lines(content: &str) -> impl Iterator<Item = &str> {
    content.split('\n').take_while(|line| !line.trim().is_empty())
}

/// Per-file ingestion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileCounts {
    pub matched: usize,
    pub discarded: usize,
}

/// Totals over one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IngestStats {
    pub files: BTreeMap<String, FileCounts>,
    pub rows: usize,
    pub records: usize,
}

impl IngestStats {
    #[must_use]
    pub fn matched(&self) -> usize {
        self.files.values().map(|c| c.matched).sum()
    }

    #[must_use]
    pub fn discarded(&self) -> usize {
        self.files.values().map(|c| c.discarded).sum()
    }
}

/// Rows of one table dump whose token names a test input. The last line
/// for a row wins.
fn read_table(
    dir: &LogDir,
    file_name: &str,
    interface: Interface,
    inputs: &BTreeSet<RowId>,
    stats: &mut IngestStats,
) -> Result<BTreeMap<RowId, String>> {
    let content = fs::read_to_string(dir.path(file_name))?;
    let mut values = BTreeMap::new();
    let mut counts = FileCounts::default();
    for line in table_lines(&content) {
        let parsed = parse_line(line, interface).and_then(|(token, value)| {
            let row: RowId = token.parse().ok()?;
            inputs.contains(&row).then_some((row, value))
        });
        match parsed {
            Some((row, value)) => {
                counts.matched += 1;
                values.insert(row, value);
            }
            None => counts.discarded += 1,
        }
    }
    info!(
        file = file_name,
        matched = counts.matched,
        discarded = counts.discarded,
        "table dump ingested"
    );
    stats.files.insert(file_name.to_owned(), counts);
    Ok(values)
}

/// Build behavior records for `inputs` from the plan's table dumps.
///
/// Every input row gets one record per read table of the plan, whether or
/// not any dump mentions it; absent values stay at the sentinel.
///
/// # Errors
///
/// [`castdiff_error::CastDiffError::Io`] if a discovered table cannot be
/// read.
pub fn ingest(
    dir: &LogDir,
    plan: TestPlan,
    inputs: &BTreeSet<RowId>,
) -> Result<(BehaviorTable, IngestStats)> {
    let mut stats = IngestStats::default();

    let mut written: BTreeMap<(Interface, FormatType), BTreeMap<RowId, String>> = BTreeMap::new();
    for table in dir.plan_write_tables(plan) {
        let values = read_table(dir, &table.file_name(), table.interface, inputs, &mut stats)?;
        written.insert((table.interface, table.format), values);
    }

    let read_tables: Vec<ReadTable> = dir.plan_read_tables(plan).copied().collect();
    let skipped = dir.read_tables().len() - read_tables.len();
    if skipped > 0 {
        info!(plan = %plan, skipped, "read tables outside the plan ignored");
    }

    let mut behavior = BehaviorTable::new();
    for &row in inputs {
        for table in &read_tables {
            let mut record = BehaviorRecord::new(table);
            record.write_value = written
                .get(&(table.write, table.format))
                .and_then(|values| values.get(&row))
                .map_or_else(|| NO_OUTPUT.to_owned(), Clone::clone);
            behavior.insert(row, record);
        }
    }

    for table in &read_tables {
        let name = table.file_name();
        let values = read_table(dir, &name, table.read, inputs, &mut stats)?;
        for (row, value) in values {
            if let Some(record) = behavior.record_mut(row, &name) {
                record.read_value = value;
            }
        }
    }

    stats.rows = behavior.len();
    stats.records = behavior.record_count();
    info!(
        plan = %plan,
        rows = stats.rows,
        records = stats.records,
        matched = stats.matched(),
        discarded = stats.discarded(),
        "ingestion complete"
    );
    Ok((behavior, stats))
}
