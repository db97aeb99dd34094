//! Behavior records and the ungrouped dump.
//!
//! A record is created with both values set to [`NO_OUTPUT`], filled once by
//! ingestion and amended at most once more by the exception scanner. The
//! dump persists the table between ingestion and classification so a dry
//! run can reclassify without touching the logs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use castdiff_error::{CastDiffError, Result};
use castdiff_types::{FormatType, Interface, RowId, TestPlan};
use tracing::info;

use crate::canonical::{NO_OUTPUT, is_no_output};
use crate::log_dir::ReadTable;

/// What one (write interface, read interface, format) combination showed
/// for one row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BehaviorRecord {
    pub write_interface: Interface,
    pub read_interface: Interface,
    pub format_type: FormatType,
    pub read_value: String,
    pub write_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_location: Option<String>,
}

impl BehaviorRecord {
    /// Fresh record for `table` with both values at the sentinel.
    #[must_use]
    pub fn new(table: &ReadTable) -> Self {
        Self {
            write_interface: table.write,
            read_interface: table.read,
            format_type: table.format,
            read_value: NO_OUTPUT.to_owned(),
            write_value: NO_OUTPUT.to_owned(),
            log_location: None,
        }
    }

    #[must_use]
    pub fn read_is_no_output(&self) -> bool {
        is_no_output(&self.read_value)
    }

    #[must_use]
    pub const fn table(&self) -> ReadTable {
        ReadTable {
            write: self.write_interface,
            read: self.read_interface,
            format: self.format_type,
        }
    }

    /// The identifying part of the record, as listed in differential output.
    #[must_use]
    pub fn combination(&self) -> Combination {
        Combination {
            write_interface: self.write_interface,
            read_interface: self.read_interface,
            format_type: self.format_type,
            log_location: self.log_location.clone(),
        }
    }
}

/// Interfaces and format of one record, plus its evidence location.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Combination {
    pub write_interface: Interface,
    pub read_interface: Interface,
    pub format_type: FormatType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_location: Option<String>,
}

/// Records of one row keyed by read table file name.
pub type RowBehavior = BTreeMap<String, BehaviorRecord>;

/// Every record, keyed by row id then read table file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BehaviorTable {
    rows: BTreeMap<RowId, RowBehavior>,
}

impl BehaviorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for (`row`, `table`).
    pub fn insert(&mut self, row: RowId, record: BehaviorRecord) {
        self.rows
            .entry(row)
            .or_default()
            .insert(record.table().file_name(), record);
    }

    #[must_use]
    pub fn row(&self, row: RowId) -> Option<&RowBehavior> {
        self.rows.get(&row)
    }

    #[must_use]
    pub fn record(&self, row: RowId, table: &str) -> Option<&BehaviorRecord> {
        self.rows.get(&row)?.get(table)
    }

    pub fn record_mut(&mut self, row: RowId, table: &str) -> Option<&mut BehaviorRecord> {
        self.rows.get_mut(&row)?.get_mut(table)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowId, &RowBehavior)> {
        self.rows.iter().map(|(row, records)| (*row, records))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RowId, &mut RowBehavior)> {
        self.rows.iter_mut().map(|(row, records)| (*row, records))
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of records across all rows.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }
}

/// `<plan>_ungrouped_results.json`
#[must_use]
pub fn dump_file_name(plan: TestPlan) -> String {
    format!("{plan}_ungrouped_results.json")
}

/// On-disk form of a [`BehaviorTable`], tagged with the plan and the ground
/// truth it was ingested against.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BehaviorDump {
    pub plan: TestPlan,
    pub ground_truth_digest: String,
    pub rows: BehaviorTable,
}

impl BehaviorDump {
    /// Write the dump as pretty JSON.
    ///
    /// # Errors
    ///
    /// [`CastDiffError::Io`] or [`CastDiffError::Serialization`].
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(CastDiffError::serialization)?;
        fs::write(path, json)?;
        info!(
            path = %path.display(),
            plan = %self.plan,
            rows = self.rows.len(),
            records = self.rows.record_count(),
            "behavior dump written"
        );
        Ok(())
    }

    /// Load a dump and check it belongs to `plan` and `digest`.
    ///
    /// # Errors
    ///
    /// - [`CastDiffError::MalformedDump`] if it is missing, does not parse
    ///   or names another plan.
    /// - [`CastDiffError::StaleDump`] if the ground truth changed since.
    pub fn load(path: &Path, plan: TestPlan, digest: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| CastDiffError::malformed_dump(path, err.to_string()))?;
        let dump: Self = serde_json::from_str(&text)
            .map_err(|err| CastDiffError::malformed_dump(path, err.to_string()))?;
        if dump.plan != plan {
            return Err(CastDiffError::malformed_dump(
                path,
                format!("dump is for plan {}, not {plan}", dump.plan),
            ));
        }
        if dump.ground_truth_digest != digest {
            return Err(CastDiffError::StaleDump {
                path: path.to_path_buf(),
                expected: digest.to_owned(),
                found: dump.ground_truth_digest,
            });
        }
        info!(
            path = %path.display(),
            plan = %plan,
            rows = dump.rows.len(),
            "behavior dump loaded"
        );
        Ok(dump)
    }
}
