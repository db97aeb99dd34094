//! Equivalence classifier: write-read, error-handling and differential
//! verdicts over a behavior table.
//!
//! The write-read allow-list is not consulted by the
//! differential axis.

use std::collections::{BTreeMap, BTreeSet};

use castdiff_error::Result;
use castdiff_types::{OriginalEntry, RowId, TestPlan};

use crate::behavior::{BehaviorRecord, BehaviorTable, Combination};
use crate::canonical::{fold_key, is_no_output, same_class};
use crate::ground_truth::GroundTruth;

/// Accepted write-read divergences: the row and the rendering the platform
/// is known to produce for it.
pub const WR_ALLOW_LIST: [(RowId, &str); 5] = [
    (117, "spark"),
    (119, "25"),
    (120, "1.1"),
    (128, "1"),
    (130, "1.1"),
];

/// Verdict axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    #[serde(rename = "wr")]
    WriteRead,
    #[serde(rename = "eh")]
    ErrorHandling,
    #[serde(rename = "difft")]
    Differential,
}

impl Axis {
    pub const ALL: [Self; 3] = [Self::WriteRead, Self::ErrorHandling, Self::Differential];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WriteRead => "wr",
            Self::ErrorHandling => "eh",
            Self::Differential => "difft",
        }
    }
}

fn allow_listed(row: RowId, value: &str) -> bool {
    WR_ALLOW_LIST
        .iter()
        .any(|(allowed_row, rendering)| *allowed_row == row && *rendering == value)
}

/// Write-read: the value read back matches the value written, both are
/// missing, or both are renderings of one equivalence class.
#[must_use]
pub fn write_read_passes(row: RowId, write_value: &str, read_value: &str) -> bool {
    read_value == write_value
        || (is_no_output(read_value) && is_no_output(write_value))
        || same_class(read_value, write_value)
        || allow_listed(row, read_value)
        || allow_listed(row, write_value)
}

/// Error handling: an invalid literal must produce nothing readable.
#[must_use]
pub fn error_handling_passes(read_value: &str) -> bool {
    is_no_output(read_value)
}

/// Number of distinct observations once values are folded by sentinel,
/// equivalence class and text.
#[must_use]
pub fn bucket_count<'a>(values: impl IntoIterator<Item = &'a str>) -> usize {
    values.into_iter().map(fold_key).collect::<BTreeSet<_>>().len()
}

#[must_use]
pub fn differential_passes<'a>(values: impl IntoIterator<Item = &'a str>) -> bool {
    bucket_count(values) <= 1
}

/// Ground truth columns shared by every verdict entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RowOrigin {
    pub original_value: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub valid: bool,
}

impl From<&OriginalEntry> for RowOrigin {
    fn from(entry: &OriginalEntry) -> Self {
        Self {
            original_value: entry.value.clone(),
            type_name: entry.type_name.clone(),
            valid: entry.valid,
        }
    }
}

/// Write-read or error-handling verdict for one record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordVerdict {
    #[serde(flatten)]
    pub origin: RowOrigin,
    #[serde(flatten)]
    pub record: BehaviorRecord,
    pub pass: bool,
}

/// Differential verdict for one row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiffVerdict {
    #[serde(flatten)]
    pub origin: RowOrigin,
    /// Observed read value -> combinations that produced it.
    pub output: BTreeMap<String, Vec<Combination>>,
    pub pass: bool,
}

/// Row id -> read table file name -> verdict.
pub type RecordVerdicts = BTreeMap<RowId, BTreeMap<String, RecordVerdict>>;

/// Row id -> verdict.
pub type DiffVerdicts = BTreeMap<RowId, DiffVerdict>;

/// Judges one behavior table against the ground truth.
pub struct Classifier<'a> {
    truth: &'a GroundTruth,
    plan: TestPlan,
}

impl<'a> Classifier<'a> {
    #[must_use]
    pub const fn new(truth: &'a GroundTruth, plan: TestPlan) -> Self {
        Self { truth, plan }
    }

    fn per_record(
        &self,
        table: &BehaviorTable,
        applies: impl Fn(&OriginalEntry) -> bool,
        judge: impl Fn(RowId, &BehaviorRecord) -> bool,
    ) -> Result<RecordVerdicts> {
        let mut verdicts = RecordVerdicts::new();
        for (row, records) in table.iter() {
            let entry = self.truth.require(row)?;
            if !applies(entry) {
                continue;
            }
            let origin = RowOrigin::from(entry);
            let row_verdicts = records
                .iter()
                .map(|(name, record)| {
                    let verdict = RecordVerdict {
                        origin: origin.clone(),
                        record: record.clone(),
                        pass: judge(row, record),
                    };
                    (name.clone(), verdict)
                })
                .collect();
            verdicts.insert(row, row_verdicts);
        }
        Ok(verdicts)
    }

    /// Write-read verdicts for valid rows.
    ///
    /// # Errors
    ///
    /// [`castdiff_error::CastDiffError::RowIdMismatch`] if the table holds a
    /// row the ground truth does not know.
    pub fn write_read(&self, table: &BehaviorTable) -> Result<RecordVerdicts> {
        self.per_record(
            table,
            |entry| entry.valid,
            |row, record| write_read_passes(row, &record.write_value, &record.read_value),
        )
    }

    /// Error-handling verdicts for invalid rows. Empty unless the plan tests
    /// one engine in isolation.
    ///
    /// # Errors
    ///
    /// See [`Self::write_read`].
    pub fn error_handling(&self, table: &BehaviorTable) -> Result<RecordVerdicts> {
        if !self.plan.is_isolated() {
            return Ok(RecordVerdicts::new());
        }
        self.per_record(
            table,
            |entry| !entry.valid,
            |_, record| error_handling_passes(&record.read_value),
        )
    }

    /// Differential verdicts for every row.
    ///
    /// # Errors
    ///
    /// See [`Self::write_read`].
    pub fn differential(&self, table: &BehaviorTable) -> Result<DiffVerdicts> {
        let mut verdicts = DiffVerdicts::new();
        for (row, records) in table.iter() {
            let entry = self.truth.require(row)?;
            let mut output: BTreeMap<String, Vec<Combination>> = BTreeMap::new();
            for record in records.values() {
                output
                    .entry(record.read_value.clone())
                    .or_default()
                    .push(record.combination());
            }
            let pass = differential_passes(output.keys().map(String::as_str));
            verdicts.insert(
                row,
                DiffVerdict {
                    origin: RowOrigin::from(entry),
                    output,
                    pass,
                },
            );
        }
        Ok(verdicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::NO_OUTPUT;

    #[test]
    fn write_read_rules() {
        assert!(write_read_passes(3, "-1", "-1"));
        assert!(write_read_passes(3, NO_OUTPUT, NO_OUTPUT));
        assert!(write_read_passes(
            3,
            &format!("{NO_OUTPUT}, find exception: Cannot"),
            NO_OUTPUT
        ));
        assert!(write_read_passes(3, "8888888888.8888900000", "8.88888888888889E9"));
        assert!(!write_read_passes(3, "-1", "1"));
        assert!(!write_read_passes(3, "-1", NO_OUTPUT));
    }

    #[test]
    fn allow_list_matches_either_value() {
        assert!(write_read_passes(117, "spark", "c3Bhcms="));
        assert!(write_read_passes(117, "c3Bhcms=", "spark"));
        assert!(!write_read_passes(118, "spark", "c3Bhcms="));
        assert!(!write_read_passes(119, "spark", "c3Bhcms="));
    }

    #[test]
    fn error_handling_requires_sentinel() {
        assert!(error_handling_passes(NO_OUTPUT));
        assert!(error_handling_passes("No output, find exception: error: bad"));
        assert!(!error_handling_passes("null"));
        assert!(!error_handling_passes("Cannot cast"));
    }

    #[test]
    fn differential_folding() {
        assert_eq!(bucket_count(["-1", "-1", "-1"]), 1);
        assert_eq!(bucket_count([NO_OUTPUT, "No output, find exception: x"]), 1);
        assert_eq!(bucket_count(["NULL", "null"]), 1);
        assert_eq!(bucket_count(["null", "8.88888888888889E9"]), 2);
        assert_eq!(bucket_count(["1", NO_OUTPUT]), 2);
        assert!(differential_passes(std::iter::empty()));
        assert!(!differential_passes(["1", "2"]));
    }

    #[test]
    fn differential_ignores_allow_list() {
        // Row 117 passes write-read through the allow-list, but two read
        // renderings still disagree differentially.
        assert!(write_read_passes(117, "spark", "c3Bhcms="));
        assert!(!differential_passes(["spark", "c3Bhcms="]));
    }

    #[test]
    fn axis_names() {
        let names: Vec<&str> = Axis::ALL.iter().map(|axis| axis.as_str()).collect();
        assert_eq!(names, vec!["wr", "eh", "difft"]);
    }
}
