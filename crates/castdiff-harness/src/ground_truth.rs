//! Ground truth loading and row-id space checks.
//!
//! Both files are produced by generation. Any disagreement between them, or
//! a missing file, aborts the run: comparisons against a partial ground
//! truth would silently misclassify rows.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use castdiff_error::{CastDiffError, Result};
use castdiff_types::ground_truth::{EXPECTED_NULL, EXPECTED_TABLE_FILE, ORIGINAL_TABLE_FILE};
use castdiff_types::{OriginalEntry, RowId, TestPlan};
use sha2::{Digest, Sha256};
use tracing::info;

/// Null rendering written by older generators; read as [`EXPECTED_NULL`].
const LEGACY_EXPECTED_NULL: &str = "None";

/// `t_original.json` and `t_expected`, cross-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruth {
    original: BTreeMap<RowId, OriginalEntry>,
    expected: BTreeMap<RowId, String>,
    digest: String,
}

fn read_required(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => CastDiffError::GroundTruthMissing {
            path: path.to_path_buf(),
        },
        _ => CastDiffError::Io(err),
    })
}

/// SHA-256 over both files, lowercase hex.
#[must_use]
pub fn ground_truth_digest(original: &str, expected: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(original.as_bytes());
    hasher.update([0_u8]);
    hasher.update(expected.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

impl GroundTruth {
    /// Load both files from `dir`.
    ///
    /// # Errors
    ///
    /// - [`CastDiffError::GroundTruthMissing`] if either file is absent.
    /// - [`CastDiffError::MalformedGroundTruth`] if either does not parse.
    /// - [`CastDiffError::RowIdMismatch`] if their row-id spaces disagree.
    pub fn load(dir: &Path) -> Result<Self> {
        let original_path = dir.join(ORIGINAL_TABLE_FILE);
        let expected_path = dir.join(EXPECTED_TABLE_FILE);
        let original_text = read_required(&original_path)?;
        let expected_text = read_required(&expected_path)?;
        let truth = Self::parse(&original_path, &original_text, &expected_path, &expected_text)?;
        info!(
            dir = %dir.display(),
            rows = truth.original.len(),
            expected = truth.expected.len(),
            digest = %truth.digest,
            "ground truth loaded"
        );
        Ok(truth)
    }

    /// Parse and cross-check file contents. Paths are only used in errors.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn parse(
        original_path: &Path,
        original_text: &str,
        expected_path: &Path,
        expected_text: &str,
    ) -> Result<Self> {
        let original: BTreeMap<RowId, OriginalEntry> = serde_json::from_str(original_text)
            .map_err(|err| CastDiffError::malformed_ground_truth(original_path, err.to_string()))?;

        let mut expected = BTreeMap::new();
        for (idx, line) in expected_text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let (row, value) = line.split_once('\t').ok_or_else(|| {
                CastDiffError::malformed_ground_truth(
                    expected_path,
                    format!("line {}: missing tab separator", idx + 1),
                )
            })?;
            let row: RowId = row.trim().parse().map_err(|_| {
                CastDiffError::malformed_ground_truth(
                    expected_path,
                    format!("line {}: bad row id '{row}'", idx + 1),
                )
            })?;
            let value = match value.trim() {
                LEGACY_EXPECTED_NULL => EXPECTED_NULL,
                value => value,
            };
            expected.insert(row, value.to_owned());
        }

        if let Some(row) = expected.keys().find(|row| !original.contains_key(*row)) {
            return Err(CastDiffError::row_id_mismatch(format!(
                "row {row} is in {EXPECTED_TABLE_FILE} but not in {ORIGINAL_TABLE_FILE}"
            )));
        }
        if let Some(row) = expected.keys().find(|row| !original[*row].valid) {
            return Err(CastDiffError::row_id_mismatch(format!(
                "row {row} has an expected value but is marked invalid"
            )));
        }
        if let Some(row) = original
            .iter()
            .find(|(row, entry)| entry.valid && !expected.contains_key(*row))
            .map(|(row, _)| row)
        {
            return Err(CastDiffError::row_id_mismatch(format!(
                "valid row {row} has no line in {EXPECTED_TABLE_FILE}"
            )));
        }

        Ok(Self {
            original,
            expected,
            digest: ground_truth_digest(original_text, expected_text),
        })
    }

    #[must_use]
    pub fn original(&self) -> &BTreeMap<RowId, OriginalEntry> {
        &self.original
    }

    #[must_use]
    pub fn entry(&self, row: RowId) -> Option<&OriginalEntry> {
        self.original.get(&row)
    }

    /// Expected round-trip rendering for a valid row.
    #[cfg(test)]
    fn expected(&self, row: RowId) -> Option<&str> {
        self.expected.get(&row).map(String::as_str)
    }

    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Rows the plan analyzes: every row in isolation, only valid rows when
    /// two engines interoperate.
    #[must_use]
    pub fn test_inputs(&self, plan: TestPlan) -> BTreeSet<RowId> {
        self.original
            .iter()
            .filter(|(_, entry)| plan.is_isolated() || entry.valid)
            .map(|(row, _)| *row)
            .collect()
    }

    /// Entry for `row`, or the fatal mismatch error classification needs.
    ///
    /// # Errors
    ///
    /// [`CastDiffError::RowIdMismatch`] if `row` is unknown.
    pub fn require(&self, row: RowId) -> Result<&OriginalEntry> {
        self.entry(row).ok_or_else(|| {
            CastDiffError::row_id_mismatch(format!(
                "row {row} has recorded behavior but no ground truth"
            ))
        })
    }
}
