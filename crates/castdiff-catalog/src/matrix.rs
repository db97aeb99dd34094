//! Test matrix: the catalog flattened into dense rows.
//!
//! Row ids are assigned in type-then-case order (valid cases before invalid
//! ones within each type). The order is part of the contract with the log
//! analysis side, so nothing here may reorder or filter rows before ids are
//! assigned.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use castdiff_error::{CastDiffError, Result};
use castdiff_types::ground_truth::{EXPECTED_TABLE_FILE, ORIGINAL_TABLE_FILE, expected_line};
use castdiff_types::{
    ExpectedOutcome, Interface, Literal, OriginalEntry, RowId, TestPlan, TestRow,
};
use tracing::{debug, info};

use crate::{CatalogScope, generators};

/// One literal bound to a (write, read) interface pair.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Binding {
    pub row: RowId,
    /// Column type in the write system's dialect.
    pub type_name: String,
    pub write: Interface,
    pub read: Interface,
    pub literal: Literal,
    pub write_expected: ExpectedOutcome,
    pub read_expected: ExpectedOutcome,
}

/// Paths written by [`TestMatrix::write_ground_truth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthFiles {
    pub original: PathBuf,
    pub expected: PathBuf,
    pub bindings: PathBuf,
}

/// Every generated row, immutable once built.
#[derive(Debug, Clone)]
pub struct TestMatrix {
    scope: CatalogScope,
    rows: Vec<TestRow>,
}

impl TestMatrix {
    /// Flatten the catalog for `scope`.
    #[must_use]
    pub fn build(scope: CatalogScope) -> Self {
        let mut rows = Vec::new();
        for spec in scope.types() {
            let generators = generators(spec.tag);
            let valid = (generators.valid)(&spec);
            let invalid = (generators.invalid)(&spec);
            debug!(
                type_name = %spec,
                first_row = rows.len(),
                valid = valid.len(),
                invalid = invalid.len(),
                "catalog type flattened"
            );
            for case in valid.into_iter().chain(invalid) {
                let id = RowId::try_from(rows.len()).unwrap_or(RowId::MAX);
                rows.push(TestRow {
                    id,
                    type_spec: spec.clone(),
                    case,
                });
            }
        }
        info!(
            scope = ?scope,
            rows = rows.len(),
            valid = rows.iter().filter(|row| row.valid()).count(),
            "test matrix built"
        );
        Self { scope, rows }
    }

    #[must_use]
    pub const fn scope(&self) -> CatalogScope {
        self.scope
    }

    #[must_use]
    pub fn rows(&self) -> &[TestRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, id: RowId) -> Option<&TestRow> {
        self.rows.get(usize::try_from(id).ok()?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows a plan writes at all. Interoperability plans only carry rows
    /// that evaluate on the primary write interface.
    fn plan_rows(&self, plan: TestPlan) -> impl Iterator<Item = &TestRow> {
        let primary = plan.primary_interface();
        let isolated = plan.is_isolated();
        self.rows
            .iter()
            .filter(move |row| isolated || row.valid_on(primary))
    }

    fn bind(plan: TestPlan, row: &TestRow, write: Interface, read: Interface) -> Binding {
        Binding {
            row: row.id,
            type_name: row.type_spec.render(plan.write_system()),
            write,
            read,
            literal: row.literal(write).clone(),
            write_expected: row.expected(write).clone(),
            read_expected: row.expected(read).clone(),
        }
    }

    /// Bindings for every (write, read) pair of `plan`, write-major, rows in
    /// id order within each pair.
    #[must_use]
    pub fn bindings(&self, plan: TestPlan) -> Vec<Binding> {
        let mut out = Vec::new();
        for (write, read) in plan.pairs() {
            out.extend(
                self.plan_rows(plan)
                    .map(|row| Self::bind(plan, row, write, read)),
            );
        }
        out
    }

    /// One-way bindings: only rows valid on the primary write interface, and
    /// a secondary write interface only binds rows it can evaluate itself.
    #[must_use]
    pub fn one_way_bindings(&self, plan: TestPlan) -> Vec<Binding> {
        let primary = plan.primary_interface();
        let mut out = Vec::new();
        for (write, read) in plan.pairs() {
            out.extend(
                self.rows
                    .iter()
                    .filter(|row| row.valid_on(primary))
                    .filter(|row| write == primary || row.valid_on(write))
                    .map(|row| Self::bind(plan, row, write, read)),
            );
        }
        out
    }

    /// `t_original.json` content: the primary write literal, type and
    /// validity per row. When the plan crosses engines, a row whose outcome
    /// kinds disagree across the plan's interfaces is left out entirely.
    #[must_use]
    pub fn original_table(&self, plan: TestPlan) -> BTreeMap<RowId, OriginalEntry> {
        let primary = plan.primary_interface();
        let interfaces = plan.interfaces();
        let crosses_engines = plan.write_system() != plan.read_system();
        self.rows
            .iter()
            .filter(|row| !crosses_engines || row.case.expected.kinds_agree(&interfaces))
            .map(|row| {
                let entry = OriginalEntry {
                    value: row.literal(primary).to_string(),
                    type_name: row.type_spec.render(plan.write_system()),
                    valid: row.valid_on(primary),
                };
                (row.id, entry)
            })
            .collect()
    }

    /// `t_expected` lines for every row in [`Self::original_table`] that is
    /// expected to evaluate.
    #[must_use]
    pub fn expected_table(&self, plan: TestPlan) -> Vec<String> {
        let primary = plan.primary_interface();
        let original = self.original_table(plan);
        self.rows
            .iter()
            .filter(|row| original.get(&row.id).is_some_and(|entry| entry.valid))
            .map(|row| expected_line(row.id, row.expected(primary).value()))
            .collect()
    }

    /// Write `t_original.json`, `t_expected` and `<plan>_bindings.json`
    /// into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CastDiffError::Io`] when the directory or a file cannot be
    /// written.
    pub fn write_ground_truth(
        &self,
        plan: TestPlan,
        dir: &Path,
        one_way: bool,
    ) -> Result<GroundTruthFiles> {
        fs::create_dir_all(dir)?;

        let original = self.original_table(plan);
        let original_path = dir.join(ORIGINAL_TABLE_FILE);
        let json = serde_json::to_string_pretty(&original).map_err(CastDiffError::serialization)?;
        fs::write(&original_path, json)?;

        let mut expected = self.expected_table(plan).join("\n");
        if !expected.is_empty() {
            expected.push('\n');
        }
        let expected_path = dir.join(EXPECTED_TABLE_FILE);
        fs::write(&expected_path, expected)?;

        let bindings = if one_way {
            self.one_way_bindings(plan)
        } else {
            self.bindings(plan)
        };
        let bindings_path = dir.join(format!("{plan}_bindings.json"));
        let json = serde_json::to_string_pretty(&bindings).map_err(CastDiffError::serialization)?;
        fs::write(&bindings_path, json)?;

        info!(
            plan = %plan,
            dir = %dir.display(),
            original = original.len(),
            bindings = bindings.len(),
            one_way,
            "ground truth written"
        );
        Ok(GroundTruthFiles {
            original: original_path,
            expected: expected_path,
            bindings: bindings_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use castdiff_types::TypeTag;

    use super::*;

    fn matrix() -> TestMatrix {
        TestMatrix::build(CatalogScope::Standard)
    }

    #[test]
    fn ids_are_dense() {
        let matrix = matrix();
        for (idx, row) in matrix.rows().iter().enumerate() {
            assert_eq!(row.id as usize, idx);
        }
        assert_eq!(matrix.row(0).map(|row| row.type_spec.tag), Some(TypeTag::Byte));
        assert!(matrix.row(u32::try_from(matrix.len()).unwrap()).is_none());
    }

    #[test]
    fn valid_cases_precede_invalid_within_type() {
        let matrix = matrix();
        let bytes: Vec<bool> = matrix
            .rows()
            .iter()
            .filter(|row| row.type_spec.tag == TypeTag::Byte)
            .map(TestRow::valid)
            .collect();
        assert_eq!(bytes, vec![true, true, true, true, true, false, false, false, false]);
    }

    #[test]
    fn signed_minimum_left_out_of_cross_engine_original_table() {
        let matrix = matrix();
        let ss = matrix.original_table(TestPlan::SparkToSpark);
        let sh = matrix.original_table(TestPlan::SparkToHive);
        assert_eq!(ss[&0].value, "cast(-128 as byte)");
        assert_eq!(ss[&0].type_name, "BYTE");
        assert!(!sh.contains_key(&0));
        assert!(sh.contains_key(&1));
    }

    #[test]
    fn hive_plan_uses_hive_dialect() {
        let matrix = matrix();
        let hs = matrix.original_table(TestPlan::HiveToSpark);
        assert_eq!(hs[&1].value, "-1Y");
        assert_eq!(hs[&1].type_name, "TINYINT");
    }

    #[test]
    fn expected_table_lists_valid_rows_only() {
        let matrix = matrix();
        let lines = matrix.expected_table(TestPlan::SparkToSpark);
        assert_eq!(lines[0], "0\t-128");
        assert_eq!(lines[1], "1\t-1");
        assert!(!lines.iter().any(|line| line.starts_with("5\t")));
        let valid = matrix.rows().iter().filter(|row| row.valid()).count();
        assert_eq!(lines.len(), valid);
    }

    #[test]
    fn interop_bindings_skip_rows_invalid_on_primary() {
        let matrix = matrix();
        let sh = matrix.bindings(TestPlan::SparkToHive);
        let ss = matrix.bindings(TestPlan::SparkToSpark);
        assert!(sh.iter().all(|binding| matrix.rows()[binding.row as usize].valid()));
        assert_eq!(ss.len(), matrix.len() * 4);
        assert_eq!(ss[0].write, Interface::Sql);
        assert_eq!(ss[0].read, Interface::Sql);
        assert_eq!(ss[matrix.len()].read, Interface::Df);
    }

    #[test]
    fn one_way_drops_rows_the_secondary_writer_rejects() {
        let matrix = matrix();
        let hs = matrix.one_way_bindings(TestPlan::HiveToSpark);
        // Hive is the only writer and rejects the signed minimum.
        assert!(!hs.iter().any(|binding| binding.row == 0));
        let sh = matrix.one_way_bindings(TestPlan::SparkToHive);
        assert!(sh.iter().any(|binding| binding.row == 0 && binding.write == Interface::Df));
    }

    #[test]
    fn ground_truth_files_written() {
        let dir = tempfile::tempdir().unwrap();
        let files = matrix()
            .write_ground_truth(TestPlan::SparkToSpark, dir.path(), false)
            .unwrap();
        let original: BTreeMap<RowId, OriginalEntry> =
            serde_json::from_str(&fs::read_to_string(&files.original).unwrap()).unwrap();
        assert_eq!(original.len(), matrix().len());
        let expected = fs::read_to_string(&files.expected).unwrap();
        assert!(expected.starts_with("0\t-128\n"));
        assert!(files.bindings.ends_with("ss_bindings.json"));
    }
}
