//! Report aggregation and persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use castdiff_error::{CastDiffError, Result};
use castdiff_types::{RowId, TestPlan};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::{Axis, DiffVerdict, DiffVerdicts, RecordVerdict, RecordVerdicts};

/// Schema tag written into every summary.
pub const SUMMARY_SCHEMA_V1: &str = "castdiff.summary.v1";

/// Failure counts for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub schema_version: String,
    pub plan: TestPlan,
    pub ground_truth_digest: String,
    pub wr_checks: usize,
    pub wr_fails: usize,
    pub eh_checks: usize,
    pub eh_fails: usize,
    pub difft_rows: usize,
    /// Failing differential rows whose ground truth is valid.
    pub difft_fails_valid: usize,
    /// Failing differential rows whose ground truth is invalid.
    pub difft_fails_invalid: usize,
}

impl Summary {
    #[must_use]
    pub const fn total_fails(&self) -> usize {
        self.wr_fails + self.eh_fails + self.difft_fails_valid + self.difft_fails_invalid
    }

    /// Three lines in the same shape the failure tally has always printed.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "wr fails: {}\neh fails: {}\ndifft fails: {} {}\n",
            self.wr_fails, self.eh_fails, self.difft_fails_valid, self.difft_fails_invalid
        )
    }
}

/// "All" and "failed only" views of one axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisReport<V> {
    pub all: BTreeMap<RowId, V>,
    pub failed: BTreeMap<RowId, V>,
}

/// Every report of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reports {
    pub plan: TestPlan,
    pub wr: AxisReport<BTreeMap<String, RecordVerdict>>,
    pub eh: AxisReport<BTreeMap<String, RecordVerdict>>,
    pub difft: AxisReport<DiffVerdict>,
    pub summary: Summary,
}

fn failed_records(
    all: &RecordVerdicts,
) -> (BTreeMap<RowId, BTreeMap<String, RecordVerdict>>, usize) {
    let mut failed = BTreeMap::new();
    let mut count = 0;
    for (row, verdicts) in all {
        let failing: BTreeMap<String, RecordVerdict> = verdicts
            .iter()
            .filter(|(_, verdict)| !verdict.pass)
            .map(|(name, verdict)| (name.clone(), verdict.clone()))
            .collect();
        if !failing.is_empty() {
            count += failing.len();
            failed.insert(*row, failing);
        }
    }
    (failed, count)
}

fn record_count(all: &RecordVerdicts) -> usize {
    all.values().map(BTreeMap::len).sum()
}

/// Build both views of every axis plus the summary.
#[must_use]
pub fn aggregate(
    plan: TestPlan,
    ground_truth_digest: &str,
    wr: RecordVerdicts,
    eh: RecordVerdicts,
    difft: DiffVerdicts,
) -> Reports {
    let (wr_failed, wr_fails) = failed_records(&wr);
    let (eh_failed, eh_fails) = failed_records(&eh);
    let difft_failed: BTreeMap<RowId, DiffVerdict> = difft
        .iter()
        .filter(|(_, verdict)| !verdict.pass)
        .map(|(row, verdict)| (*row, verdict.clone()))
        .collect();
    let difft_fails_valid = difft_failed.values().filter(|v| v.origin.valid).count();

    let summary = Summary {
        schema_version: SUMMARY_SCHEMA_V1.to_owned(),
        plan,
        ground_truth_digest: ground_truth_digest.to_owned(),
        wr_checks: record_count(&wr),
        wr_fails,
        eh_checks: record_count(&eh),
        eh_fails,
        difft_rows: difft.len(),
        difft_fails_valid,
        difft_fails_invalid: difft_failed.len() - difft_fails_valid,
    };
    info!(
        plan = %plan,
        wr_fails,
        eh_fails,
        difft_fails_valid,
        difft_fails_invalid = summary.difft_fails_invalid,
        "reports aggregated"
    );

    Reports {
        plan,
        wr: AxisReport {
            all: wr,
            failed: wr_failed,
        },
        eh: AxisReport {
            all: eh,
            failed: eh_failed,
        },
        difft: AxisReport {
            all: difft,
            failed: difft_failed,
        },
        summary,
    }
}

/// Persists [`Reports`] as `<plan>_<axis>_{all,failed}.json` plus
/// `<plan>_summary.json`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value).map_err(CastDiffError::serialization)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    fn write_axis<V: Serialize>(
        &self,
        plan: TestPlan,
        axis: Axis,
        report: &AxisReport<V>,
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        written.push(self.write_json(&format!("{plan}_{}_all.json", axis.as_str()), &report.all)?);
        written.push(self.write_json(
            &format!("{plan}_{}_failed.json", axis.as_str()),
            &report.failed,
        )?);
        Ok(())
    }

    /// Write every report. The error-handling pair is only written for
    /// plans that test one engine in isolation.
    ///
    /// # Errors
    ///
    /// [`CastDiffError::Io`] or [`CastDiffError::Serialization`].
    pub fn write(&self, reports: &Reports) -> Result<Vec<PathBuf>> {
        let plan = reports.plan;
        let mut written = Vec::new();
        self.write_axis(plan, Axis::Differential, &reports.difft, &mut written)?;
        self.write_axis(plan, Axis::WriteRead, &reports.wr, &mut written)?;
        if plan.is_isolated() {
            self.write_axis(plan, Axis::ErrorHandling, &reports.eh, &mut written)?;
        }
        written.push(self.write_json(&format!("{plan}_summary.json"), &reports.summary)?);
        info!(
            dir = %self.dir.display(),
            files = written.len(),
            "reports written"
        );
        Ok(written)
    }
}
