//! End-to-end analysis of one log directory.
//!
//! ```text
//! ground truth ─► ingest ─► scan ─► dump ─┐
//!                       (dry run) dump ───┴─► classify ─► reports
//! ```

use std::path::{Path, PathBuf};

use castdiff_error::Result;
use castdiff_types::TestPlan;
use tracing::info;

use crate::behavior::{BehaviorDump, dump_file_name};
use crate::classify::Classifier;
use crate::config::OracleConfig;
use crate::ground_truth::GroundTruth;
use crate::ingest::{IngestStats, ingest};
use crate::log_dir::LogDir;
use crate::logging::log_timed_operation;
use crate::report::{ReportWriter, Reports, aggregate};
use crate::scanner::{ExceptionScanner, ScanStats};

/// What one analysis produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub reports: Reports,
    /// Report files in write order.
    pub written: Vec<PathBuf>,
    pub dump_path: PathBuf,
    /// `None` on a dry run.
    pub ingest: Option<IngestStats>,
    /// `None` on a dry run.
    pub scan: Option<ScanStats>,
}

/// Options for [`analyze`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    pub config: OracleConfig,
    /// Reclassify from the saved dump instead of reading logs.
    pub dry_run: bool,
}

/// Analyze `log_dir` under `plan` and write every report into it.
///
/// # Errors
///
/// Any ground truth, dump, I/O or serialization failure. Nothing is written
/// when the ground truth cannot be loaded.
pub fn analyze(log_dir: &Path, plan: TestPlan, options: AnalyzeOptions) -> Result<AnalysisOutcome> {
    let plan_name = plan.as_str();
    info!(
        dir = %log_dir.display(),
        plan = plan_name,
        dry_run = options.dry_run,
        log_start_line = options.config.log_start_line,
        scan_window = options.config.scan_window,
        "analysis started"
    );

    let truth = GroundTruth::load(log_dir)?;
    let dump_path = log_dir.join(dump_file_name(plan));

    let (dump, ingest_stats, scan_stats) = if options.dry_run {
        let dump = BehaviorDump::load(&dump_path, plan, truth.digest())?;
        (dump, None, None)
    } else {
        let dir = LogDir::discover(log_dir)?;
        let inputs = truth.test_inputs(plan);
        let (mut rows, ingest_stats) =
            log_timed_operation("ingest", plan_name, || ingest(&dir, plan, &inputs))?;
        let scan_stats = log_timed_operation("scan", plan_name, || {
            Ok::<_, castdiff_error::CastDiffError>(
                ExceptionScanner::new(&dir, &options.config).scan(&mut rows),
            )
        })?;
        let dump = BehaviorDump {
            plan,
            ground_truth_digest: truth.digest().to_owned(),
            rows,
        };
        dump.save(&dump_path)?;
        (dump, Some(ingest_stats), Some(scan_stats))
    };

    let reports = log_timed_operation("classify", plan_name, || {
        let classifier = Classifier::new(&truth, plan);
        let wr = classifier.write_read(&dump.rows)?;
        let eh = classifier.error_handling(&dump.rows)?;
        let difft = classifier.differential(&dump.rows)?;
        Ok::<_, castdiff_error::CastDiffError>(aggregate(plan, truth.digest(), wr, eh, difft))
    })?;
    let written = ReportWriter::new(log_dir).write(&reports)?;

    Ok(AnalysisOutcome {
        reports,
        written,
        dump_path,
        ingest: ingest_stats,
        scan: scan_stats,
    })
}
