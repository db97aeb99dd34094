//! Oracle harness: turns a directory of captured console logs into verdict
//! reports.
//!
//! The passes run in a fixed order over one [`behavior::BehaviorTable`]:
//! [`ingest`] fills it from table dumps, [`scanner`] attributes silent
//! failures to exception lines in the statement logs, [`classify`] judges
//! it against the [`ground_truth`] and [`report`] persists the verdicts.
//! [`pipeline::analyze`] wires them together.

pub mod behavior;
pub mod canonical;
pub mod classify;
pub mod config;
pub mod ground_truth;
pub mod ingest;
pub mod log_dir;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod scanner;

pub use behavior::{BehaviorDump, BehaviorRecord, BehaviorTable, Combination};
pub use classify::{Axis, Classifier, DiffVerdict, RecordVerdict};
pub use config::OracleConfig;
pub use ground_truth::GroundTruth;
pub use log_dir::{LogDir, ReadTable, WriteTable};
pub use pipeline::{AnalysisOutcome, AnalyzeOptions, analyze};
pub use report::{ReportWriter, Reports, Summary};
pub use scanner::ExceptionScanner;
