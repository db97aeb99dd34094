use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for castdiff operations.
///
/// Only invariant violations in the inputs handed over by the generation
/// stage surface here. Missing evidence, unparseable log lines and divergent
/// renderings are observations and travel as verdict data instead.
#[derive(Error, Debug)]
pub enum CastDiffError {
    // === I/O Errors ===
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Ground Truth Errors ===
    /// A ground-truth file is absent from the log directory.
    #[error("ground truth not found: '{path}'")]
    GroundTruthMissing { path: PathBuf },

    /// A ground-truth file exists but cannot be decoded.
    #[error("malformed ground truth in '{path}': {detail}")]
    MalformedGroundTruth { path: PathBuf, detail: String },

    /// The catalog row-id space and the ground-truth row-id space disagree.
    #[error("row id space mismatch: {detail}")]
    RowIdMismatch { detail: String },

    // === Log Directory Errors ===
    /// A table file name does not follow the `t_w_<ifc>[_r_<ifc>]_<fmt>` scheme.
    #[error("bad table file name: '{name}'")]
    BadTableFileName { name: String },

    /// The behavior dump requested for a dry run is missing or unreadable.
    #[error("malformed behavior dump '{path}': {detail}")]
    MalformedDump { path: PathBuf, detail: String },

    /// The behavior dump was produced against a different ground truth.
    #[error("stale behavior dump '{path}': ground truth digest {found} != {expected}")]
    StaleDump {
        path: PathBuf,
        expected: String,
        found: String,
    },

    // === Selection Errors ===
    /// Test plan name is not one of `ss`, `hs`, `sh`.
    #[error("unknown test plan: {name}")]
    UnknownTestPlan { name: String },

    /// System name is not one of `spark`, `hive`.
    #[error("unknown system: {name}")]
    UnknownSystem { name: String },

    /// The (write, read) system pair has no test plan.
    #[error("no test plan writes with {write} and reads with {read}")]
    UnsupportedSystemPair { write: String, read: String },

    /// A configuration value failed to parse or is out of range.
    #[error("invalid configuration {key}={value}")]
    InvalidConfig { key: String, value: String },

    // === Internal Errors ===
    /// Report or dump (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal logic error (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CastDiffError {
    /// Whether the run must abort because an input invariant is broken.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::GroundTruthMissing { .. }
                | Self::MalformedGroundTruth { .. }
                | Self::RowIdMismatch { .. }
                | Self::StaleDump { .. }
                | Self::Internal(_)
        )
    }

    /// Whether the user can likely fix this without code changes.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::GroundTruthMissing { .. }
                | Self::BadTableFileName { .. }
                | Self::MalformedDump { .. }
                | Self::StaleDump { .. }
                | Self::UnknownTestPlan { .. }
                | Self::UnknownSystem { .. }
                | Self::UnsupportedSystemPair { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::GroundTruthMissing { .. } => {
                Some("Run `castdiff generate` into the log directory first")
            }
            Self::MalformedGroundTruth { .. } | Self::RowIdMismatch { .. } => {
                Some("Regenerate the ground truth with the same catalog that produced the logs")
            }
            Self::MalformedDump { .. } | Self::StaleDump { .. } => {
                Some("Re-run without --dry-run to rebuild the behavior dump")
            }
            Self::UnknownTestPlan { .. } => Some("Use one of: ss, hs, sh"),
            Self::UnknownSystem { .. } => Some("Use one of: spark, hive"),
            Self::UnsupportedSystemPair { .. } => {
                Some("Pick spark->spark, hive->spark or spark->hive")
            }
            Self::BadTableFileName { .. } => {
                Some("Table files must be named t_w_<ifc>_<fmt> or t_w_<ifc>_r_<ifc>_<fmt>")
            }
            _ => None,
        }
    }

    /// Get the process exit code for this error (for CLI use).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownTestPlan { .. }
            | Self::UnknownSystem { .. }
            | Self::UnsupportedSystemPair { .. }
            | Self::InvalidConfig { .. } => 2,
            Self::Io(_) => 3,
            Self::GroundTruthMissing { .. }
            | Self::MalformedGroundTruth { .. }
            | Self::RowIdMismatch { .. } => 4,
            Self::BadTableFileName { .. } | Self::MalformedDump { .. } | Self::StaleDump { .. } => 5,
            Self::Serialization(_) | Self::Internal(_) => 70,
        }
    }

    /// Create a malformed ground truth error.
    pub fn malformed_ground_truth(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::MalformedGroundTruth {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Create a row id mismatch error.
    pub fn row_id_mismatch(detail: impl Into<String>) -> Self {
        Self::RowIdMismatch {
            detail: detail.into(),
        }
    }

    /// Create a malformed dump error.
    pub fn malformed_dump(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::MalformedDump {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a serialization error from any displayable cause.
    pub fn serialization(cause: impl std::fmt::Display) -> Self {
        Self::Serialization(cause.to_string())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using `CastDiffError`.
pub type Result<T> = std::result::Result<T, CastDiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_ground_truth() {
        let err = CastDiffError::malformed_ground_truth("logs/t_original.json", "expected value");
        assert_eq!(
            err.to_string(),
            "malformed ground truth in 'logs/t_original.json': expected value"
        );
    }

    #[test]
    fn error_display_stale_dump() {
        let err = CastDiffError::StaleDump {
            path: PathBuf::from("ss_ungrouped_results.json"),
            expected: "ab".to_owned(),
            found: "cd".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "stale behavior dump 'ss_ungrouped_results.json': ground truth digest cd != ab"
        );
    }

    #[test]
    fn ground_truth_violations_are_fatal() {
        assert!(
            CastDiffError::GroundTruthMissing {
                path: PathBuf::from("t_original.json")
            }
            .is_fatal()
        );
        assert!(CastDiffError::row_id_mismatch("row 7").is_fatal());
        assert!(CastDiffError::malformed_ground_truth("t_expected", "line 3").is_fatal());
        assert!(!CastDiffError::invalid_config("CASTDIFF_SCAN_WINDOW", "x").is_fatal());
        assert!(
            !CastDiffError::BadTableFileName {
                name: "t_x".to_owned()
            }
            .is_fatal()
        );
    }

    #[test]
    fn user_recoverable() {
        assert!(
            CastDiffError::UnknownTestPlan {
                name: "hh".to_owned()
            }
            .is_user_recoverable()
        );
        assert!(!CastDiffError::internal("bug").is_user_recoverable());
        assert!(!CastDiffError::row_id_mismatch("x").is_user_recoverable());
    }

    #[test]
    fn suggestions() {
        assert!(
            CastDiffError::UnknownSystem {
                name: "presto".to_owned()
            }
            .suggestion()
            .is_some()
        );
        assert!(CastDiffError::malformed_dump("d", "eof").suggestion().is_some());
        assert!(CastDiffError::internal("x").suggestion().is_none());
    }

    #[test]
    fn io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: CastDiffError = io_err.into();
        assert!(matches!(err, CastDiffError::Io(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn exit_code() {
        assert_eq!(
            CastDiffError::UnknownTestPlan {
                name: "x".to_owned()
            }
            .exit_code(),
            2
        );
        assert_eq!(CastDiffError::row_id_mismatch("x").exit_code(), 4);
        assert_eq!(CastDiffError::malformed_dump("d", "x").exit_code(), 5);
        assert_eq!(CastDiffError::internal("x").exit_code(), 70);
    }

    #[test]
    fn serialization_constructor_keeps_message() {
        let err = CastDiffError::serialization("EOF while parsing");
        assert!(matches!(err, CastDiffError::Serialization(msg) if msg == "EOF while parsing"));
    }
}
