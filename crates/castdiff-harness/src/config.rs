//! Oracle configuration.
//!
//! Passed explicitly to every pass; nothing in the harness reads process
//! state on its own. Environment overrides are applied once, by the caller,
//! through [`OracleConfig::from_env`].

use castdiff_error::{CastDiffError, Result};

/// Console logs open with a banner line before the first statement echo.
pub const DEFAULT_LOG_START_LINE: usize = 1;

/// Lines inspected after a row's start marker, marker line included.
pub const DEFAULT_SCAN_WINDOW: usize = 30;

pub const ENV_LOG_START_LINE: &str = "CASTDIFF_LOG_START_LINE";
pub const ENV_SCAN_WINDOW: &str = "CASTDIFF_SCAN_WINDOW";

/// Tunables for the exception window scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OracleConfig {
    /// Zero-based index of the first log line considered for start markers.
    pub log_start_line: usize,
    /// Exclusive bound on how far past a start marker the scan may look.
    pub scan_window: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            log_start_line: DEFAULT_LOG_START_LINE,
            scan_window: DEFAULT_SCAN_WINDOW,
        }
    }
}

impl OracleConfig {
    /// Defaults overridden by `CASTDIFF_LOG_START_LINE` and
    /// `CASTDIFF_SCAN_WINDOW` when set.
    ///
    /// # Errors
    ///
    /// [`CastDiffError::InvalidConfig`] when a variable is set but does not
    /// parse, or the result fails [`Self::validate`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_LOG_START_LINE) {
            config.log_start_line = parse_usize(ENV_LOG_START_LINE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SCAN_WINDOW) {
            config.scan_window = parse_usize(ENV_SCAN_WINDOW, &raw)?;
        }
        if !config.validate().is_empty() {
            return Err(CastDiffError::invalid_config(
                ENV_SCAN_WINDOW,
                config.scan_window.to_string(),
            ));
        }
        Ok(config)
    }

    /// Problems that would make the scanner inert, one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.scan_window < 2 {
            problems.push(format!(
                "{ENV_SCAN_WINDOW}={} leaves no line after the start marker",
                self.scan_window
            ));
        }
        problems
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| CastDiffError::invalid_config(key, raw))
}
