//! Ground-truth files exchanged between generation and analysis.
//!
//! Generation writes both files into the log directory; analysis refuses to
//! run without them.

use crate::row::RowId;

/// Structured ground truth: row id -> {value, type, valid}.
pub const ORIGINAL_TABLE_FILE: &str = "t_original.json";

/// Round-trip ground truth: one `row\tvalue` line per row expected to succeed.
pub const EXPECTED_TABLE_FILE: &str = "t_expected";

/// Rendering of an expected SQL NULL in [`EXPECTED_TABLE_FILE`].
pub const EXPECTED_NULL: &str = "null";

/// One row of [`ORIGINAL_TABLE_FILE`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OriginalEntry {
    /// Literal text on the plan's primary write interface.
    pub value: String,
    /// Column type in the primary system's dialect.
    #[serde(rename = "type")]
    pub type_name: String,
    pub valid: bool,
}

/// Format one [`EXPECTED_TABLE_FILE`] line (without the newline).
#[must_use]
pub fn expected_line(row: RowId, value: Option<&str>) -> String {
    format!("{row}\t{}", value.unwrap_or(EXPECTED_NULL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_entry_uses_type_key() {
        let entry = OriginalEntry {
            value: "-1".to_owned(),
            type_name: "INT".to_owned(),
            valid: true,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"value":"-1","type":"INT","valid":true}"#);
    }

    #[test]
    fn expected_line_renders_null() {
        assert_eq!(expected_line(3, Some("-1")), "3\t-1");
        assert_eq!(expected_line(140, None), "140\tnull");
    }
}
