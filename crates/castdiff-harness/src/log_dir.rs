//! Log directory layout.
//!
//! ```text
//! t_w_<wifc>_<fmt>               write-side table dump
//! t_w_<wifc>_r_<rifc>_<fmt>      read-side table dump
//! log_w_<wifc>_<fmt>             console log of the write statements
//! log_w_<wifc>_r_<rifc>_<fmt>    console log of the read statements
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use castdiff_error::{CastDiffError, Result};
use castdiff_types::{FormatType, Interface, TestPlan};
use tracing::{debug, warn};

const TABLE_PREFIX: &str = "t_";
const LOG_PREFIX: &str = "log_";

fn bad_name(name: &str) -> CastDiffError {
    CastDiffError::BadTableFileName {
        name: name.to_owned(),
    }
}

fn interface(token: &str, name: &str) -> Result<Interface> {
    Interface::parse(token).ok_or_else(|| bad_name(name))
}

fn format_type(token: &str, name: &str) -> Result<FormatType> {
    FormatType::parse(token).ok_or_else(|| bad_name(name))
}

/// Table dump of what a write interface inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WriteTable {
    pub interface: Interface,
    pub format: FormatType,
}

impl WriteTable {
    /// Parse `t_w_<wifc>_<fmt>`.
    ///
    /// # Errors
    ///
    /// [`CastDiffError::BadTableFileName`] for anything else.
    pub fn parse(name: &str) -> Result<Self> {
        match name.split('_').collect::<Vec<_>>().as_slice() {
            ["t", "w", ifc, fmt] => Ok(Self {
                interface: interface(ifc, name)?,
                format: format_type(fmt, name)?,
            }),
            _ => Err(bad_name(name)),
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{TABLE_PREFIX}w_{}_{}", self.interface, self.format.as_str())
    }
}

/// Table dump of what a read interface saw for one write interface and
/// format. Behavior records are keyed by its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadTable {
    pub write: Interface,
    pub read: Interface,
    pub format: FormatType,
}

impl ReadTable {
    /// Parse `t_w_<wifc>_r_<rifc>_<fmt>`.
    ///
    /// # Errors
    ///
    /// [`CastDiffError::BadTableFileName`] for anything else.
    pub fn parse(name: &str) -> Result<Self> {
        match name.split('_').collect::<Vec<_>>().as_slice() {
            ["t", "w", write, "r", read, fmt] => Ok(Self {
                write: interface(write, name)?,
                read: interface(read, name)?,
                format: format_type(fmt, name)?,
            }),
            _ => Err(bad_name(name)),
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "{TABLE_PREFIX}w_{}_r_{}_{}",
            self.write,
            self.read,
            self.format.as_str()
        )
    }

    /// The write-side table for the same write interface and format.
    #[must_use]
    pub const fn write_table(&self) -> WriteTable {
        WriteTable {
            interface: self.write,
            format: self.format,
        }
    }

    /// Console log of the write statements: `log_w_<wifc>_<fmt>`.
    #[must_use]
    pub fn write_log_name(&self) -> String {
        format!("{LOG_PREFIX}w_{}_{}", self.write, self.format.as_str())
    }

    /// Console log of the read statements: `log_w_<wifc>_r_<rifc>_<fmt>`.
    #[must_use]
    pub fn read_log_name(&self) -> String {
        format!(
            "{LOG_PREFIX}w_{}_r_{}_{}",
            self.write,
            self.read,
            self.format.as_str()
        )
    }

    /// Whether the write side belongs to `plan`. Any read interface counts:
    /// a cross-engine run also reads back through the writing engine and
    /// the dataframe API.
    #[must_use]
    pub fn in_plan(&self, plan: TestPlan) -> bool {
        plan.write_interfaces().contains(&self.write)
    }
}

impl fmt::Display for ReadTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Table dumps found in a log directory, sorted by file name.
#[derive(Debug, Clone)]
pub struct LogDir {
    root: PathBuf,
    write_tables: Vec<WriteTable>,
    read_tables: Vec<ReadTable>,
}

impl LogDir {
    /// List `root` and classify its table dumps. Names that look like table
    /// dumps but do not parse are skipped with a warning.
    ///
    /// # Errors
    ///
    /// [`CastDiffError::Io`] when the directory cannot be listed.
    pub fn discover(root: &Path) -> Result<Self> {
        let mut names = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        names.sort();

        let mut write_tables = Vec::new();
        let mut read_tables = Vec::new();
        for name in names.iter().filter(|name| name.starts_with(TABLE_PREFIX)) {
            if name.contains("_r_") {
                match ReadTable::parse(name) {
                    Ok(table) => read_tables.push(table),
                    Err(err) => warn!(file = %name, error = %err, "skipping read table"),
                }
            } else if name.contains("_w_") {
                match WriteTable::parse(name) {
                    Ok(table) => write_tables.push(table),
                    Err(err) => warn!(file = %name, error = %err, "skipping write table"),
                }
            }
        }
        debug!(
            dir = %root.display(),
            write_tables = write_tables.len(),
            read_tables = read_tables.len(),
            "log directory discovered"
        );
        Ok(Self {
            root: root.to_path_buf(),
            write_tables,
            read_tables,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    #[must_use]
    pub fn write_tables(&self) -> &[WriteTable] {
        &self.write_tables
    }

    #[must_use]
    pub fn read_tables(&self) -> &[ReadTable] {
        &self.read_tables
    }

    /// Read tables whose write interface belongs to `plan`.
    pub fn plan_read_tables(&self, plan: TestPlan) -> impl Iterator<Item = &ReadTable> {
        self.read_tables.iter().filter(move |table| table.in_plan(plan))
    }

    /// Write tables whose interface writes in `plan`.
    pub fn plan_write_tables(&self, plan: TestPlan) -> impl Iterator<Item = &WriteTable> {
        self.write_tables
            .iter()
            .filter(move |table| plan.write_interfaces().contains(&table.interface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_write_table() {
        let table = WriteTable::parse("t_w_df_orc").unwrap();
        assert_eq!(table.interface, Interface::Df);
        assert_eq!(table.format, FormatType::Orc);
        assert_eq!(table.file_name(), "t_w_df_orc");
    }

    #[test]
    fn parse_read_table() {
        let table = ReadTable::parse("t_w_sql_r_hql_parquet").unwrap();
        assert_eq!(table.write, Interface::Sql);
        assert_eq!(table.read, Interface::Hql);
        assert_eq!(table.format, FormatType::Parquet);
        assert_eq!(table.to_string(), "t_w_sql_r_hql_parquet");
        assert_eq!(table.write_table().file_name(), "t_w_sql_parquet");
    }

    #[test]
    fn log_names() {
        let table = ReadTable::parse("t_w_sql_r_df_avro").unwrap();
        assert_eq!(table.write_log_name(), "log_w_sql_avro");
        assert_eq!(table.read_log_name(), "log_w_sql_r_df_avro");
    }

    #[test]
    fn bad_names_are_rejected() {
        for name in ["t_w_sql", "t_w_sql_json", "t_w_spark_orc", "t_w_sql_r_df_avro_x"] {
            assert!(
                ReadTable::parse(name).is_err() && WriteTable::parse(name).is_err(),
                "{name}"
            );
        }
        let err = ReadTable::parse("t_w_sql_r_xx_orc").unwrap_err();
        assert!(matches!(err, CastDiffError::BadTableFileName { ref name } if name == "t_w_sql_r_xx_orc"));
    }

    #[test]
    fn plan_membership() {
        let table = ReadTable::parse("t_w_hql_r_sql_orc").unwrap();
        assert!(table.in_plan(TestPlan::HiveToSpark));
        assert!(!table.in_plan(TestPlan::SparkToSpark));
        assert!(!table.in_plan(TestPlan::SparkToHive));

        let same_engine = ReadTable::parse("t_w_hql_r_hql_orc").unwrap();
        assert!(same_engine.in_plan(TestPlan::HiveToSpark));
        let spark_read_back = ReadTable::parse("t_w_sql_r_sql_orc").unwrap();
        assert!(spark_read_back.in_plan(TestPlan::SparkToHive));
        assert!(spark_read_back.in_plan(TestPlan::SparkToSpark));
    }

    #[test]
    fn discover_classifies_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "t_w_sql_orc",
            "t_w_sql_r_df_orc",
            "t_w_sql_r_sql_orc",
            "t_original.json",
            "t_expected",
            "log_w_sql_orc",
            "t_w_sql_r_df_orc.bak",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("t_w_df_avro")).unwrap();

        let log_dir = LogDir::discover(dir.path()).unwrap();
        assert_eq!(
            log_dir.write_tables(),
            &[WriteTable {
                interface: Interface::Sql,
                format: FormatType::Orc
            }]
        );
        let reads: Vec<String> = log_dir.read_tables().iter().map(ReadTable::file_name).collect();
        assert_eq!(reads, vec!["t_w_sql_r_df_orc", "t_w_sql_r_sql_orc"]);
        assert_eq!(log_dir.plan_read_tables(TestPlan::SparkToHive).count(), 2);
        assert_eq!(log_dir.plan_read_tables(TestPlan::HiveToSpark).count(), 0);
    }
}
