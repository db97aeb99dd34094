//! Query interfaces, engines, storage formats and test plans.

use std::fmt;
use std::str::FromStr;

use castdiff_error::CastDiffError;

/// One of the three query surfaces under test.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Interface {
    /// Spark SQL console.
    Sql,
    /// Spark Scala `DataFrame` API.
    Df,
    /// Hive console.
    Hql,
}

impl Interface {
    pub const ALL: [Self; 3] = [Self::Sql, Self::Df, Self::Hql];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Df => "df",
            Self::Hql => "hql",
        }
    }

    /// Engine that serves this interface.
    #[must_use]
    pub const fn system(self) -> System {
        match self {
            Self::Sql | Self::Df => System::Spark,
            Self::Hql => System::Hive,
        }
    }

    /// Separator between the row id column and the value in captured output.
    ///
    /// Console surfaces print tab-separated rows; `show()` prints a `|` grid.
    #[must_use]
    pub const fn delimiter(self) -> char {
        match self {
            Self::Sql | Self::Hql => '\t',
            Self::Df => '|',
        }
    }

    /// Whether the last character of a captured row is grid decoration.
    #[must_use]
    pub const fn drops_trailing_char(self) -> bool {
        matches!(self, Self::Df)
    }

    /// Parse a lowercase interface name as it appears in file names.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ifc| ifc.as_str() == name)
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A database engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum System {
    Spark,
    Hive,
}

impl System {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spark => "spark",
            Self::Hive => "hive",
        }
    }

    /// The console interface used as the system's reference surface.
    #[must_use]
    pub const fn primary_interface(self) -> Interface {
        match self {
            Self::Spark => Interface::Sql,
            Self::Hive => Interface::Hql,
        }
    }

    #[must_use]
    pub const fn interfaces(self) -> &'static [Interface] {
        match self {
            Self::Spark => &[Interface::Sql, Interface::Df],
            Self::Hive => &[Interface::Hql],
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for System {
    type Err = CastDiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spark" => Ok(Self::Spark),
            "hive" => Ok(Self::Hive),
            _ => Err(CastDiffError::UnknownSystem { name: s.to_owned() }),
        }
    }
}

/// Table storage format used for the write/read round trip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FormatType {
    Avro,
    Orc,
    Parquet,
}

impl FormatType {
    pub const ALL: [Self; 3] = [Self::Avro, Self::Orc, Self::Parquet];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avro => "avro",
            Self::Orc => "orc",
            Self::Parquet => "parquet",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|fmt| fmt.as_str() == name)
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which engine writes the tables and which one reads them back.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum TestPlan {
    /// Spark writes, Spark reads. The only plan that tests invalid inputs.
    #[serde(rename = "ss")]
    SparkToSpark,
    /// Hive writes, Spark reads.
    #[serde(rename = "hs")]
    HiveToSpark,
    /// Spark writes, Hive reads.
    #[serde(rename = "sh")]
    SparkToHive,
}

impl TestPlan {
    pub const ALL: [Self; 3] = [Self::SparkToSpark, Self::HiveToSpark, Self::SparkToHive];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SparkToSpark => "ss",
            Self::HiveToSpark => "hs",
            Self::SparkToHive => "sh",
        }
    }

    /// Resolve the plan for a (write, read) system pair.
    ///
    /// # Errors
    ///
    /// Hive-to-Hive has no plan and yields
    /// [`CastDiffError::UnsupportedSystemPair`].
    pub fn from_systems(write: System, read: System) -> Result<Self, CastDiffError> {
        match (write, read) {
            (System::Spark, System::Spark) => Ok(Self::SparkToSpark),
            (System::Hive, System::Spark) => Ok(Self::HiveToSpark),
            (System::Spark, System::Hive) => Ok(Self::SparkToHive),
            (System::Hive, System::Hive) => Err(CastDiffError::UnsupportedSystemPair {
                write: write.to_string(),
                read: read.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn write_system(self) -> System {
        match self {
            Self::SparkToSpark | Self::SparkToHive => System::Spark,
            Self::HiveToSpark => System::Hive,
        }
    }

    #[must_use]
    pub const fn read_system(self) -> System {
        match self {
            Self::SparkToSpark | Self::HiveToSpark => System::Spark,
            Self::SparkToHive => System::Hive,
        }
    }

    #[must_use]
    pub const fn write_interfaces(self) -> &'static [Interface] {
        self.write_system().interfaces()
    }

    #[must_use]
    pub const fn read_interfaces(self) -> &'static [Interface] {
        self.read_system().interfaces()
    }

    /// Interface whose outcome decides a row's validity for this plan.
    #[must_use]
    pub const fn primary_interface(self) -> Interface {
        self.write_system().primary_interface()
    }

    /// Whether one engine is tested in isolation (invalid inputs in scope).
    #[must_use]
    pub const fn is_isolated(self) -> bool {
        matches!(self, Self::SparkToSpark)
    }

    /// Every interface touched by the plan, in [`Interface::ALL`] order.
    #[must_use]
    pub fn interfaces(self) -> Vec<Interface> {
        Interface::ALL
            .into_iter()
            .filter(|ifc| {
                self.write_interfaces().contains(ifc) || self.read_interfaces().contains(ifc)
            })
            .collect()
    }

    /// All (write, read) interface pairs, write-major.
    #[must_use]
    pub fn pairs(self) -> Vec<(Interface, Interface)> {
        let mut pairs = Vec::new();
        for &write in self.write_interfaces() {
            for &read in self.read_interfaces() {
                pairs.push((write, read));
            }
        }
        pairs
    }
}

impl fmt::Display for TestPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestPlan {
    type Err = CastDiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plan| plan.as_str() == s)
            .ok_or_else(|| CastDiffError::UnknownTestPlan { name: s.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_names_round_trip() {
        for ifc in Interface::ALL {
            assert_eq!(Interface::parse(ifc.as_str()), Some(ifc));
        }
        assert_eq!(Interface::parse("SQL"), None);
        assert_eq!(Interface::parse("spark"), None);
    }

    #[test]
    fn delimiters() {
        assert_eq!(Interface::Sql.delimiter(), '\t');
        assert_eq!(Interface::Hql.delimiter(), '\t');
        assert_eq!(Interface::Df.delimiter(), '|');
        assert!(Interface::Df.drops_trailing_char());
        assert!(!Interface::Sql.drops_trailing_char());
    }

    #[test]
    fn plan_write_interfaces() {
        assert_eq!(
            TestPlan::SparkToSpark.write_interfaces(),
            &[Interface::Sql, Interface::Df]
        );
        assert_eq!(
            TestPlan::SparkToHive.write_interfaces(),
            &[Interface::Sql, Interface::Df]
        );
        assert_eq!(TestPlan::HiveToSpark.write_interfaces(), &[Interface::Hql]);
    }

    #[test]
    fn plan_pairs_are_write_major() {
        assert_eq!(
            TestPlan::SparkToSpark.pairs(),
            vec![
                (Interface::Sql, Interface::Sql),
                (Interface::Sql, Interface::Df),
                (Interface::Df, Interface::Sql),
                (Interface::Df, Interface::Df),
            ]
        );
        assert_eq!(
            TestPlan::SparkToHive.pairs(),
            vec![(Interface::Sql, Interface::Hql), (Interface::Df, Interface::Hql)]
        );
        assert_eq!(
            TestPlan::HiveToSpark.interfaces(),
            vec![Interface::Sql, Interface::Df, Interface::Hql]
        );
    }

    #[test]
    fn only_spark_to_spark_is_isolated() {
        assert!(TestPlan::SparkToSpark.is_isolated());
        assert!(!TestPlan::HiveToSpark.is_isolated());
        assert!(!TestPlan::SparkToHive.is_isolated());
    }

    #[test]
    fn plan_from_systems() {
        assert_eq!(
            TestPlan::from_systems(System::Hive, System::Spark).unwrap(),
            TestPlan::HiveToSpark
        );
        assert_eq!(
            TestPlan::from_systems(System::Spark, System::Hive).unwrap(),
            TestPlan::SparkToHive
        );
        let err = TestPlan::from_systems(System::Hive, System::Hive).unwrap_err();
        assert!(matches!(err, CastDiffError::UnsupportedSystemPair { .. }));
    }

    #[test]
    fn plan_from_str() {
        assert_eq!("sh".parse::<TestPlan>().unwrap(), TestPlan::SparkToHive);
        let err = "hh".parse::<TestPlan>().unwrap_err();
        assert!(matches!(err, CastDiffError::UnknownTestPlan { name } if name == "hh"));
    }

    #[test]
    fn system_from_str_ignores_case() {
        assert_eq!("Hive".parse::<System>().unwrap(), System::Hive);
        assert!("presto".parse::<System>().is_err());
        assert_eq!(System::Hive.primary_interface(), Interface::Hql);
    }

    #[test]
    fn format_parse() {
        assert_eq!(FormatType::parse("orc"), Some(FormatType::Orc));
        assert_eq!(FormatType::parse("csv"), None);
    }
}
