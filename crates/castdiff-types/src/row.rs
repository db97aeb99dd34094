//! Literals, value cases and test rows.

use std::fmt;

use crate::interface::Interface;
use crate::outcome::{ExpectedOutcome, ExpectedValues};
use crate::type_spec::TypeSpec;

/// Dense row identifier assigned in catalog order.
pub type RowId = u32;

/// Expression text for one interface.
///
/// `DataFrame` temporal values combined with an interval keep the interval
/// apart: the dataframe surface adds it as a column expression after the
/// frame is built.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Literal {
    pub expr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

impl Literal {
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            interval: None,
        }
    }

    pub fn with_interval(expr: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            interval: Some(interval.into()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)?;
        if let Some(interval) = &self.interval {
            write!(f, " + {interval}")?;
        }
        Ok(())
    }
}

/// One test input: a literal per interface plus the expected outcomes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValueCase {
    pub sql: Literal,
    pub df: Literal,
    pub hql: Literal,
    pub expected: ExpectedValues,
}

impl ValueCase {
    #[must_use]
    pub const fn literal(&self, interface: Interface) -> &Literal {
        match interface {
            Interface::Sql => &self.sql,
            Interface::Df => &self.df,
            Interface::Hql => &self.hql,
        }
    }
}

/// A generated row. Immutable once the matrix is built.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TestRow {
    pub id: RowId,
    pub type_spec: TypeSpec,
    pub case: ValueCase,
}

impl TestRow {
    /// True iff the primary (`sql`) outcome is an expression.
    #[must_use]
    pub const fn valid(&self) -> bool {
        self.case.expected.primary().is_expression()
    }

    /// True iff `interface` expects an expression.
    #[must_use]
    pub fn valid_on(&self, interface: Interface) -> bool {
        self.expected(interface).is_expression()
    }

    #[must_use]
    pub fn expected(&self, interface: Interface) -> &ExpectedOutcome {
        self.case.expected.for_interface(interface)
    }

    #[must_use]
    pub const fn literal(&self, interface: Interface) -> &Literal {
        self.case.literal(interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_spec::TypeTag;

    fn byte_min_row() -> TestRow {
        TestRow {
            id: 0,
            type_spec: TypeSpec::representative(TypeTag::Byte),
            case: ValueCase {
                sql: Literal::new("cast(-128 as byte)"),
                df: Literal::new("(\"-128\").toByte"),
                hql: Literal::new("-128Y"),
                expected: ExpectedValues::new(ExpectedOutcome::expr("-128"))
                    .with_hql(ExpectedOutcome::exception()),
            },
        }
    }

    #[test]
    fn validity_follows_primary_interface() {
        let row = byte_min_row();
        assert!(row.valid());
        assert!(row.valid_on(Interface::Df));
        assert!(!row.valid_on(Interface::Hql));
    }

    #[test]
    fn literal_lookup_by_interface() {
        let row = byte_min_row();
        assert_eq!(row.literal(Interface::Hql).expr, "-128Y");
        assert_eq!(row.literal(Interface::Sql).to_string(), "cast(-128 as byte)");
    }

    #[test]
    fn literal_display_appends_interval() {
        let lit = Literal::with_interval("ts", "INTERVAL 12 MONTH");
        assert_eq!(lit.to_string(), "ts + INTERVAL 12 MONTH");
    }
}
