//! Literal spelling per interface.
//!
//! A value case is built once with a closure that renders its literal for a
//! given [`Interface`]; the expected outcome is shared unless a generator
//! overrides it for one interface.

use castdiff_types::{ExpectedOutcome, ExpectedValues, Interface, Literal, ValueCase};

/// Constants and special values whose spelling differs per interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Pi,
    E,
    FloatInfinity,
    FloatInf,
    FloatNegInfinity,
    FloatNegInf,
    FloatNan,
    DoubleInfinity,
    DoubleInf,
    DoubleNegInfinity,
    DoubleNegInf,
    DoubleNan,
}

impl Symbol {
    #[must_use]
    pub const fn render(self, interface: Interface) -> &'static str {
        match interface {
            Interface::Sql | Interface::Hql => match self {
                Self::Pi => "pi()",
                Self::E => "e()",
                Self::FloatInfinity => "float('infinity')",
                Self::FloatInf => "float('inf')",
                Self::FloatNegInfinity => "float('-infinity')",
                Self::FloatNegInf => "float('-inf')",
                Self::FloatNan => "float('NaN')",
                Self::DoubleInfinity | Self::DoubleInf => "double('Infinity')",
                Self::DoubleNegInfinity | Self::DoubleNegInf => "double('-Infinity')",
                Self::DoubleNan => "double('NaN')",
            },
            Interface::Df => match self {
                Self::Pi => "math.Pi",
                Self::E => "math.E",
                Self::FloatInfinity | Self::FloatInf => "Float.PositiveInfinity",
                Self::FloatNegInfinity | Self::FloatNegInf => "Float.NegativeInfinity",
                Self::FloatNan => "Float.NaN",
                Self::DoubleInfinity | Self::DoubleInf => "Double.PositiveInfinity",
                Self::DoubleNegInfinity | Self::DoubleNegInf => "Double.NegativeInfinity",
                Self::DoubleNan => "Double.NaN",
            },
        }
    }
}

/// `<scale> * <symbol>` as used by the floating point boundary cases.
#[must_use]
pub fn scaled(scale: &str, symbol: Symbol, interface: Interface) -> String {
    format!("{scale} * {}", symbol.render(interface))
}

/// Build a case whose literal is rendered per interface.
pub fn case_with(render: impl Fn(Interface) -> Literal, expected: ExpectedValues) -> ValueCase {
    ValueCase {
        sql: render(Interface::Sql),
        df: render(Interface::Df),
        hql: render(Interface::Hql),
        expected,
    }
}

/// Build a case whose expression text is rendered per interface.
pub fn case(render: impl Fn(Interface) -> String, expected: ExpectedValues) -> ValueCase {
    case_with(|ifc| Literal::new(render(ifc)), expected)
}

/// Build a case with the same literal text on every interface.
pub fn raw(text: &str, expected: ExpectedValues) -> ValueCase {
    case(|_| text.to_owned(), expected)
}

pub fn expr(value: impl Into<String>) -> ExpectedValues {
    ExpectedValues::new(ExpectedOutcome::expr(value))
}

/// Valid everywhere except Hive, which raises.
pub fn expr_hive_rejects(value: impl Into<String>) -> ExpectedValues {
    expr(value).with_hql(ExpectedOutcome::exception())
}

pub fn exn() -> ExpectedValues {
    ExpectedValues::new(ExpectedOutcome::exception())
}

pub fn exn_with(message: &str) -> ExpectedValues {
    ExpectedValues::new(ExpectedOutcome::exception_with(message))
}

/// Wrap text in double quotes without escaping.
#[must_use]
pub fn quoted(text: &str) -> String {
    format!("\"{text}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_per_interface() {
        assert_eq!(Symbol::Pi.render(Interface::Sql), "pi()");
        assert_eq!(Symbol::Pi.render(Interface::Df), "math.Pi");
        assert_eq!(Symbol::DoubleInf.render(Interface::Hql), "double('Infinity')");
        assert_eq!(
            Symbol::FloatNegInf.render(Interface::Df),
            "Float.NegativeInfinity"
        );
    }

    #[test]
    fn scaled_symbol() {
        assert_eq!(scaled("1e-305", Symbol::Pi, Interface::Sql), "1e-305 * pi()");
        assert_eq!(scaled("1e307", Symbol::E, Interface::Df), "1e307 * math.E");
    }

    #[test]
    fn raw_case_shares_text() {
        let case = raw("foo", exn());
        assert_eq!(case.sql.expr, "foo");
        assert_eq!(case.df.expr, "foo");
        assert_eq!(case.hql.expr, "foo");
        assert!(!case.expected.primary().is_expression());
    }

    #[test]
    fn hive_rejecting_expectation() {
        let values = expr_hive_rejects("-128");
        assert!(values.for_interface(Interface::Df).is_expression());
        assert!(!values.for_interface(Interface::Hql).is_expression());
    }
}
