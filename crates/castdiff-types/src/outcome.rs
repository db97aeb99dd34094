//! Expected outcomes and their per-interface overrides.

use crate::interface::Interface;

/// Whether a literal is expected to evaluate or to raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Expression,
    Exception,
}

/// What an engine should do with one literal.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpectedOutcome {
    /// Evaluates to `value`; `None` means SQL NULL or a rendering that is
    /// not compared textually.
    Expression { value: Option<String> },
    /// Raises; `message` is a substring expected in the engine error.
    Exception { message: Option<String> },
}

impl ExpectedOutcome {
    pub fn expr(value: impl Into<String>) -> Self {
        Self::Expression {
            value: Some(value.into()),
        }
    }

    #[must_use]
    pub const fn null() -> Self {
        Self::Expression { value: None }
    }

    #[must_use]
    pub const fn exception() -> Self {
        Self::Exception { message: None }
    }

    /// Exception carrying an expected message fragment. An empty fragment
    /// is the same as no fragment.
    pub fn exception_with(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Exception {
            message: (!message.is_empty()).then_some(message),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Expression { .. } => OutcomeKind::Expression,
            Self::Exception { .. } => OutcomeKind::Exception,
        }
    }

    #[must_use]
    pub const fn is_expression(&self) -> bool {
        matches!(self, Self::Expression { .. })
    }

    /// Expected rendering of an expression outcome.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Expression { value } => value.as_deref(),
            Self::Exception { .. } => None,
        }
    }

    /// Expected error fragment of an exception outcome.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Exception { message } => message.as_deref(),
            Self::Expression { .. } => None,
        }
    }
}

/// Outcomes per interface. `df` and `hql` fall back to the `sql` outcome
/// unless overridden.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExpectedValues {
    sql: ExpectedOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    df: Option<ExpectedOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hql: Option<ExpectedOutcome>,
}

impl ExpectedValues {
    #[must_use]
    pub const fn new(primary: ExpectedOutcome) -> Self {
        Self {
            sql: primary,
            df: None,
            hql: None,
        }
    }

    #[must_use]
    pub fn with_df(mut self, outcome: ExpectedOutcome) -> Self {
        self.df = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_hql(mut self, outcome: ExpectedOutcome) -> Self {
        self.hql = Some(outcome);
        self
    }

    /// The `sql` outcome every other interface defaults to.
    #[must_use]
    pub const fn primary(&self) -> &ExpectedOutcome {
        &self.sql
    }

    #[must_use]
    pub fn for_interface(&self, interface: Interface) -> &ExpectedOutcome {
        match interface {
            Interface::Sql => &self.sql,
            Interface::Df => self.df.as_ref().unwrap_or(&self.sql),
            Interface::Hql => self.hql.as_ref().unwrap_or(&self.sql),
        }
    }

    /// Whether every interface in `interfaces` expects the same outcome kind.
    #[must_use]
    pub fn kinds_agree(&self, interfaces: &[Interface]) -> bool {
        let mut kinds = interfaces
            .iter()
            .map(|&ifc| self.for_interface(ifc).kind());
        match kinds.next() {
            Some(first) => kinds.all(|kind| kind == first),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_default_to_primary() {
        let values = ExpectedValues::new(ExpectedOutcome::expr("-128"))
            .with_hql(ExpectedOutcome::exception());
        assert_eq!(values.for_interface(Interface::Sql).value(), Some("-128"));
        assert_eq!(values.for_interface(Interface::Df).value(), Some("-128"));
        assert_eq!(
            values.for_interface(Interface::Hql).kind(),
            OutcomeKind::Exception
        );
    }

    #[test]
    fn kinds_agree_detects_divergence() {
        let values = ExpectedValues::new(ExpectedOutcome::expr("-128"))
            .with_hql(ExpectedOutcome::exception());
        assert!(values.kinds_agree(&[Interface::Sql, Interface::Df]));
        assert!(!values.kinds_agree(&[Interface::Sql, Interface::Df, Interface::Hql]));
        assert!(values.kinds_agree(&[]));
    }

    #[test]
    fn empty_exception_message_is_none() {
        assert_eq!(ExpectedOutcome::exception_with("").message(), None);
        assert_eq!(
            ExpectedOutcome::exception_with("invalid unit").message(),
            Some("invalid unit")
        );
    }

    #[test]
    fn null_expression_is_valid_without_value() {
        let null = ExpectedOutcome::null();
        assert!(null.is_expression());
        assert_eq!(null.value(), None);
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let json = serde_json::to_string(&ExpectedOutcome::expr("1")).unwrap();
        assert_eq!(json, r#"{"kind":"EXPRESSION","value":"1"}"#);
        let json = serde_json::to_string(&ExpectedOutcome::exception()).unwrap();
        assert_eq!(json, r#"{"kind":"EXCEPTION","message":null}"#);
    }
}
