//! Shared data model for the castdiff oracle.
//!
//! Everything downstream of generation joins on [`RowId`]: the catalog
//! assigns it, statement files embed it as a correlation column, and the
//! harness parses it back out of console logs.

pub mod ground_truth;
pub mod interface;
pub mod outcome;
pub mod row;
pub mod type_spec;

pub use ground_truth::OriginalEntry;
pub use interface::{FormatType, Interface, System, TestPlan};
pub use outcome::{ExpectedOutcome, ExpectedValues, OutcomeKind};
pub use row::{Literal, RowId, TestRow, ValueCase};
pub use type_spec::{TypeSpec, TypeTag};
