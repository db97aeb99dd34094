//! Type and value catalog for castdiff.
//!
//! ```text
//!   TypeTag ──generators()──▶ (valid fn, invalid fn)
//!      │                            │
//!      ▼                            ▼
//!   CatalogScope ──────────▶ TestMatrix ──▶ t_original.json / t_expected
//!                               │
//!                               └──▶ bindings(plan) ──▶ statement writers
//! ```
//!
//! Generation is pure: the same scope always yields the same rows in the
//! same order, which is what lets row ids act as the join key between
//! generation and log analysis.

pub mod composite;
pub mod literal;
pub mod matrix;
pub mod scalar;
pub mod temporal;

use std::collections::BTreeMap;

use castdiff_types::{System, TypeSpec, TypeTag, ValueCase};

pub use matrix::{Binding, GroundTruthFiles, TestMatrix};

/// A generator of value cases for one type instantiation.
pub type GeneratorFn = fn(&TypeSpec) -> Vec<ValueCase>;

/// Valid and invalid generators for one type tag.
#[derive(Debug, Clone, Copy)]
pub struct Generators {
    pub valid: GeneratorFn,
    pub invalid: GeneratorFn,
}

fn no_cases(_: &TypeSpec) -> Vec<ValueCase> {
    Vec::new()
}

/// Static dispatch from type tag to its generators.
#[must_use]
pub const fn generators(tag: TypeTag) -> Generators {
    let (valid, invalid): (GeneratorFn, GeneratorFn) = match tag {
        TypeTag::Byte => (scalar::valid_byte, scalar::invalid_byte),
        TypeTag::Short => (scalar::valid_short, scalar::invalid_short),
        TypeTag::Int => (scalar::valid_int, scalar::invalid_int),
        TypeTag::Long => (scalar::valid_long, scalar::invalid_long),
        TypeTag::Float => (scalar::valid_float, scalar::invalid_floating),
        TypeTag::Double => (scalar::valid_double, scalar::invalid_floating),
        TypeTag::Decimal => (scalar::valid_decimal, scalar::invalid_decimal),
        TypeTag::String => (scalar::valid_string, scalar::invalid_string),
        TypeTag::Varchar => (scalar::valid_varchar, scalar::invalid_varchar),
        TypeTag::Char => (scalar::valid_char, scalar::invalid_char),
        TypeTag::Binary => (scalar::valid_binary, scalar::invalid_binary),
        TypeTag::Boolean => (scalar::valid_boolean, scalar::invalid_boolean),
        TypeTag::Timestamp => (temporal::valid_timestamp, temporal::invalid_timestamp),
        TypeTag::Date => (temporal::valid_date, temporal::invalid_date),
        TypeTag::StringDoubleMap => (composite::valid_string_double_map, no_cases),
        TypeTag::NestedMap => (composite::valid_nested_map, no_cases),
        TypeTag::NestedArray => (composite::valid_nested_array, no_cases),
        TypeTag::Struct => (composite::valid_struct, no_cases),
        TypeTag::Union => (composite::valid_union, no_cases),
    };
    Generators { valid, invalid }
}

/// Which types a generation run covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogScope {
    /// The seventeen scalar and collection types.
    #[default]
    Standard,
    /// Standard plus struct and union.
    Extended,
}

impl CatalogScope {
    /// Representative type specs in catalog order.
    #[must_use]
    pub fn types(self) -> Vec<TypeSpec> {
        let mut tags = TypeTag::STANDARD.to_vec();
        if self == Self::Extended {
            tags.extend(TypeTag::EXTENDED_ONLY);
        }
        tags.into_iter().map(TypeSpec::representative).collect()
    }
}

/// Valid and invalid case counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CaseCounts {
    pub valid: usize,
    pub invalid: usize,
}

impl CaseCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.valid + self.invalid
    }
}

/// Case counts per type (named in one system's dialect) and overall.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CatalogStats {
    pub per_type: Vec<(String, CaseCounts)>,
    pub total: CaseCounts,
}

impl CatalogStats {
    /// Count what each generator list produces. Per-interface overrides do
    /// not move a case between the valid and invalid lists.
    #[must_use]
    pub fn compute(scope: CatalogScope, system: System) -> Self {
        let mut stats = Self::default();
        for spec in scope.types() {
            let generators = generators(spec.tag);
            let counts = CaseCounts {
                valid: (generators.valid)(&spec).len(),
                invalid: (generators.invalid)(&spec).len(),
            };
            stats.total.valid += counts.valid;
            stats.total.invalid += counts.invalid;
            stats.per_type.push((spec.render(system), counts));
        }
        stats
    }

    /// Counts keyed by type name, for lookups in tests and reports.
    #[must_use]
    pub fn by_name(&self) -> BTreeMap<&str, CaseCounts> {
        self.per_type
            .iter()
            .map(|(name, counts)| (name.as_str(), *counts))
            .collect()
    }

    /// One line per type plus a total, as printed by `castdiff generate --stats`.
    #[must_use]
    pub fn render(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        for (name, counts) in &self.per_type {
            let _ = writeln!(
                out,
                "{name} valid: {} invalid: {}",
                counts.valid, counts.invalid
            );
        }
        let _ = writeln!(out, "total {}", self.total.total());
        out
    }
}
