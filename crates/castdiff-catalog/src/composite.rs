//! Composite generators.
//!
//! Each nested slot takes the first (or first two) valid cases of the
//! matching scalar generator instead of enumerating combinations, so every
//! collection holds a single element per level.

use castdiff_types::{ExpectedOutcome, ExpectedValues, Interface, TypeSpec, TypeTag, ValueCase};

use crate::GeneratorFn;
use crate::literal::{case, expr};
use crate::scalar::{valid_boolean, valid_double, valid_int, valid_string};
use crate::temporal::valid_timestamp;

/// Rendered literal per interface plus the expected primary rendering.
struct Sample {
    sql: String,
    df: String,
    hql: String,
    expected: String,
}

impl Sample {
    fn literal(&self, interface: Interface) -> &str {
        match interface {
            Interface::Sql => &self.sql,
            Interface::Df => &self.df,
            Interface::Hql => &self.hql,
        }
    }
}

fn sample(generator: GeneratorFn, tag: TypeTag, idx: usize) -> Option<Sample> {
    let case = generator(&TypeSpec::representative(tag)).into_iter().nth(idx)?;
    let expected = case.expected.primary().value()?.to_owned();
    Some(Sample {
        sql: case.sql.expr,
        df: case.df.expr,
        hql: case.hql.expr,
        expected,
    })
}

fn map_literal(key: &str, value: &str, interface: Interface) -> String {
    match interface {
        Interface::Df => format!("Map({key} -> {value})"),
        Interface::Sql | Interface::Hql => format!("map({key}, {value})"),
    }
}

fn array_literal(items: &[&str], interface: Interface) -> String {
    let joined = items.join(",");
    match interface {
        Interface::Df => format!("Array({joined})"),
        Interface::Sql | Interface::Hql => format!("array({joined})"),
    }
}

/// `{"<key>":<value>}`: engines print map keys of string type quoted.
fn string_keyed(key: &str, value: &str) -> String {
    format!("{{\"{key}\":{value}}}")
}

fn string_double_map() -> Option<Sample> {
    let key = sample(valid_string, TypeTag::String, 0)?;
    let value = sample(valid_double, TypeTag::Double, 0)?;
    let render = |ifc| map_literal(key.literal(ifc), value.literal(ifc), ifc);
    Some(Sample {
        sql: render(Interface::Sql),
        df: render(Interface::Df),
        hql: render(Interface::Hql),
        expected: string_keyed(&key.expected, &value.expected),
    })
}

fn into_case(sample: Sample) -> ValueCase {
    let expected = expr(sample.expected.clone());
    case(|ifc| sample.literal(ifc).to_owned(), expected)
}

pub fn valid_string_double_map(_: &TypeSpec) -> Vec<ValueCase> {
    string_double_map().map(into_case).into_iter().collect()
}

pub fn valid_nested_map(_: &TypeSpec) -> Vec<ValueCase> {
    let nested = || -> Option<Sample> {
        let key = sample(valid_int, TypeTag::Int, 0)?;
        let inner = string_double_map()?;
        let render = |ifc| map_literal(key.literal(ifc), inner.literal(ifc), ifc);
        Some(Sample {
            sql: render(Interface::Sql),
            df: render(Interface::Df),
            hql: render(Interface::Hql),
            expected: format!("{{{}:{}}}", key.expected, inner.expected),
        })
    };
    nested().map(into_case).into_iter().collect()
}

/// `[[d0],[d0,d1]]`
pub fn valid_nested_array(_: &TypeSpec) -> Vec<ValueCase> {
    let nested = || -> Option<Sample> {
        let first = sample(valid_double, TypeTag::Double, 0)?;
        let second = sample(valid_double, TypeTag::Double, 1)?;
        let render = |ifc| {
            let short = array_literal(&[first.literal(ifc)], ifc);
            let long = array_literal(&[first.literal(ifc), second.literal(ifc)], ifc);
            array_literal(&[short.as_str(), long.as_str()], ifc)
        };
        Some(Sample {
            sql: render(Interface::Sql),
            df: render(Interface::Df),
            hql: render(Interface::Hql),
            expected: format!(
                "[[{a}],[{a},{b}]]",
                a = first.expected,
                b = second.expected
            ),
        })
    };
    nested().map(into_case).into_iter().collect()
}

fn named_struct(fields: &[(&str, &str)], interface: Interface) -> String {
    match interface {
        Interface::Df => {
            let values: Vec<&str> = fields.iter().map(|(_, value)| *value).collect();
            format!("Row({})", values.join(", "))
        }
        Interface::Sql | Interface::Hql => {
            let pairs: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("'{name}', {value}"))
                .collect();
            format!("named_struct({})", pairs.join(", "))
        }
    }
}

/// `STRUCT<f1: STRUCT<f11: STRING, f12: DOUBLE>, f2: BOOLEAN>`. Struct
/// renderings are compared like maps with string keys.
pub fn valid_struct(_: &TypeSpec) -> Vec<ValueCase> {
    let nested = || -> Option<Sample> {
        let f11 = sample(valid_string, TypeTag::String, 0)?;
        let f12 = sample(valid_double, TypeTag::Double, 0)?;
        let f2 = sample(valid_boolean, TypeTag::Boolean, 0)?;
        let render = |ifc| {
            let inner = named_struct(&[("f11", f11.literal(ifc)), ("f12", f12.literal(ifc))], ifc);
            named_struct(&[("f1", inner.as_str()), ("f2", f2.literal(ifc))], ifc)
        };
        Some(Sample {
            sql: render(Interface::Sql),
            df: render(Interface::Df),
            hql: render(Interface::Hql),
            expected: format!(
                "{{\"f1\":{{\"f11\":{},\"f12\":{}}},\"f2\":{}}}",
                f11.expected, f12.expected, f2.expected
            ),
        })
    };
    nested().map(into_case).into_iter().collect()
}

/// Hive `UNIONTYPE` with tag 1 selected. Spark has no union type, so only
/// the Hive console is expected to evaluate it.
pub fn valid_union(_: &TypeSpec) -> Vec<ValueCase> {
    let nested = || -> Option<ValueCase> {
        let int = sample(valid_int, TypeTag::Int, 0)?;
        let map = string_double_map()?;
        let array = valid_nested_array(&TypeSpec::representative(TypeTag::NestedArray))
            .into_iter()
            .next()?;
        let ts = sample(valid_timestamp, TypeTag::Timestamp, 0)?;
        let create_union = |ifc: Interface| {
            format!(
                "create_union(1, {}, {}, {}, {})",
                int.literal(ifc),
                map.literal(ifc),
                array.literal(ifc).expr,
                ts.literal(ifc)
            )
        };
        let expected = ExpectedValues::new(ExpectedOutcome::exception())
            .with_hql(ExpectedOutcome::expr(format!("{{1:{}}}", map.expected)));
        Some(case(
            |ifc| match ifc {
                Interface::Df => String::new(),
                Interface::Sql | Interface::Hql => create_union(ifc),
            },
            expected,
        ))
    };
    nested().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(tag: TypeTag) -> TypeSpec {
        TypeSpec::representative(tag)
    }

    #[test]
    fn string_double_map_literals() {
        let cases = valid_string_double_map(&spec(TypeTag::StringDoubleMap));
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].sql.expr, "map(\"12831273.24\", 1e-305 * pi())");
        assert_eq!(cases[0].df.expr, "Map(\"12831273.24\" -> 1e-305 * math.Pi)");
        assert_eq!(
            cases[0].expected.primary().value(),
            Some("{\"12831273.24\":3.141592653589793E-305}")
        );
    }

    #[test]
    fn nested_map_expected() {
        let cases = valid_nested_map(&spec(TypeTag::NestedMap));
        assert_eq!(
            cases[0].hql.expr,
            "map(-2147483648, map(\"12831273.24\", 1e-305 * pi()))"
        );
        assert_eq!(
            cases[0].expected.primary().value(),
            Some("{-2147483648:{\"12831273.24\":3.141592653589793E-305}}")
        );
    }

    #[test]
    fn nested_array_expected() {
        let cases = valid_nested_array(&spec(TypeTag::NestedArray));
        assert_eq!(
            cases[0].sql.expr,
            "array(array(1e-305 * pi()),array(1e-305 * pi(),1e-320 * pi()))"
        );
        assert_eq!(
            cases[0].df.expr,
            "Array(Array(1e-305 * math.Pi),Array(1e-305 * math.Pi,1e-320 * math.Pi))"
        );
        assert_eq!(
            cases[0].expected.primary().value(),
            Some("[[3.141592653589793E-305],[3.141592653589793E-305,3.142E-320]]")
        );
    }

    #[test]
    fn struct_literals() {
        let cases = valid_struct(&spec(TypeTag::Struct));
        assert_eq!(
            cases[0].sql.expr,
            "named_struct('f1', named_struct('f11', \"12831273.24\", 'f12', 1e-305 * pi()), 'f2', true)"
        );
        assert_eq!(
            cases[0].df.expr,
            "Row(Row(\"12831273.24\", 1e-305 * math.Pi), true)"
        );
        assert_eq!(
            cases[0].expected.primary().value(),
            Some("{\"f1\":{\"f11\":12831273.24,\"f12\":3.141592653589793E-305},\"f2\":true}")
        );
    }

    #[test]
    fn union_is_hive_only() {
        let cases = valid_union(&spec(TypeTag::Union));
        let union = &cases[0];
        assert!(union.hql.expr.starts_with("create_union(1, -2147483648, map("));
        assert!(!union.expected.primary().is_expression());
        assert_eq!(
            union.expected.for_interface(Interface::Hql).value(),
            Some("{1:{\"12831273.24\":3.141592653589793E-305}}")
        );
    }
}
