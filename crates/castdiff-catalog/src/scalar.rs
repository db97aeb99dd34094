//! Generators for numeric, character, binary and boolean types.

use std::fmt::Write as _;

use castdiff_types::{ExpectedOutcome, ExpectedValues, Interface, TypeSpec, ValueCase};

use crate::literal::{Symbol, case, exn, exn_with, expr, expr_hive_rejects, quoted, raw, scaled};

// ─── Integers ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Integral {
    Byte,
    Short,
    Long,
}

impl Integral {
    fn literal(self, x: &str, interface: Interface) -> String {
        match (self, interface) {
            (Self::Byte, Interface::Df) => format!("(\"{x}\").toByte"),
            (Self::Byte, Interface::Hql) => format!("{x}Y"),
            (Self::Byte, Interface::Sql) => format!("cast({x} as byte)"),
            (Self::Short, Interface::Df) => format!("(\"{x}\").toShort"),
            (Self::Short, Interface::Hql) => format!("{x}S"),
            (Self::Short, Interface::Sql) => format!("cast({x} as short)"),
            (Self::Long, Interface::Df) => format!("BigInt(\"{x}\").toLong"),
            (Self::Long, Interface::Hql) => format!("{x}L"),
            (Self::Long, Interface::Sql) => format!("cast({x} as long)"),
        }
    }

    const fn bounds(self) -> (&'static str, &'static str) {
        match self {
            Self::Byte => ("-128", "127"),
            Self::Short => ("-32768", "32767"),
            Self::Long => ("-9223372036854775808", "9223372036854775807"),
        }
    }

    fn value_case(self, x: &str, expected: ExpectedValues) -> ValueCase {
        case(|ifc| self.literal(x, ifc), expected)
    }

    /// Min, -1, 0, 1, max. Hive has no literal for the signed minimum.
    fn valid(self) -> Vec<ValueCase> {
        let (min, max) = self.bounds();
        vec![
            self.value_case(min, expr_hive_rejects(min)),
            self.value_case("-1", expr("-1")),
            self.value_case("0", expr("0")),
            self.value_case("1", expr("1")),
            self.value_case(max, expr(max)),
        ]
    }
}

/// Fractional input. Spark names the offending text, Hive just fails.
fn fractional_rejection() -> ExpectedValues {
    exn_with("1.1").with_hql(ExpectedOutcome::exception())
}

pub fn valid_byte(_: &TypeSpec) -> Vec<ValueCase> {
    Integral::Byte.valid()
}

pub fn invalid_byte(_: &TypeSpec) -> Vec<ValueCase> {
    vec![
        Integral::Byte.value_case("0/0", exn()),
        raw("2147483647", exn()),
        raw("-2147483647", exn()),
        Integral::Byte.value_case("1.1", fractional_rejection()),
    ]
}

pub fn valid_short(_: &TypeSpec) -> Vec<ValueCase> {
    Integral::Short.valid()
}

pub fn invalid_short(_: &TypeSpec) -> Vec<ValueCase> {
    vec![
        Integral::Short.value_case("0/0", exn()),
        raw("2147483647", exn()),
        raw("-2147483647", exn()),
        Integral::Short.value_case("1.1", exn()),
    ]
}

pub fn valid_int(_: &TypeSpec) -> Vec<ValueCase> {
    ["-2147483648", "-1", "0", "1", "2147483647"]
        .into_iter()
        .map(|x| raw(x, expr(x)))
        .collect()
}

pub fn invalid_int(_: &TypeSpec) -> Vec<ValueCase> {
    vec![
        raw("0/0", exn()),
        raw("1.1", fractional_rejection()),
        raw("", exn()),
        raw("9223372036854775808", exn()),
        raw("-9223372036854775809", exn()),
        raw("foo", exn()),
    ]
}

pub fn valid_long(_: &TypeSpec) -> Vec<ValueCase> {
    Integral::Long.valid()
}

pub fn invalid_long(_: &TypeSpec) -> Vec<ValueCase> {
    vec![
        Integral::Long.value_case("0/0", exn()),
        Integral::Long.value_case("1.1", fractional_rejection()),
        raw("9223372036854775808", exn()),
        raw("-9223372036854775809", exn()),
    ]
}

// ─── Floating point ──────────────────────────────────────────────────────

fn float_cast(inner: &str, interface: Interface) -> String {
    match interface {
        Interface::Df => format!("({inner}).floatValue()"),
        Interface::Sql | Interface::Hql => format!("cast({inner} as float)"),
    }
}

fn scaled_float(scale: &str, symbol: Symbol, expected: ExpectedValues) -> ValueCase {
    case(|ifc| float_cast(&scaled(scale, symbol, ifc), ifc), expected)
}

fn symbol_case(symbol: Symbol, expected: ExpectedValues) -> ValueCase {
    case(|ifc| symbol.render(ifc).to_owned(), expected)
}

/// Underflow with and without precision loss, overflow, infinities, NaN and
/// division by zero. Hive rejects the infinity functions and non-finite
/// division results.
pub fn valid_float(_: &TypeSpec) -> Vec<ValueCase> {
    vec![
        scaled_float("1e-35", Symbol::Pi, expr("3.1415927E-35")),
        scaled_float("1e-40", Symbol::Pi, expr("3.1416E-40")),
        scaled_float("1e-50", Symbol::Pi, expr("0.0")),
        scaled_float("1e35", Symbol::E, expr("2.7182818E35")),
        scaled_float("1e39", Symbol::E, expr("Infinity")),
        symbol_case(Symbol::FloatInfinity, expr_hive_rejects("Infinity")),
        symbol_case(Symbol::FloatInf, expr_hive_rejects("Infinity")),
        symbol_case(Symbol::FloatNegInfinity, expr_hive_rejects("-Infinity")),
        symbol_case(Symbol::FloatNegInf, expr_hive_rejects("-Infinity")),
        symbol_case(Symbol::FloatNan, expr("NaN")),
        case(|ifc| float_cast("1.0/0", ifc), expr_hive_rejects("Infinity")),
        case(|ifc| float_cast("-1.0/0", ifc), expr_hive_rejects("-Infinity")),
        case(|ifc| float_cast("0.0/0", ifc), expr_hive_rejects("NaN")),
    ]
}

fn scaled_double(scale: &str, symbol: Symbol, expected: ExpectedValues) -> ValueCase {
    case(|ifc| scaled(scale, symbol, ifc), expected)
}

pub fn valid_double(_: &TypeSpec) -> Vec<ValueCase> {
    vec![
        scaled_double("1e-305", Symbol::Pi, expr("3.141592653589793E-305")),
        scaled_double("1e-320", Symbol::Pi, expr("3.142E-320")),
        scaled_double("1e-323", Symbol::Pi, expr("3.0E-323")),
        scaled_double("1e307", Symbol::E, expr("2.718281828459045E307")),
        scaled_double("1e308", Symbol::E, expr("Infinity")),
        symbol_case(Symbol::DoubleInfinity, expr("Infinity")),
        symbol_case(Symbol::DoubleInf, expr("Infinity")),
        symbol_case(Symbol::DoubleNegInfinity, expr("-Infinity")),
        symbol_case(Symbol::DoubleNegInf, expr("-Infinity")),
        symbol_case(Symbol::DoubleNan, expr("NaN")),
        raw("1.0/0", expr_hive_rejects("Infinity")),
        raw("-1.0/0", expr_hive_rejects("-Infinity")),
        raw("0.0/0", expr_hive_rejects("NaN")),
    ]
}

/// Shared by FLOAT and DOUBLE.
pub fn invalid_floating(_: &TypeSpec) -> Vec<ValueCase> {
    vec![raw("", exn()), raw("foo", exn())]
}

// ─── Decimal ─────────────────────────────────────────────────────────────

fn decimal_literal(text: &str, interface: Interface) -> String {
    match interface {
        Interface::Df => format!("BigDecimal(\"{text}\")"),
        Interface::Sql | Interface::Hql => text.to_owned(),
    }
}

fn decimal_case(text: &str, expected: ExpectedValues) -> ValueCase {
    case(|ifc| decimal_literal(text, ifc), expected)
}

fn precision_scale(spec: &TypeSpec) -> (usize, usize) {
    let precision = (spec.param(0).unwrap_or(20) as usize).max(1);
    let scale = spec.param(1).unwrap_or(0) as usize;
    (precision, scale.min(precision))
}

/// Every digit of precision and scale in use, plus the same magnitude in
/// scientific notation.
pub fn valid_decimal(spec: &TypeSpec) -> Vec<ValueCase> {
    let (precision, scale) = precision_scale(spec);
    if precision == 1 && scale == 0 {
        return vec![
            decimal_case("0.", expr("0.")),
            decimal_case("8.e0", expr("8.")),
        ];
    }
    let integer_digits = precision - scale;
    let full = format!(
        "{}.{}",
        "3".repeat(integer_digits.saturating_sub(1)),
        "2".repeat(scale)
    );
    let scientific = format!(
        "8.{}e{}",
        "8".repeat(precision - 1),
        integer_digits.saturating_sub(1)
    );
    let scientific_expected = format!("{}.{}", "8".repeat(integer_digits), "8".repeat(scale));
    vec![
        decimal_case(&full, expr(full.clone())),
        decimal_case(&scientific, expr(scientific_expected)),
    ]
}

pub fn invalid_decimal(spec: &TypeSpec) -> Vec<ValueCase> {
    let (precision, scale) = precision_scale(spec);
    let too_wide = format!("{}.{}", "3".repeat(precision - scale + 1), "2".repeat(scale));
    vec![
        decimal_case(&too_wide, exn()),
        decimal_case("1.0/0", exn()),
    ]
}

// ─── Character types ─────────────────────────────────────────────────────

/// (literal body, expected rendering). The body is written between double
/// quotes verbatim.
const STRING_SAMPLES: [(&str, &str); 11] = [
    ("12831273.24", "12831273.24"),
    ("1969-12-31 23:59:59 UTC", "1969-12-31 23:59:59 UTC"),
    ("yyyy-MM-dd HH:mm:ss z", "yyyy-MM-dd HH:mm:ss z"),
    ("-1", "-1"),
    ("0", "0"),
    ("1", "1"),
    ("", ""),
    (r"^fo\\o$", r"^fo\o$"),
    ("www.apache.org", "www.apache.org"),
    ("www|apache|org", "www|apache|org"),
    ("世界", "世界"),
];

/// Castable strings, escapes and non-ASCII text.
pub fn valid_string(_: &TypeSpec) -> Vec<ValueCase> {
    STRING_SAMPLES
        .iter()
        .map(|(body, expected)| raw(&quoted(body), expr(*expected)))
        .collect()
}

/// Unterminated quote.
pub fn invalid_string(_: &TypeSpec) -> Vec<ValueCase> {
    vec![raw("\"", exn())]
}

fn length(spec: &TypeSpec) -> usize {
    spec.param(0).unwrap_or(1) as usize
}

/// String sample bodies cut to `n` characters, plus one body of exactly `n`.
fn bounded_bodies(n: usize) -> Vec<String> {
    let mut bodies: Vec<String> = STRING_SAMPLES
        .iter()
        .map(|(body, _)| body.chars().take(n).collect())
        .collect();
    bodies.push("a".repeat(n));
    bodies
}

pub fn valid_varchar(spec: &TypeSpec) -> Vec<ValueCase> {
    bounded_bodies(length(spec))
        .iter()
        .map(|body| raw(&quoted(body), expr(body.clone())))
        .collect()
}

/// CHAR(n) reads back blank-padded to `n` characters.
pub fn valid_char(spec: &TypeSpec) -> Vec<ValueCase> {
    let n = length(spec);
    bounded_bodies(n)
        .iter()
        .map(|body| {
            let pad = n.saturating_sub(body.chars().count());
            raw(&quoted(body), expr(format!("{body}{}", " ".repeat(pad))))
        })
        .collect()
}

fn over_length(keyword: &str, n: usize) -> ValueCase {
    let text = quoted(&"b".repeat(n + 1));
    case(
        |ifc| match ifc {
            Interface::Df => text.clone(),
            Interface::Sql | Interface::Hql => format!("cast({text} as {keyword}({n}))"),
        },
        exn(),
    )
}

pub fn invalid_varchar(spec: &TypeSpec) -> Vec<ValueCase> {
    vec![raw("\"", exn()), over_length("varchar", length(spec))]
}

pub fn invalid_char(spec: &TypeSpec) -> Vec<ValueCase> {
    vec![raw("\"", exn()), over_length("char", length(spec))]
}

// ─── Binary and boolean ──────────────────────────────────────────────────

/// Minimal big-endian two's complement encoding, lowercase hex. Zero
/// encodes as one byte.
#[must_use]
pub fn twos_complement_hex(n: i64) -> String {
    let bytes = n.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = match bytes[start] {
            0x00 => bytes[start + 1] & 0x80 == 0,
            0xff => bytes[start + 1] & 0x80 != 0,
            _ => false,
        };
        if !redundant {
            break;
        }
        start += 1;
    }
    let mut hex = String::with_capacity((bytes.len() - start) * 2);
    for byte in &bytes[start..] {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn binary_literal(x: i64, interface: Interface) -> String {
    match interface {
        Interface::Sql => format!("X'{}'", twos_complement_hex(x)),
        Interface::Hql => quoted(&twos_complement_hex(x)),
        Interface::Df => format!("BigInt(\"{x}\").toByteArray"),
    }
}

/// Binary renderings are not compared textually, so the expected value is
/// null.
pub fn valid_binary(_: &TypeSpec) -> Vec<ValueCase> {
    [-2_147_483_648_i64, -1, 0, 1, 2_147_483_647]
        .into_iter()
        .map(|x| {
            case(
                |ifc| binary_literal(x, ifc),
                ExpectedValues::new(ExpectedOutcome::null()),
            )
        })
        .collect()
}

pub fn invalid_binary(_: &TypeSpec) -> Vec<ValueCase> {
    ["'spark'", "X'spark'", "25", "1.1", "00FF", "", "b''"]
        .into_iter()
        .map(|text| raw(text, exn()))
        .collect()
}

pub fn valid_boolean(_: &TypeSpec) -> Vec<ValueCase> {
    vec![raw("true", expr("true")), raw("false", expr("false"))]
}

pub fn invalid_boolean(_: &TypeSpec) -> Vec<ValueCase> {
    ["tf", "", "1", "foo", "1.1"]
        .into_iter()
        .map(|text| raw(text, exn()))
        .collect()
}
