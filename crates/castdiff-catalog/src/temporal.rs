//! TIMESTAMP and DATE generators.
//!
//! Expected renderings assume the engines run with an `America/Chicago`
//! session time zone. Every valid base is also combined with each
//! interval in [`GOOD_INTERVALS`]; every valid base combined with an entry
//! of [`BAD_INTERVALS`] is an invalid case carrying the expected error
//! fragment.

use castdiff_types::{ExpectedValues, Interface, Literal, TypeSpec, ValueCase};

use crate::literal::{case_with, exn, exn_with, expr, expr_hive_rejects};

/// Interval expressions every engine should accept.
pub const GOOD_INTERVALS: [&str; 8] = [
    "INTERVAL '12' MONTH",
    "INTERVAL 12 MONTH",
    "INTERVAL '52 hours 3 minutes 2 seconds'",
    "INTERVAL '1-2' year to month",
    "INTERVAL 1 second 2 seconds",
    "INTERVAL '123 11' day to hour",
    "+INTERVAL '1 day'",
    "-INTERVAL '1 day'",
];

/// Malformed interval expressions and the error fragment each should raise.
pub const BAD_INTERVALS: [(&str, &str); 9] = [
    (
        "INTERVAL '10 years -11 month -12 days'",
        "Cannot mix year-month and day-time fields",
    ),
    ("INTERVAL '2147483647 days 24 hours'", "ArithmeticException"),
    (
        "extract(epoch from interval '1000000000 days')",
        "ArithmeticException",
    ),
    (
        "extract(epoch from interval '1000000000 microseconds')",
        "Literals of type 'epoch' are currently not supported",
    ),
    (
        "INTERVAL '1 2:03:04' day to hour",
        "Interval string does not match day-time format",
    ),
    ("INTERVAL '1-2'", "Cannot parse the INTERVAL value"),
    (
        "INTERVAL '1 day 01:23:45.6789'",
        "Cannot parse the INTERVAL value",
    ),
    ("INTERVAL '123 11' day", "invalid unit"),
    (
        "INTERVAL '123 days hours' day",
        "Can only use numbers in the interval value part for multiple unit value pairs interval form",
    ),
];

/// A valid base literal, its rendering, and its rendering after each of
/// [`GOOD_INTERVALS`] is applied. The flags mark results Hive rejects.
struct GridRow {
    base: &'static str,
    expected: &'static str,
    hive_rejects: bool,
    shifted: [(&'static str, bool); 8],
}

const TIMESTAMP_GRID: [GridRow; 7] = [
    GridRow {
        base: "2022",
        expected: "2022-01-01 00:00:00",
        hive_rejects: true,
        shifted: [
            ("2023-01-01 00:00:00", true),
            ("2023-01-01 00:00:00", true),
            ("2022-01-03 04:03:02", true),
            ("2023-03-01 00:00:00", true),
            ("2022-01-01 00:00:03", true),
            ("2022-05-04 11:00:00", true),
            ("2022-01-02 00:00:00", true),
            ("2021-12-31 00:00:00", true),
        ],
    },
    GridRow {
        base: "2022-01",
        expected: "2022-01-01 00:00:00",
        hive_rejects: true,
        shifted: [
            ("2023-01-01 00:00:00", true),
            ("2023-01-01 00:00:00", true),
            ("2022-01-03 04:03:02", true),
            ("2023-03-01 00:00:00", true),
            ("2022-01-01 00:00:03", true),
            ("2022-05-04 11:00:00", true),
            ("2022-01-02 00:00:00", true),
            ("2021-12-31 00:00:00", true),
        ],
    },
    GridRow {
        base: "2022-01-05",
        expected: "2022-01-05 00:00:00",
        hive_rejects: false,
        shifted: [
            ("2023-01-05 00:00:00", false),
            ("2023-01-05 00:00:00", false),
            ("2022-01-07 04:03:02", true),
            ("2023-03-05 00:00:00", false),
            ("2022-01-05 00:00:03", true),
            ("2022-05-08 11:00:00", true),
            ("2022-01-06 00:00:00", true),
            ("2022-01-04 00:00:00", true),
        ],
    },
    GridRow {
        base: "1969-12-31 23:59:59 UTC",
        expected: "1969-12-31 17:59:59",
        hive_rejects: false,
        shifted: [
            ("1970-12-31 17:59:59", false),
            ("1970-12-31 17:59:59", false),
            ("1970-01-02 22:03:01", true),
            ("1971-02-28 17:59:59", true),
            ("1969-12-31 18:00:02", true),
            ("1970-05-04 04:59:59", true),
            ("1970-01-01 17:59:59", true),
            ("1969-12-30 17:59:59", true),
        ],
    },
    GridRow {
        base: "2021-05-27T03:20:50.28 Z",
        expected: "2021-05-26 22:20:50.28",
        hive_rejects: true,
        shifted: [
            ("2022-05-26 22:20:50.28", true),
            ("2022-05-26 22:20:50.28", true),
            ("2021-05-29 02:23:52.28", true),
            ("2022-07-26 22:20:50.28", false),
            ("2021-05-26 22:20:53.28", true),
            ("2021-09-27 09:20:50.28", true),
            ("2021-05-27 22:20:50.28", true),
            ("2021-05-25 22:20:50.28", true),
        ],
    },
    GridRow {
        base: "2021-08-18 00:20:50.28 -08",
        expected: "2021-08-18 03:20:50.28",
        hive_rejects: false,
        shifted: [
            ("2022-08-18 03:20:50.28", false),
            ("2022-08-18 03:20:50.28", false),
            ("2021-08-20 07:23:52.28", true),
            ("2022-10-18 03:20:50.28", false),
            ("2021-08-18 03:20:53.28", true),
            ("2021-12-19 14:20:50.28", true),
            ("2021-08-19 03:20:50.28", true),
            ("2021-08-17 03:20:50.28", true),
        ],
    },
    GridRow {
        base: "2016-02-29 03:20:50.28 +08",
        expected: "2016-02-28 13:20:50.28",
        hive_rejects: false,
        shifted: [
            ("2017-02-28 13:20:50.28", false),
            ("2017-02-28 13:20:50.28", false),
            ("2016-03-01 17:23:52.28", true),
            ("2017-04-28 13:20:50.28", false),
            ("2016-02-28 13:20:53.28", true),
            ("2016-07-01 00:20:50.28", true),
            ("2016-02-29 13:20:50.28", true),
            ("2016-02-27 13:20:50.28", true),
        ],
    },
];

const INVALID_TIMESTAMP_BASES: [&str; 5] = [
    "1969-12-31 23:59:59 B",
    "2021-08-18r03:20:50.28 Z",
    "k2021-08-18 00:20:50.28 +08",
    "2016-02-29 03:20:500.28 +08",
    "2016-02-30 03:20:50.28 AM +08",
];

const DATE_GRID: [GridRow; 6] = [
    GridRow {
        base: "2022",
        expected: "2022-01-01",
        hive_rejects: true,
        shifted: [
            ("2023-01-01", true),
            ("2023-01-01", true),
            ("2022-01-03 04:03:02", true),
            ("2023-03-01", true),
            ("2022-01-01 00:00:03", true),
            ("2022-05-04 11:00:00", true),
            ("2022-01-02", true),
            ("2021-12-31", true),
        ],
    },
    GridRow {
        base: "2022-01",
        expected: "2022-01-01",
        hive_rejects: true,
        shifted: [
            ("2023-01-01", true),
            ("2023-01-01", true),
            ("2022-01-03 04:03:02", true),
            ("2023-03-01", true),
            ("2022-01-01 00:00:03", true),
            ("2022-05-04 11:00:00", true),
            ("2022-01-02", true),
            ("2021-12-31", true),
        ],
    },
    GridRow {
        base: "2022-01-05",
        expected: "2022-01-05",
        hive_rejects: false,
        shifted: [
            ("2023-01-05", false),
            ("2023-01-05", false),
            ("2022-01-07 04:03:02", true),
            ("2023-03-05", false),
            ("2022-01-05 00:00:03", true),
            ("2022-05-08 11:00:00", true),
            ("2022-01-06", true),
            ("2022-01-04", true),
        ],
    },
    GridRow {
        base: "2022-01-05T",
        expected: "2022-01-05",
        hive_rejects: true,
        shifted: [
            ("2023-01-05", true),
            ("2023-01-05", true),
            ("2022-01-07 04:03:02", true),
            ("2023-03-05", true),
            ("2022-01-05 00:00:03", true),
            ("2022-05-08 11:00:00", true),
            ("2022-01-06", true),
            ("2022-01-04", true),
        ],
    },
    GridRow {
        base: "2016-02-29",
        expected: "2016-02-29",
        hive_rejects: false,
        shifted: [
            ("2017-02-28", false),
            ("2017-02-28", false),
            ("2016-03-02 04:03:02", true),
            ("2017-04-29", false),
            ("2016-02-29 00:00:03", true),
            ("2016-07-01 11:00:00", true),
            ("2016-03-01", true),
            ("2016-02-28", true),
        ],
    },
    GridRow {
        base: "1969-12-31 23:59:59 UTC",
        expected: "1969-12-31",
        hive_rejects: false,
        shifted: [
            ("1970-12-31", false),
            ("1970-12-31", true),
            ("1970-01-02 04:03:02", false),
            ("1971-02-28", false),
            ("1969-12-31 00:00:03", true),
            ("1970-05-03 11:00:00", true),
            ("1970-01-01", true),
            ("1969-12-30", true),
        ],
    },
];

const INVALID_DATE_BASES: [&str; 1] = ["2016-02-30"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Temporal {
    Timestamp,
    Date,
}

impl Temporal {
    const fn grid(self) -> &'static [GridRow] {
        match self {
            Self::Timestamp => &TIMESTAMP_GRID,
            Self::Date => &DATE_GRID,
        }
    }

    const fn invalid_bases(self) -> &'static [&'static str] {
        match self {
            Self::Timestamp => &INVALID_TIMESTAMP_BASES,
            Self::Date => &INVALID_DATE_BASES,
        }
    }

    /// The dataframe surface parses the base through a one-row frame. Frames
    /// that get an interval added later use a distinct column name.
    fn dataframe_expr(self, base: &str, with_interval: bool) -> String {
        match (self, with_interval) {
            (Self::Timestamp, false) => format!(
                "Seq(\"{base}\").toDF(\"time\").select(to_timestamp(col(\"time\")).as(\"to_timestamp\"))\
                 .first().getAs[java.sql.Timestamp](0)"
            ),
            (Self::Timestamp, true) => format!(
                "Seq(\"{base}\").toDF(\"timestamp\").select(to_timestamp(col(\"timestamp\")).as(\"to_timestamp\"))\
                 .first().getAs[java.sql.Timestamp](0)"
            ),
            (Self::Date, false) => format!(
                "Seq(\"{base}\").toDF(\"date\").select(to_date(col(\"date\")).as(\"to_date\"))\
                 .first().getAs[java.sql.Date](0)"
            ),
            (Self::Date, true) => format!(
                "Seq(\"{base}\").toDF(\"Date\").select(to_date(col(\"Date\")).as(\"to_date\"))\
                 .first().getAs[java.sql.Date](0)"
            ),
        }
    }

    fn literal(self, base: &str, interval: Option<&str>, interface: Interface) -> Literal {
        let keyword = match self {
            Self::Timestamp => "timestamp",
            Self::Date => "date",
        };
        match (interface, interval) {
            (Interface::Df, None) => Literal::new(self.dataframe_expr(base, false)),
            (Interface::Df, Some(interval)) => {
                Literal::with_interval(self.dataframe_expr(base, true), interval)
            }
            (Interface::Sql | Interface::Hql, None) => {
                Literal::new(format!("cast(\"{base}\" as {keyword})"))
            }
            (Interface::Sql | Interface::Hql, Some(interval)) => {
                Literal::new(format!("cast(\"{base}\" as {keyword}) + {interval}"))
            }
        }
    }

    fn case(self, base: &str, interval: Option<&str>, expected: ExpectedValues) -> ValueCase {
        case_with(|ifc| self.literal(base, interval, ifc), expected)
    }

    /// Bases alone, then every base shifted by every good interval.
    fn valid(self) -> Vec<ValueCase> {
        let grid = self.grid();
        let mut cases: Vec<ValueCase> = grid
            .iter()
            .map(|row| self.case(row.base, None, rendered(row.expected, row.hive_rejects)))
            .collect();
        for row in grid {
            for (interval, (expected, hive_rejects)) in GOOD_INTERVALS.into_iter().zip(row.shifted) {
                cases.push(self.case(row.base, Some(interval), rendered(expected, hive_rejects)));
            }
        }
        cases
    }

    /// Malformed bases alone, malformed bases shifted by good intervals, then
    /// valid bases shifted by malformed intervals.
    fn invalid(self) -> Vec<ValueCase> {
        let bad_bases = self.invalid_bases();
        let mut cases: Vec<ValueCase> = bad_bases
            .iter()
            .map(|base| self.case(base, None, exn()))
            .collect();
        for base in bad_bases {
            for interval in GOOD_INTERVALS {
                cases.push(self.case(base, Some(interval), exn()));
            }
        }
        for row in self.grid() {
            for (interval, message) in BAD_INTERVALS {
                cases.push(self.case(row.base, Some(interval), exn_with(message)));
            }
        }
        cases
    }
}

fn rendered(value: &str, hive_rejects: bool) -> ExpectedValues {
    if hive_rejects {
        expr_hive_rejects(value)
    } else {
        expr(value)
    }
}

pub fn valid_timestamp(_: &TypeSpec) -> Vec<ValueCase> {
    Temporal::Timestamp.valid()
}

pub fn invalid_timestamp(_: &TypeSpec) -> Vec<ValueCase> {
    Temporal::Timestamp.invalid()
}

pub fn valid_date(_: &TypeSpec) -> Vec<ValueCase> {
    Temporal::Date.valid()
}

pub fn invalid_date(_: &TypeSpec) -> Vec<ValueCase> {
    Temporal::Date.invalid()
}

#[cfg(test)]
mod tests {
    use castdiff_types::{OutcomeKind, TypeTag};

    use super::*;

    fn spec(tag: TypeTag) -> TypeSpec {
        TypeSpec::representative(tag)
    }

    #[test]
    fn case_counts() {
        assert_eq!(valid_timestamp(&spec(TypeTag::Timestamp)).len(), 63);
        assert_eq!(invalid_timestamp(&spec(TypeTag::Timestamp)).len(), 108);
        assert_eq!(valid_date(&spec(TypeTag::Date)).len(), 54);
        assert_eq!(invalid_date(&spec(TypeTag::Date)).len(), 63);
    }

    #[test]
    fn base_literals() {
        let cases = valid_timestamp(&spec(TypeTag::Timestamp));
        assert_eq!(cases[0].sql.expr, "cast(\"2022\" as timestamp)");
        assert_eq!(cases[0].hql.expr, "cast(\"2022\" as timestamp)");
        assert!(cases[0].df.expr.starts_with("Seq(\"2022\").toDF(\"time\")"));
        assert_eq!(cases[0].expected.primary().value(), Some("2022-01-01 00:00:00"));
        assert_eq!(
            cases[0].expected.for_interface(Interface::Hql).kind(),
            OutcomeKind::Exception
        );
        assert!(cases[2].expected.for_interface(Interface::Hql).is_expression());
    }

    #[test]
    fn dataframe_keeps_interval_apart() {
        let cases = valid_timestamp(&spec(TypeTag::Timestamp));
        let shifted = &cases[7];
        assert_eq!(
            shifted.sql.expr,
            "cast(\"2022\" as timestamp) + INTERVAL '12' MONTH"
        );
        assert!(shifted.df.expr.contains("toDF(\"timestamp\")"));
        assert_eq!(shifted.df.interval.as_deref(), Some("INTERVAL '12' MONTH"));
        assert_eq!(shifted.sql.interval, None);
        assert_eq!(shifted.expected.primary().value(), Some("2023-01-01 00:00:00"));
    }

    #[test]
    fn date_interval_frames_use_capitalised_column() {
        let cases = valid_date(&spec(TypeTag::Date));
        assert!(cases[0].df.expr.contains("toDF(\"date\")"));
        assert!(cases[6].df.expr.contains("toDF(\"Date\")"));
        assert!(cases[6].df.expr.ends_with("getAs[java.sql.Date](0)"));
    }

    #[test]
    fn bad_intervals_carry_error_fragment() {
        let cases = invalid_timestamp(&spec(TypeTag::Timestamp));
        let first_bad = &cases[5 + 5 * 8];
        assert_eq!(
            first_bad.sql.expr,
            "cast(\"2022\" as timestamp) + INTERVAL '10 years -11 month -12 days'"
        );
        assert_eq!(
            first_bad.expected.primary().message(),
            Some("Cannot mix year-month and day-time fields")
        );
        let last = cases.last().unwrap();
        assert!(last.sql.expr.starts_with("cast(\"2016-02-29 03:20:50.28 +08\" as timestamp)"));
        assert!(
            last.expected
                .primary()
                .message()
                .is_some_and(|m| m.starts_with("Can only use numbers"))
        );
    }

    #[test]
    fn all_invalid_temporal_cases_are_exceptions() {
        let invalid = invalid_date(&spec(TypeTag::Date));
        assert!(invalid.iter().all(|c| !c.expected.primary().is_expression()));
        assert_eq!(invalid[0].sql.expr, "cast(\"2016-02-30\" as date)");
    }
}
