//! Value canonicalization and the fixed equivalence classes.

/// Placeholder for a value nothing was captured for. Tested by containment:
/// the scanner may append evidence after it.
pub const NO_OUTPUT: &str = "No output";

/// Prefix of the note the scanner appends to a value when it finds an
/// exception line.
pub const EXCEPTION_NOTE: &str = ", find exception: ";

/// Applied in order to every captured value.
const SUBSTITUTIONS: [(&str, &str); 3] = [("NULL", "null"), ("\t", " "), ("\\\\", "\\")];

/// Renderings of the same value that differ only cosmetically between
/// engines and interfaces.
pub const EQUIVALENCE_CLASSES: [&[&str]; 6] = [
    &["NULL", "null"],
    &[
        "{-2147483648:{12831273.24:3.141592653589793E-305}}",
        "{-2147483648 -> {12831273.24 -> 3.141592653589793E-305}}",
        "{-2147483648:{\"12831273.24\":3.141592653589793E-305}}",
        "{-2147483648:{12831273.24 3.141592653589793E-305",
    ],
    &[
        "{12831273.24:3.141592653589793E-305}",
        "{12831273.24 -> 3.141592653589793E-305}",
        "{\"12831273.24\":3.141592653589793E-305}",
        "{12831273.24 3.141592653589793E-305",
    ],
    &[
        "[[3.141592653589793E-305], [3.141592653589793E-305, 3.142E-320]]",
        "[[3.141592653589793E-305],[3.141592653589793E-305,3.142E-320]]",
    ],
    &[r"^fo\\o$", r"^fo\o$"],
    &["8.88888888888889E9", "8888888888.8888900000"],
];

/// Apply the substitutions to an already trimmed value.
#[must_use]
pub fn canonicalize(raw: &str) -> String {
    let mut value = raw.to_owned();
    for (from, to) in SUBSTITUTIONS {
        if value.contains(from) {
            value = value.replace(from, to);
        }
    }
    value
}

#[must_use]
pub fn is_no_output(value: &str) -> bool {
    value.contains(NO_OUTPUT)
}

/// Index of the equivalence class `value` belongs to.
#[must_use]
pub fn class_of(value: &str) -> Option<usize> {
    EQUIVALENCE_CLASSES
        .iter()
        .position(|class| class.contains(&value))
}

#[must_use]
pub fn same_class(a: &str, b: &str) -> bool {
    class_of(a).is_some_and(|class| class_of(b) == Some(class))
}

/// What a value folds to when differential buckets are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FoldKey<'a> {
    NoOutput,
    Class(usize),
    Text(&'a str),
}

#[must_use]
pub fn fold_key(value: &str) -> FoldKey<'_> {
    if is_no_output(value) {
        FoldKey::NoOutput
    } else if let Some(class) = class_of(value) {
        FoldKey::Class(class)
    } else {
        FoldKey::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_lowercased() {
        assert_eq!(canonicalize("NULL"), "null");
        assert_eq!(canonicalize("null"), "null");
    }

    #[test]
    fn tabs_become_spaces() {
        assert_eq!(
            canonicalize("{12831273.24\t3.141592653589793E-305"),
            "{12831273.24 3.141592653589793E-305"
        );
    }

    #[test]
    fn doubled_backslashes_collapse() {
        assert_eq!(canonicalize(r"^fo\\o$"), r"^fo\o$");
        assert_eq!(canonicalize(r"a\\\\b"), r"a\\b");
    }

    #[test]
    fn substitution_order_is_fixed() {
        // NULL is rewritten before tabs, so a tab-joined pair keeps both parts.
        assert_eq!(canonicalize("NULL\tNULL"), "null null");
    }

    #[test]
    fn classes_are_disjoint() {
        for (i, a) in EQUIVALENCE_CLASSES.iter().enumerate() {
            for b in &EQUIVALENCE_CLASSES[i + 1..] {
                assert!(a.iter().all(|value| !b.contains(value)));
            }
        }
    }

    #[test]
    fn members_share_a_class() {
        for class in EQUIVALENCE_CLASSES {
            for a in class {
                for b in class {
                    assert!(same_class(a, b), "{a} vs {b}");
                }
            }
        }
        assert!(!same_class("1", "1"));
        assert!(!same_class("null", "8.88888888888889E9"));
    }

    #[test]
    fn sentinel_is_detected_with_notes() {
        assert!(is_no_output(NO_OUTPUT));
        assert!(is_no_output(&format!("{NO_OUTPUT}{EXCEPTION_NOTE}Cannot cast")));
        assert!(!is_no_output("no output"));
    }

    #[test]
    fn fold_keys() {
        assert_eq!(fold_key("No output, find exception: x"), FoldKey::NoOutput);
        assert_eq!(fold_key("NULL"), fold_key("null"));
        assert_eq!(fold_key("-1"), FoldKey::Text("-1"));
    }
}
