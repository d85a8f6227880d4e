//! Value predicates shared by every stage of the pipeline.
//!
//! The resolver, the row filter, the grouper, the note compiler and the
//! report views all ask "did an installation happen here" through
//! [`is_installation_value`], so the detail and notes tables cannot disagree
//! about a unit being accessed.

use std::cmp::Ordering;

const NON_MEANINGFUL: [&str; 6] = ["", "0", "no", "n/a", "na", "none"];

/// "Existing" records a fixture that was already there, not one installed.
const NO_INSTALLATION: [&str; 10] = [
    "", "0", "no", "n/a", "na", "none", "null", "no touch", "no touch.", "existing",
];

/// Unit values that mark summary rows rather than dwellings.
pub const INVALID_UNIT_TOKENS: [&str; 14] = [
    "total",
    "sum",
    "average",
    "avg",
    "count",
    "header",
    "grand total",
    "subtotal",
    "sub total",
    "totals",
    "grand",
    "summary",
    "n/a",
    "na",
];

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// True when a cell carries real data for column ranking.
pub fn is_meaningful(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    !NON_MEANINGFUL.contains(&normalized.as_str())
}

/// True when a fixture value records an actual installation.
pub fn is_installation_value(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    !NO_INSTALLATION.contains(&normalized.as_str())
}

pub fn is_summary_unit(unit: &str) -> bool {
    let lower = unit.trim().to_lowercase();
    INVALID_UNIT_TOKENS
        .iter()
        .any(|token| lower == *token || lower.contains(token))
}

/// Unit ordering: numeric when both sides start with an integer, natural
/// case-insensitive order otherwise ("9" before "10", "A2" before "a10").
pub fn compare_units(a: &str, b: &str) -> Ordering {
    match (leading_integer(a), leading_integer(b)) {
        (Some(left), Some(right)) if left != right => left.cmp(&right),
        _ => natural_cmp(a, b),
    }
}

fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|number| number * sign)
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = a.trim().to_lowercase();
    let right = b.trim().to_lowercase();
    let mut left_chars = left.chars().peekable();
    let mut right_chars = right.chars().peekable();

    loop {
        match (left_chars.peek().copied(), right_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let left_run = take_digits(&mut left_chars);
                let right_run = take_digits(&mut right_chars);
                let ordering = compare_digit_runs(&left_run, &right_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = match (l.is_ascii_digit(), r.is_ascii_digit()) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => l.cmp(&r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left_chars.next();
                right_chars.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(ch) = chars.peek().copied() {
        if !ch.is_ascii_digit() {
            break;
        }
        run.push(ch);
        chars.next();
    }
    run
}

fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meaningful_rejects_placeholder_values() {
        for value in ["", "  ", "0", "No", "N/A", "na", "NONE"] {
            assert!(!is_meaningful(value), "{value:?} should not be meaningful");
        }
        assert!(is_meaningful("Insert"));
        assert!(is_meaningful("1"));
    }

    #[test]
    fn installation_value_treats_no_touch_as_absent() {
        assert!(!is_installation_value("No Touch"));
        assert!(!is_installation_value("No Touch."));
        assert!(!is_installation_value(" 0 "));
        assert!(!is_installation_value("Existing"));
        assert!(is_installation_value("Insert (2)"));
        assert!(is_installation_value("1.75 GPM"));
    }

    #[test]
    fn summary_units_match_by_containment() {
        assert!(is_summary_unit("Grand Total"));
        assert!(is_summary_unit("TOTALS"));
        assert!(is_summary_unit("avg"));
        assert!(!is_summary_unit("101"));
        assert!(!is_summary_unit("B-12"));
    }

    #[test]
    fn units_sort_numerically_then_naturally() {
        let mut units = vec!["10", "9", "B2", "a10", "101", "B10", "2"];
        units.sort_by(|a, b| compare_units(a, b));
        assert_eq!(units, vec!["2", "9", "10", "101", "a10", "B2", "B10"]);
    }

    #[test]
    fn units_with_same_leading_number_fall_back_to_natural_order() {
        assert_eq!(compare_units("101B", "101A"), Ordering::Greater);
        assert_eq!(compare_units("101", "101"), Ordering::Equal);
    }
}
