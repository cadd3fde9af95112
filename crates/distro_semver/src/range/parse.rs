use std::borrow::Cow;
use std::str::FromStr;

use thiserror::Error;

use super::Range;
use crate::version::{ParseVersionError, Version};

/// Reasons an expression is rejected as a range.
///
/// Like [`ParseVersionError`], these are sentinel values comparable with
/// `==`; version errors encountered inside a bound pass through unchanged.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ParseRangeError {
    /// A boundary of the range is not a valid version.
    #[error(transparent)]
    InvalidVersion(#[from] ParseVersionError),
    /// A shortcut notation that cannot be expanded.
    #[error("unsupported shortcut notation for range")]
    UnsupportedShortcutNotation,
    /// More than two boundaries were given.
    #[error("range contains more than two elements")]
    TooManyElements,
}

impl ParseRangeError {
    /// Always true; see [`ParseVersionError::is_invalid`].
    pub fn is_invalid(&self) -> bool {
        true
    }
}

/// Delimiters between the two bounds of a natural range. The comma must
/// come before the bare space so `1.2, 2.0` splits at the comma.
const BOUND_DELIMITERS: [&str; 5] = [" - ", " – ", "–", ",", " "];

fn parse_range(input: &str) -> Result<Range, ParseRangeError> {
    if matches!(input, "" | "*" | "x") {
        return Ok(Range::default());
    }

    let mut s = input;
    if s.ends_with(".x") || s.ends_with(".*") {
        s = s.trim_end_matches(['.', 'x', '*']);
        if s.is_empty() {
            return Ok(Range::default());
        }
        if s.contains(['<', '>', '=', '~', '^']) {
            tracing::warn!(
                range = input,
                "a wildcard suffix after an operator is superfluous and ignored"
            );
        }
    }

    if s.starts_with(['^', '~']) {
        return by_shortcut(s);
    }

    let is_natural_range = s.contains([' ', ',', '–']);
    if !is_natural_range {
        return match s.matches('.').count() {
            1 => by_shortcut(&format!("~{s}")),
            0 => by_shortcut(&format!("^{s}")),
            _ => {
                let mut range = Range::default();
                range.set_bound(s)?;
                Ok(range)
            }
        };
    }

    for delimiter in BOUND_DELIMITERS {
        if !s.contains(delimiter) {
            continue;
        }
        let mut parts = s.split(delimiter);
        let (Some(left), Some(right), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseRangeError::TooManyElements);
        };

        let mut range = Range::default();
        if left.starts_with(['>', '≥']) {
            range.set_bound(left)?;
        } else {
            range.set_bound(&format!(">={left}"))?;
        }
        if right.starts_with(['<', '≤']) {
            range.set_bound(right)?;
        } else {
            range.set_bound(&format!("<={right}"))?;
        }
        return Ok(range);
    }

    unreachable!("a bound delimiter was detected above")
}

/// Expands `^X` and `~X`: the lower bound is inclusive at the parsed
/// version, the upper bound exclusive at the next minor (`~`, or any
/// shortcut below major 1) or the next major (`^`, or a single column).
/// A leading `0.0.` leaves nothing to widen and pins the remainder.
fn by_shortcut(s: &str) -> Result<Range, ParseRangeError> {
    let t = s.trim_start_matches(['~', '^']);
    let lower: Version = t.parse()?;
    if t.starts_with("0.0.") {
        return parse_range(t);
    }

    let mut upper = Version::default();
    if t.starts_with("0.") {
        upper.slots[0] = lower.slots[0];
        upper.slots[1] = lower.slots[1].saturating_add(1);
    } else if s.starts_with('^') || !t.contains('.') {
        upper.slots[0] = lower.slots[0].saturating_add(1);
    } else if s.starts_with('~') {
        upper.slots[0] = lower.slots[0];
        upper.slots[1] = lower.slots[1].saturating_add(1);
    } else {
        return Err(ParseRangeError::UnsupportedShortcutNotation);
    }

    Ok(Range {
        lower: Some(lower),
        lower_inclusive: true,
        upper: Some(upper),
        upper_inclusive: false,
    })
}

impl Range {
    /// Records `bound` as lower and/or upper bound. Everything before the
    /// first digit is the operator prefix: `>`/`<` select the bound, `=`
    /// makes it inclusive, and a bare version sets both bounds at once.
    fn set_bound(&mut self, bound: &str) -> Result<(), ParseRangeError> {
        let normalized: Cow<'_, str> = if bound.contains(['≥', '≤']) {
            Cow::Owned(bound.replace('≥', ">=").replace('≤', "<="))
        } else {
            Cow::Borrowed(bound)
        };
        let digits_at = normalized
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(normalized.len());
        let (prefix, version_str) = normalized.split_at(digits_at);
        let version: Version = version_str.parse()?;

        let inclusive = prefix.contains('=');
        if !prefix.contains('>') {
            self.upper = Some(version);
            self.upper_inclusive = inclusive;
        }
        if !prefix.contains('<') {
            self.lower = Some(version);
            self.lower_inclusive = inclusive;
        }
        Ok(())
    }
}

impl FromStr for Range {
    type Err = ParseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_range(s)
    }
}

impl TryFrom<&[u8]> for Range {
    type Error = ParseRangeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let s = std::str::from_utf8(bytes)
            .map_err(|_| ParseVersionError::InvalidVersionString)?;
        parse_range(s)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rstest::rstest;

    use super::{ParseRangeError, ParseVersionError, Range, Version};

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn r(s: &str) -> Range {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("~1.2", "1.2.0", "1.3.0")]
    #[case("~1.2.3", "1.2.3", "1.3.0")]
    #[case("^1.2", "1.2.0", "2.0.0")]
    #[case("^1", "1.0.0", "2.0.0")]
    #[case("~1", "1.0.0", "2.0.0")]
    #[case("^0.4", "0.4.0", "0.5.0")]
    #[case("~0.4.2", "0.4.2", "0.5.0")]
    #[case("1.2.x", "1.2.0", "1.3.0")]
    #[case("1.x", "1.0.0", "2.0.0")]
    #[case("14", "14.0.0", "15.0.0")]
    fn shortcuts_expand_to_half_open_intervals(
        #[case] input: &str,
        #[case] lower: &str,
        #[case] upper: &str,
    ) {
        let range = r(input);
        assert_eq!(range.lower, Some(v(lower)), "lower of {input}");
        assert!(range.lower_inclusive);
        assert_eq!(range.upper, Some(v(upper)), "upper of {input}");
        assert!(!range.upper_inclusive);
    }

    #[test]
    fn universal_spellings() {
        for input in ["", "*", "x", ".x", ".*"] {
            assert_eq!(r(input), Range::default(), "{input:?}");
        }
    }

    #[test]
    fn a_leading_zero_zero_pins_the_remainder() {
        let range = r("^0.0.5");
        assert_eq!(range.lower, Some(v("0.0.5")));
        assert_eq!(range.upper, Some(v("0.0.5")));
        assert!(range.contains(&v("0.0.5")));
        assert!(!range.contains(&v("0.0.6")));
    }

    #[rstest]
    #[case("1.2.3 - 2.0.0")]
    #[case("1.2.3 – 2.0.0")]
    #[case("1.2.3–2.0.0")]
    #[case("1.2.3,2.0.0")]
    #[case("1.2.3 2.0.0")]
    fn bound_delimiters(#[case] input: &str) {
        let range = r(input);
        assert_eq!(range.lower, Some(v("1.2.3")), "{input}");
        assert!(range.lower_inclusive);
        assert_eq!(range.upper, Some(v("2.0.0")), "{input}");
        assert!(range.upper_inclusive);
    }

    #[test]
    fn explicit_operators_keep_their_inclusivity() {
        let range = r(">1.2.3 <2.0.0");
        assert!(!range.lower_inclusive);
        assert!(!range.upper_inclusive);

        let range = r("≥1.2.3 ≤2.0.0");
        assert!(range.lower_inclusive);
        assert!(range.upper_inclusive);
        assert_eq!(range.lower, Some(v("1.2.3")));
        assert_eq!(range.upper, Some(v("2.0.0")));
    }

    #[test]
    fn single_bounds() {
        let range = r("<2.0.0");
        assert_eq!(range.lower, None);
        assert_eq!(range.upper, Some(v("2.0.0")));
        assert!(!range.upper_inclusive);

        let range = r(">=1.2.3");
        assert_eq!(range.lower, Some(v("1.2.3")));
        assert!(range.lower_inclusive);
        assert_eq!(range.upper, None);
    }

    #[test]
    fn a_bare_version_pins_both_bounds() {
        let range = r("1.2.3");
        assert_eq!(range.lower, Some(v("1.2.3")));
        assert_eq!(range.upper, Some(v("1.2.3")));
        assert!(!range.lower_inclusive);
        assert!(!range.upper_inclusive);
    }

    #[test]
    fn superfluous_wildcards_after_operators_are_dropped() {
        assert_eq!(r(">=2.10.4.x"), r(">=2.10.4"));
    }

    #[test]
    fn rejects_malformed_ranges() {
        assert_matches!(
            "1.2 1.3 1.4".parse::<Range>(),
            Err(ParseRangeError::TooManyElements)
        );
        assert_matches!(
            "^1..2".parse::<Range>(),
            Err(ParseRangeError::InvalidVersion(
                ParseVersionError::InvalidVersionString
            ))
        );
        // Short relational tokens never reach the bound parser; the
        // shortcut fallback rejects them instead.
        assert_matches!(
            ">1.0".parse::<Range>(),
            Err(ParseRangeError::InvalidVersion(_))
        );
        assert!("1.2 1.3 1.4".parse::<Range>().unwrap_err().is_invalid());
    }

    #[test]
    fn ranges_parse_from_bytes() {
        let range = Range::try_from(b"~1.2".as_slice()).unwrap();
        assert_eq!(range, r("~1.2"));
        assert_matches!(
            Range::try_from(b"\xff\xfe".as_slice()),
            Err(ParseRangeError::InvalidVersion(
                ParseVersionError::InvalidVersionString
            ))
        );
    }
}
