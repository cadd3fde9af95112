//! Compact version ranges like `~1.2`, `^0.4.2`, `1.2.x` or
//! `>=1.2.3 <2.0.0`, and the matching of versions against them.
//!
//! A [`Range`] distinguishes plain set membership ([`Range::contains`]) from
//! package-installation satisfiability ([`Range::is_satisfied_by`]), which
//! additionally refuses pre-releases unless the range itself was written in
//! terms of one.

mod parse;

pub use parse::ParseRangeError;

use crate::version::{ReleaseType, Version};

/// A range of versions, given by an optional lower and upper boundary.
///
/// The default value has no boundaries and contains every version. Ranges
/// are value types: they own their boundary versions and share nothing with
/// the expression they were parsed from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Range {
    lower: Option<Version>,
    lower_inclusive: bool,
    upper: Option<Version>,
    upper_inclusive: bool,
}

impl Range {
    /// The lower boundary, if the range has one.
    ///
    /// ```
    /// use distro_semver::Range;
    ///
    /// let range: Range = "^1.2".parse().unwrap();
    /// assert_eq!(range.lower_boundary().unwrap().to_string(), "1.2.0");
    /// ```
    pub fn lower_boundary(&self) -> Option<&Version> {
        self.lower.as_ref()
    }

    /// The upper boundary, if the range has one. Shortcut notations produce
    /// an exclusive upper boundary, so for `~1.2.3` this is `1.3.0`.
    pub fn upper_boundary(&self) -> Option<&Version> {
        self.upper.as_ref()
    }

    /// Set membership: true if `version` lies within this range's interval.
    ///
    /// A range with coinciding boundaries, such as one parsed from a bare
    /// `1.2.3`, contains exactly the versions that are
    /// [limited-equal](Version::limited_equal) to that version. An exclusive
    /// upper boundary with a common release type shuts out its own
    /// pre-releases as well, so `<2.0.0` excludes every `2.0.0-something`.
    pub fn contains(&self, version: &Version) -> bool {
        match (&self.lower, &self.upper) {
            (None, None) => true,
            (Some(lower), Some(upper)) if lower == upper => lower.limited_equal(version),
            _ => self.satisfies_lower_bound(version) && self.satisfies_upper_bound(version),
        }
    }

    /// Like [`Range::contains`], but suitable as a package-installation
    /// gate: a pre-release only satisfies the range if at least one present
    /// boundary is itself a pre-release sharing the release columns with it.
    ///
    /// ```
    /// use distro_semver::{Range, Version};
    ///
    /// let range: Range = "~1.2".parse().unwrap();
    /// let pre: Version = "1.2.3-beta".parse().unwrap();
    ///
    /// assert!(range.contains(&pre));
    /// assert!(!range.is_satisfied_by(&pre));
    /// ```
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        if version.is_a_pre_release() {
            let admits = |bound: &Option<Version>| {
                bound
                    .as_ref()
                    .is_some_and(|b| b.is_a_pre_release() && b.shares_prefix_with(version))
            };
            if !admits(&self.lower) && !admits(&self.upper) {
                return false;
            }
        }
        self.contains(version)
    }

    fn satisfies_lower_bound(&self, version: &Version) -> bool {
        let Some(lower) = &self.lower else {
            return true;
        };

        let equal = lower.limited_equal(version);
        if self.lower_inclusive && equal {
            return true;
        }
        lower.limited_less(version) && !equal
    }

    fn satisfies_upper_bound(&self, version: &Version) -> bool {
        let Some(upper) = &self.upper else {
            return true;
        };

        let mut equal = upper.limited_equal(version);
        if self.upper_inclusive && equal {
            return true;
        }
        if !self.upper_inclusive && upper.release_type() == ReleaseType::Common {
            // Keep `2.0.0-rc` and friends below an exclusive `<2.0.0`.
            equal = upper.shares_prefix_with(version);
        }
        version.limited_less(upper) && !equal
    }
}
