use super::{ReleaseType, Version, COMMON, RELEASE_SLOT, RELEASE_TYPE_SLOT};

impl Version {
    /// Enumerates plausible next versions after this one.
    ///
    /// For a pre-release, the remaining pre-release stages of the same
    /// version come first, ending in the version itself going common. For
    /// common versions a revision (`r1`) and patch level (`p1`) are
    /// suggested. Finally each release point is incremented, patch first,
    /// each preceded by pre-release options from `min_release_type` upward;
    /// those options are numbered (`rc1`) when `numbered_pre` is set. Set
    /// `min_release_type` to [`ReleaseType::Common`] if you don't want any
    /// pre-release options; minima above it yield an empty list.
    ///
    /// ```
    /// use distro_semver::{ReleaseType, Version};
    ///
    /// let ver: Version = "1.0.0".parse().unwrap();
    /// let next: Vec<String> = ver
    ///     .next_versions(ReleaseType::Common, false)
    ///     .iter()
    ///     .map(|v| v.to_string())
    ///     .collect();
    /// assert_eq!(next, ["1.0.0-r1", "1.0.0-p1", "1.0.1", "1.1.0", "2.0.0"]);
    /// ```
    pub fn next_versions(&self, min_release_type: ReleaseType, numbered_pre: bool) -> Vec<Version> {
        let mut next = Vec::new();
        let min = min_release_type as i32;
        if min > COMMON {
            return next;
        }

        let current_type = self.slots[RELEASE_TYPE_SLOT];

        // A pre-release first walks the remaining pre-release stages of the
        // same version, then the version itself going common.
        let mut release_type = current_type;
        while release_type < COMMON {
            if release_type == current_type {
                if numbered_pre {
                    let mut ver = *self;
                    ver.slots[RELEASE_SLOT] += 1;
                    next.push(ver);
                }
            } else {
                let mut ver = *self;
                ver.slots[RELEASE_TYPE_SLOT] = release_type;
                ver.slots[RELEASE_SLOT] = if numbered_pre { 1 } else { 0 };
                next.push(ver);
            }
            release_type += 1;
        }
        if current_type < COMMON {
            let mut ver = *self;
            ver.slots[RELEASE_TYPE_SLOT] = COMMON;
            ver.slots[RELEASE_SLOT] = 0;
            next.push(ver);
        }

        // At least a common release: suggest a revision or patch level,
        // unless it is one of those already.
        if current_type == COMMON || current_type == ReleaseType::Patch as i32 {
            let mut ver = *self;
            ver.slots[RELEASE_TYPE_SLOT] = ReleaseType::Revision as i32;
            ver.slots[RELEASE_SLOT] = 1;
            next.push(ver);
        }
        if current_type == COMMON || current_type == ReleaseType::Revision as i32 {
            let mut ver = *self;
            ver.slots[RELEASE_TYPE_SLOT] = ReleaseType::Patch as i32;
            ver.slots[RELEASE_SLOT] = 1;
            next.push(ver);
        }

        // Increment each release point, patch first, with the desired
        // pre-release options before the common variant.
        for point in (0..=RELEASE_TYPE_SLOT - 2).rev() {
            for release_type in min..=COMMON {
                if point == 2 && release_type < COMMON {
                    continue; // patches seldom have pre-releases
                }
                let mut ver = *self;
                ver.slots[point] += 1;
                for slot in ver.slots[point + 1..].iter_mut() {
                    *slot = 0; // when incrementing, reset the following points
                }
                ver.slots[RELEASE_TYPE_SLOT] = release_type;
                if release_type < COMMON {
                    ver.slots[RELEASE_SLOT] = if numbered_pre { 1 } else { 0 };
                }
                next.push(ver);
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::{ReleaseType, Version};

    fn next_of(version: &str, min: ReleaseType, numbered_pre: bool) -> Vec<String> {
        let ver: Version = version.parse().unwrap();
        ver.next_versions(min, numbered_pre)
            .iter()
            .map(Version::to_string)
            .collect()
    }

    #[test]
    fn after_a_release_without_pre_releases() {
        assert_eq!(
            next_of("1.0.0", ReleaseType::Common, false),
            ["1.0.0-r1", "1.0.0-p1", "1.0.1", "1.1.0", "2.0.0"]
        );
        assert_eq!(
            next_of("1.2.3", ReleaseType::Common, false),
            ["1.2.3-r1", "1.2.3-p1", "1.2.4", "1.3.0", "2.0.0"]
        );
    }

    #[test]
    fn after_a_release_with_some_pre_releases() {
        assert_eq!(
            next_of("1.0.0", ReleaseType::Pre, false),
            [
                "1.0.0-r1",
                "1.0.0-p1",
                "1.0.1",
                "1.1.0-pre",
                "1.1.0-rc",
                "1.1.0",
                "2.0.0-pre",
                "2.0.0-rc",
                "2.0.0",
            ]
        );
        assert_eq!(
            next_of("1.0.0", ReleaseType::Pre, true),
            [
                "1.0.0-r1",
                "1.0.0-p1",
                "1.0.1",
                "1.1.0-pre1",
                "1.1.0-rc1",
                "1.1.0",
                "2.0.0-pre1",
                "2.0.0-rc1",
                "2.0.0",
            ]
        );
    }

    #[test]
    fn after_a_release_with_all_pre_releases() {
        assert_eq!(
            next_of("1.2.3", ReleaseType::Alpha, false),
            [
                "1.2.3-r1",
                "1.2.3-p1",
                "1.2.4",
                "1.3.0-alpha",
                "1.3.0-beta",
                "1.3.0-pre",
                "1.3.0-rc",
                "1.3.0",
                "2.0.0-alpha",
                "2.0.0-beta",
                "2.0.0-pre",
                "2.0.0-rc",
                "2.0.0",
            ]
        );
    }

    #[test]
    fn after_a_pre_release() {
        assert_eq!(
            next_of("1.2.0-beta2", ReleaseType::Alpha, true),
            [
                "1.2.0-beta3",
                "1.2.0-pre1",
                "1.2.0-rc1",
                "1.2.0",
                "1.2.1",
                "1.3.0-alpha1",
                "1.3.0-beta1",
                "1.3.0-pre1",
                "1.3.0-rc1",
                "1.3.0",
                "2.0.0-alpha1",
                "2.0.0-beta1",
                "2.0.0-pre1",
                "2.0.0-rc1",
                "2.0.0",
            ]
        );
    }

    #[test]
    fn minimum_above_common_yields_nothing() {
        assert!(next_of("1.0.0", ReleaseType::Revision, false).is_empty());
        assert!(next_of("1.0.0", ReleaseType::Patch, true).is_empty());
    }
}
