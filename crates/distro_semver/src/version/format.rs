use std::fmt::{self, Display, Formatter, Write};

use serde::de::{self, Visitor};
use serde::{Deserializer, Serialize, Serializer};

use super::parse::parse_version;
use super::{ParseVersionError, ReleaseType, Version, SLOT_COUNT};

impl Version {
    /// Builds the human-readable representation.
    ///
    /// Each segment of five slots emits the smallest number of numeric
    /// columns that keeps the non-zero suffix of the segment, but at least
    /// `min_columns` columns counted across the whole value. A separator and
    /// the type keyword follow whenever anything beyond the columns is
    /// non-zero, and emission stops as soon as the remainder is all zero.
    fn serialize_into(&self, min_columns: i32) -> String {
        let mut out = String::with_capacity(24);

        let last_non_zero = self.slots.iter().rposition(|&slot| slot != 0).unwrap_or(0);
        let mut remaining = min_columns;
        let mut idx = 0;
        while idx < SLOT_COUNT {
            let width = if self.slots[idx + 3] != 0 || remaining >= 4 {
                4
            } else if self.slots[idx + 2] != 0 || remaining >= 3 {
                3
            } else if self.slots[idx + 1] != 0 || remaining >= 2 {
                2
            } else {
                1
            };
            for col in 0..width {
                if col > 0 {
                    out.push('.');
                }
                let _ = write!(out, "{}", self.slots[idx + col]);
            }
            if idx + 4 >= SLOT_COUNT {
                break;
            }

            if idx + 4 <= last_non_zero {
                out.push('-');
            }
            let tag = self.slots[idx + 4];
            if tag != 0 {
                out.push_str(ReleaseType::from_tag(tag).keyword());
            }
            if last_non_zero <= idx + 4 {
                break;
            }
            remaining -= 5;
            idx += 5;
        }

        if self.build != 0 {
            let _ = write!(out, "+build{}", self.build);
        }
        out
    }

    /// The minimal human-readable representation.
    ///
    /// Unlike the [`Display`] form, which always spells out at least three
    /// columns, this conserves space at the expense of legibility:
    ///
    /// ```
    /// use distro_semver::Version;
    ///
    /// let ver: Version = "v2.1".parse().unwrap();
    /// assert_eq!(ver.to_bytes(), b"2.1");
    /// assert_eq!(ver.to_string(), "2.1.0");
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize_into(0).into_bytes()
    }
}

impl Display for Version {
    /// The canonical representation with at least major, minor and patch.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize_into(3))
    }
}

impl Serialize for Version {
    /// Serializes the minimal form, so JSON carries e.g. `"1.2-beta"`.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.serialize_into(0))
    }
}

struct VersionVisitor;

impl Visitor<'_> for VersionVisitor {
    type Value = Version;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a version string or a non-negative integer below 2^31")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let bytes = value.as_bytes();
        // Tolerate one enclosing pair of quotes, as left behind by sloppy
        // re-encoders.
        let bytes = if bytes.len() >= 2
            && matches!(bytes[0], b'"' | b'\'' | b'`')
            && bytes[bytes.len() - 1] == bytes[0]
        {
            &bytes[1..bytes.len() - 1]
        } else {
            bytes
        };
        parse_version(bytes).map_err(E::custom)
    }

    fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        parse_version(value).map_err(E::custom)
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if value > i32::MAX as u64 {
            return Err(E::custom(ParseVersionError::OutOfBounds));
        }
        Version::try_from(value as i64).map_err(E::custom)
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Version::try_from(value).map_err(E::custom)
    }
}

impl<'de> serde::Deserialize<'de> for Version {
    /// Accepts the minimal or canonical textual form, optionally prefixed
    /// with `v`/`V`, as well as bare non-negative integers.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(VersionVisitor)
    }
}

impl TryFrom<&serde_json::Value> for Version {
    type Error = ParseVersionError;

    /// Reads a dynamically typed value, the way a database scan hands over
    /// column data: strings go through the parser, integers become the
    /// major. Anything else is refused as [`ParseVersionError::InvalidType`].
    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(s) => s.parse(),
            serde_json::Value::Number(n) => {
                if let Some(n) = n.as_i64() {
                    Version::try_from(n)
                } else if n.as_u64().is_some() {
                    Err(ParseVersionError::OutOfBounds)
                } else {
                    Err(ParseVersionError::InvalidType)
                }
            }
            _ => Err(ParseVersionError::InvalidType),
        }
    }
}
