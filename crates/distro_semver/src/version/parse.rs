use std::str::FromStr;

use thiserror::Error;

use super::{
    ReleaseType, Version, RELEASE_SLOT, RELEASE_TYPE_SLOT, SLOT_COUNT, SPECIFIER_SLOT,
    SPECIFIER_TYPE_SLOT,
};

/// Reasons a byte sequence is rejected as a version.
///
/// Every rejection is a plain sentinel value: variants carry no payload and
/// the type is `Copy + Eq`, so callers can compare errors directly.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ParseVersionError {
    /// The input does not resemble a version.
    #[error("given string does not resemble a version")]
    InvalidVersionString,
    /// A segment has more than four numeric columns.
    #[error("version consists of too many columns")]
    TooManyColumns,
    /// The version would overflow its storage.
    #[error("version is too long")]
    VersionStringLength,
    /// A `+` that is not followed by `build` and 1–9 digits ending the input.
    #[error("version has a '+' but no +buildNNN suffix")]
    InvalidBuildSuffix,
    /// The source is neither textual nor integral.
    #[error("cannot read this type into a version")]
    InvalidType,
    /// An integral source outside `0..=2^31-1`.
    #[error("the source representation does not fit into a version")]
    OutOfBounds,
}

impl ParseVersionError {
    /// Always true: a parse failure is an invalid-input condition, never an
    /// environmental one.
    pub fn is_invalid(&self) -> bool {
        true
    }
}

/// Character classes over 7-bit bytes. Bytes outside the ASCII range fall
/// through both tests and are treated as structural or invalid.
fn is_digit(b: u8) -> bool {
    b.wrapping_sub(b'0') < 10
}

fn is_lower_letter(b: u8) -> bool {
    b.wrapping_sub(b'a') < 26
}

/// Consumes a run of up to 11 digits and accumulates their value.
fn scan_number(bytes: &[u8]) -> (usize, u64) {
    let mut consumed = 0;
    let mut value: u64 = 0;
    while consumed <= 10 && consumed < bytes.len() {
        let digit = bytes[consumed].wrapping_sub(b'0');
        if digit > 9 {
            break;
        }
        value = value * 10 + u64::from(digit);
        consumed += 1;
    }
    (consumed, value)
}

/// Reads one numeric column into `slots[field]` and returns the number of
/// bytes consumed. A run must be 1 to 9 digits; a ten-digit run could exceed
/// 2^31 and is rejected outright.
fn store_number(ver: &mut Version, field: usize, rest: &[u8]) -> Result<usize, ParseVersionError> {
    let (consumed, value) = scan_number(rest);
    if consumed == 0 || consumed >= 10 || value > i32::MAX as u64 {
        return Err(ParseVersionError::InvalidVersionString);
    }
    if field >= SLOT_COUNT {
        return Err(ParseVersionError::VersionStringLength);
    }
    ver.slots[field] = value as i32;
    Ok(consumed)
}

/// Reads a release-type keyword at `idx`, stores its tag in the current
/// segment's type slot and returns the index of the next unread byte.
///
/// The keyword run may be empty when another separator follows, which
/// resolves to `pre`; an empty run at the end of the input is a trailing
/// separator and invalid. An optional `.` after the keyword is consumed so
/// `alpha.6` and `alpha6` read the same.
fn read_type_keyword(
    ver: &mut Version,
    bytes: &[u8],
    mut idx: usize,
    field: &mut usize,
    column: &mut usize,
) -> Result<usize, ParseVersionError> {
    let start = idx;
    while idx < bytes.len() && is_lower_letter(bytes[idx]) {
        idx += 1;
    }
    if start == idx && (idx >= bytes.len() || !matches!(bytes[idx], b'-' | b'_')) {
        return Err(ParseVersionError::InvalidVersionString);
    }
    let tag = ReleaseType::from_keyword(&bytes[start..idx])
        .ok_or(ParseVersionError::InvalidVersionString)?;

    *field = match *field {
        f if f < RELEASE_TYPE_SLOT => RELEASE_TYPE_SLOT,
        f if f < SPECIFIER_TYPE_SLOT => SPECIFIER_TYPE_SLOT,
        _ => return Err(ParseVersionError::InvalidVersionString),
    };
    ver.slots[*field] = tag as i32;
    *field += 1;
    *column = 0;

    if idx + 1 < bytes.len() && bytes[idx] == b'.' {
        idx += 1;
    }
    Ok(idx)
}

const BUILD_SUFFIX: &[u8] = b"+build";

/// Single-pass state machine filling a fresh [`Version`] from `bytes`.
///
/// `field` is the write pointer into the slot array, `column` counts numeric
/// columns within the current segment. Whitespace is not tolerated anywhere;
/// a leading `v`/`V` is consumed if the input has at least two bytes.
pub(crate) fn parse_version(bytes: &[u8]) -> Result<Version, ParseVersionError> {
    let mut ver = Version::default();
    let len = bytes.len();
    let mut idx = 0;
    let mut field = 0;
    let mut column = 0;

    if len > 1 && (bytes[0] == b'v' || bytes[0] == b'V') {
        idx += 1;
    }

    while idx < len {
        let b = bytes[idx];
        match b {
            b'.' => {
                idx += 1;
                column += 1;
                if column >= 4 || idx >= len {
                    return Err(ParseVersionError::TooManyColumns);
                }
                field += 1;
                idx += store_number(&mut ver, field, &bytes[idx..])?;
            }
            _ if is_digit(b) => {
                idx += store_number(&mut ver, field, &bytes[idx..])?;
            }
            b'-' | b'_' => {
                idx += 1;
                if idx < len && is_digit(bytes[idx]) {
                    // A separator straight into numbers continues in the next
                    // segment's numeric columns with an implicit common type.
                    column = 0;
                    field = match field {
                        f if f < RELEASE_TYPE_SLOT => RELEASE_SLOT,
                        f if f < SPECIFIER_TYPE_SLOT => SPECIFIER_SLOT,
                        _ => return Err(ParseVersionError::InvalidVersionString),
                    };
                    continue;
                }
                idx = read_type_keyword(&mut ver, bytes, idx, &mut field, &mut column)?;
            }
            _ if is_lower_letter(b) => {
                idx = read_type_keyword(&mut ver, bytes, idx, &mut field, &mut column)?;
            }
            b'+' => {
                if len < idx + BUILD_SUFFIX.len() + 1
                    || &bytes[idx..idx + BUILD_SUFFIX.len()] != BUILD_SUFFIX
                {
                    return Err(ParseVersionError::InvalidBuildSuffix);
                }
                idx += BUILD_SUFFIX.len();
                let (consumed, value) = scan_number(&bytes[idx..]);
                if consumed > 9 || idx + consumed < len {
                    return Err(ParseVersionError::InvalidBuildSuffix);
                }
                ver.build = value as i32;
                return Ok(ver);
            }
            _ => return Err(ParseVersionError::InvalidVersionString),
        }
    }

    Ok(ver)
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_version(s.as_bytes())
    }
}

impl TryFrom<&[u8]> for Version {
    type Error = ParseVersionError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        parse_version(bytes)
    }
}

impl TryFrom<i64> for Version {
    type Error = ParseVersionError;

    /// Reads a bare number as major, the way database drivers hand over
    /// integer columns. Everything above 2^31−1 or below zero is rejected.
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if !(0..=i64::from(i32::MAX)).contains(&value) {
            return Err(ParseVersionError::OutOfBounds);
        }
        let mut ver = Version::default();
        ver.slots[0] = value as i32;
        Ok(ver)
    }
}
