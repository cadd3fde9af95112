#![deny(missing_docs)]
//! `distro_semver` parses, orders, serializes and range-matches software
//! version identifiers in a dialect that extends the SemVer convention with
//! Gentoo-style pre-release and patch qualifiers (`alpha`, `beta`, `pre`,
//! `rc`, `r`, `p`) and an optional numeric `+build` suffix. It is aimed at
//! package and distribution tooling that ingests mixed-style version strings
//! and has to sort them fast and match them against compact range
//! expressions.
//!
//! # Versions
//!
//! ```
//! use distro_semver::Version;
//!
//! let released: Version = "1.13".parse().unwrap();
//! let upcoming: Version = "1.13beta".parse().unwrap();
//!
//! assert!(upcoming < released);
//! assert!(upcoming.is_a_pre_release());
//! assert_eq!(upcoming.to_string(), "1.13.0-beta");
//! assert_eq!(upcoming.to_bytes(), b"1.13-beta");
//! ```
//!
//! # Ranges
//!
//! ```
//! use distro_semver::{Range, Version};
//!
//! let version: Version = "1.2.3-beta".parse().unwrap();
//! let range: Range = "~1.2".parse().unwrap();
//!
//! assert!(range.contains(&version));
//! // Pre-releases never satisfy a range built from plain versions.
//! assert!(!range.is_satisfied_by(&version));
//! ```
//!
//! # Bulk sorting
//!
//! Large collections are ordered through [`sort_versions`], which runs a
//! multi-key radix sort over pointers instead of a comparison sort:
//!
//! ```
//! use distro_semver::{sort_versions, Version};
//!
//! let owned: Vec<Version> = ["2.0", "0.5", "1.0-rc2"]
//!     .iter()
//!     .map(|s| s.parse().unwrap())
//!     .collect();
//! let mut ptrs: Vec<Option<&Version>> = owned.iter().map(Some).collect();
//! sort_versions(&mut ptrs);
//!
//! assert_eq!(ptrs[0].unwrap().to_string(), "0.5.0");
//! ```

mod version;

pub mod range;

pub use range::{ParseRangeError, Range};
pub use version::{sort_versions, ParseVersionError, ReleaseType, Version};
