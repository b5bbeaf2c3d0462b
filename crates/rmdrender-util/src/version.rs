//! Dotted version numbers.
//!
//! Versions are sequences of numeric components (`"2.1.3"` → `[2, 1, 3]`).
//! Comparison pads the shorter version with trailing zeros, so
//! `2.1 == 2.1.0` and `2.1 > 1.17`. This ordering drives both pandoc
//! version negotiation and HTML dependency deduplication.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a version string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid version component in '{input}'")]
pub struct VersionParseError {
    /// The string that failed to parse
    pub input: String,
}

/// A dotted numeric version, e.g. `2.19.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// Create a version from explicit components.
    pub fn new(components: Vec<u64>) -> Self {
        Self { components }
    }

    /// The zero version. Sorts below every real version; used to score
    /// candidate tool installations that do not exist.
    pub fn zero() -> Self {
        Self {
            components: vec![0],
        }
    }

    /// Whether this is the zero version.
    pub fn is_zero(&self) -> bool {
        self.components.iter().all(|&c| c == 0)
    }

    /// The numeric components of this version.
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    /// Parse a dotted version.
    ///
    /// Trailing non-numeric qualifiers on a component (e.g. `1.12.4.2-gdcd6bc9`)
    /// are cut off at the first non-digit character, matching how converter
    /// version strings are reported in the wild. A component with no leading
    /// digits at all is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError {
            input: s.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(err());
        }

        let mut components = Vec::new();
        for part in trimmed.split('.') {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return Err(err());
            }
            components.push(digits.parse::<u64>().map_err(|_| err())?);
        }

        Ok(Self { components })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                non_eq => return non_eq,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
