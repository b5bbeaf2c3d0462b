/*
 * pandoc/locate.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Pandoc binary discovery and version negotiation.
 */

//! Pandoc binary discovery.
//!
//! Candidate installation directories, in priority order:
//!
//! 1. `RMDRENDER_PANDOC` — a bundled install directory (or direct path to
//!    the binary).
//! 2. The directory of the `pandoc` found on the process search path.
//! 3. `~/opt/pandoc` (non-Windows only), the user-local fallback.
//!
//! Each candidate is probed by running `pandoc --version` and parsing the
//! first line's second whitespace token as a dotted version. Candidates
//! that do not exist or cannot be executed score version zero. The
//! strictly highest version wins; a tie keeps the first-listed source.
//! The first successful scan is cached for the process lifetime; rescans
//! are explicit via `force_rescan`.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use tracing::debug;

use rmdrender_util::Version;
#[cfg(not(windows))]
use rmdrender_util::paths::expand_home;

use crate::error::{RenderError, Result};

/// Environment variable naming a bundled pandoc install directory.
pub const PANDOC_DIR_ENV: &str = "RMDRENDER_PANDOC";

/// A located pandoc installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PandocLocation {
    /// Directory containing the binary
    pub dir: PathBuf,
    /// Full path to the binary
    pub binary: PathBuf,
    /// Parsed version
    pub version: Version,
}

/// Resolver for the pandoc installation, with a process-lifetime cache.
///
/// The cache is explicit state on the resolver object; the shared
/// instance returned by [`PandocLocator::global`] is just a lazily
/// scanned instance of the same type.
#[derive(Debug, Default)]
pub struct PandocLocator {
    cache: Mutex<Option<PandocLocation>>,
}

impl PandocLocator {
    /// Create a locator with an empty cache.
    pub const fn new() -> Self {
        Self {
            cache: Mutex::new(None),
        }
    }

    /// The process-shared locator instance.
    pub fn global() -> &'static PandocLocator {
        static GLOBAL: PandocLocator = PandocLocator::new();
        &GLOBAL
    }

    /// Locate the best available pandoc installation.
    ///
    /// The first successful scan wins for the process lifetime unless
    /// `force_rescan` is set, which repeats the scan and replaces the
    /// cached result.
    pub fn locate(&self, force_rescan: bool) -> Result<PandocLocation> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !force_rescan && let Some(ref location) = *cache {
            return Ok(location.clone());
        }

        let candidates = scan_candidates();
        let location = select_best(candidates).ok_or(RenderError::PandocNotFound {
            min_version: None,
        })?;

        debug!(
            binary = %location.binary.display(),
            version = %location.version,
            "located pandoc"
        );
        *cache = Some(location.clone());
        Ok(location)
    }

    /// The version of the located installation.
    pub fn version(&self) -> Result<Version> {
        Ok(self.locate(false)?.version)
    }

    /// Whether pandoc is available, optionally at a minimum version.
    pub fn is_available(&self, min_version: Option<&Version>) -> bool {
        match self.locate(false) {
            Ok(location) => match min_version {
                Some(min) => location.version >= *min,
                None => true,
            },
            Err(_) => false,
        }
    }

    /// Locate pandoc, failing loudly when absent or below `min_version`.
    pub fn require_available(&self, min_version: Option<&Version>) -> Result<PandocLocation> {
        let location = self.locate(false).map_err(|_| RenderError::PandocNotFound {
            min_version: min_version.map(Version::to_string),
        })?;

        if let Some(min) = min_version
            && location.version < *min
        {
            return Err(RenderError::PandocNotFound {
                min_version: Some(min.to_string()),
            });
        }

        Ok(location)
    }
}

/// The platform binary name.
fn binary_name() -> &'static str {
    #[cfg(windows)]
    {
        "pandoc.exe"
    }
    #[cfg(not(windows))]
    {
        "pandoc"
    }
}

/// Enumerate candidate install directories in priority order and score
/// each by probing its binary.
fn scan_candidates() -> Vec<(PathBuf, Version)> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(bundled) = std::env::var(PANDOC_DIR_ENV) {
        let bundled = PathBuf::from(bundled);
        // Accept either the install directory or the binary itself.
        if bundled.is_file() {
            if let Some(parent) = bundled.parent() {
                dirs.push(parent.to_path_buf());
            }
        } else {
            dirs.push(bundled);
        }
    }

    if let Ok(on_path) = which::which(binary_name())
        && let Some(parent) = on_path.parent()
    {
        dirs.push(parent.to_path_buf());
    }

    #[cfg(not(windows))]
    dirs.push(expand_home(Path::new("~/opt/pandoc")));

    dirs.into_iter()
        .map(|dir| {
            let version = probe_version(&dir);
            (dir, version)
        })
        .collect()
}

/// Probe one candidate directory, scoring version zero on any failure.
fn probe_version(dir: &Path) -> Version {
    let binary = dir.join(binary_name());
    if !binary.is_file() {
        return Version::zero();
    }

    let output = match Command::new(&binary).arg("--version").output() {
        Ok(output) if output.status.success() => output,
        _ => return Version::zero(),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_version_output(&stdout).unwrap_or_else(Version::zero)
}

/// Parse `pandoc --version` output: the second whitespace-delimited token
/// of the first line is the dotted version (`"pandoc 3.1.9" → 3.1.9`).
fn parse_version_output(stdout: &str) -> Option<Version> {
    let first_line = stdout.lines().next()?;
    let token = first_line.split_whitespace().nth(1)?;
    token.parse().ok()
}

/// Pick the candidate with the strictly greatest nonzero version.
///
/// Iteration keeps the first-listed candidate on ties (a `max_by` would
/// keep the last), which is the priority-order contract.
fn select_best(candidates: Vec<(PathBuf, Version)>) -> Option<PandocLocation> {
    let mut best: Option<(PathBuf, Version)> = None;

    for (dir, version) in candidates {
        if version.is_zero() {
            continue;
        }
        let wins = match &best {
            Some((_, best_version)) => version > *best_version,
            None => true,
        };
        if wins {
            best = Some((dir, version));
        }
    }

    best.map(|(dir, version)| PandocLocation {
        binary: dir.join(binary_name()),
        dir,
        version,
    })
}
