/*
 * pandoc/args.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Option-to-flag builders for pandoc invocations.
 */

//! Option-to-flag builders.
//!
//! Each builder maps one structured option to the argument slice it
//! contributes to the pandoc command line. Builders are pure except
//! [`latex_engine_args`], which consults the search path on Windows, and
//! [`MathjaxMode::local_from_env`], which reads the vendored-copy
//! override.

use std::path::{Path, PathBuf};

use rmdrender_util::paths::{normalize_separators, relative_to};

use crate::error::{RenderError, Result};

/// Environment variable naming a locally vendored MathJax copy.
pub const MATHJAX_DIR_ENV: &str = "RMDRENDER_MATHJAX";

/// The CDN-hosted MathJax bundle used by the "default" mode.
pub const MATHJAX_CDN_URL: &str =
    "https://mathjax.rstudio.com/latest/MathJax.js?config=TeX-AMS-MML_HTMLorMML";

/// Highlighting theme substituted for the special `"default"` token.
pub const DEFAULT_HIGHLIGHT_THEME: &str = "pygments";

/// Table-of-contents options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TocOptions {
    /// Whether to emit a table of contents
    pub enabled: bool,
    /// Heading depth; pandoc's default applies when unset
    pub depth: Option<u32>,
}

/// Flags contributed by the table-of-contents options.
pub fn toc_args(toc: &TocOptions) -> Vec<String> {
    let mut args = Vec::new();
    if toc.enabled {
        args.push("--toc".to_string());
        if let Some(depth) = toc.depth {
            args.push("--toc-depth".to_string());
            args.push(depth.to_string());
        }
    }
    args
}

/// Flags for syntax highlighting theme selection.
///
/// `None` disables highlighting entirely; the special `"default"` token
/// resolves to [`DEFAULT_HIGHLIGHT_THEME`]; any other name is passed
/// through as the style.
pub fn highlight_args(theme: Option<&str>) -> Vec<String> {
    match theme {
        None => vec!["--no-highlight".to_string()],
        Some("default") => vec![
            "--highlight-style".to_string(),
            DEFAULT_HIGHLIGHT_THEME.to_string(),
        ],
        Some(theme) => vec!["--highlight-style".to_string(), theme.to_string()],
    }
}

/// Flags selecting the LaTeX engine for PDF output.
///
/// On Windows the engine name is resolved to an absolute path, because
/// the subprocess there runs with a stripped search path that would not
/// find the engine by name. Elsewhere the name passes through.
pub fn latex_engine_args(engine: &str) -> Vec<String> {
    let resolved = resolve_latex_engine(engine);
    vec![
        "--pdf-engine".to_string(),
        normalize_separators(&resolved),
    ]
}

#[cfg(windows)]
fn resolve_latex_engine(engine: &str) -> PathBuf {
    which::which(engine).unwrap_or_else(|_| PathBuf::from(engine))
}

#[cfg(not(windows))]
fn resolve_latex_engine(engine: &str) -> PathBuf {
    PathBuf::from(engine)
}

/// Math rendering mode for HTML output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MathjaxMode {
    /// No math rendering support
    Disabled,
    /// CDN-hosted MathJax
    #[default]
    Default,
    /// A locally vendored MathJax copy rooted at the given directory
    Local(PathBuf),
}

impl MathjaxMode {
    /// The local mode rooted at the vendored copy named by
    /// `RMDRENDER_MATHJAX`, when that override is set.
    pub fn local_from_env() -> Option<Self> {
        std::env::var_os(MATHJAX_DIR_ENV).map(|dir| Self::Local(PathBuf::from(dir)))
    }
}

/// Flags wiring up MathJax.
///
/// The local mode is incompatible with self-contained output: the lazily
/// injected script tag cannot be inlined, so the combination is rejected
/// before any subprocess is launched. Local copies are referenced
/// relative to the output directory when they live under it.
pub fn mathjax_args(
    mode: &MathjaxMode,
    self_contained: bool,
    output_dir: &Path,
) -> Result<Vec<String>> {
    match mode {
        MathjaxMode::Disabled => Ok(Vec::new()),
        MathjaxMode::Default => Ok(vec![format!("--mathjax={}", MATHJAX_CDN_URL)]),
        MathjaxMode::Local(dir) => {
            if self_contained {
                return Err(RenderError::incompatible(
                    "local MathJax cannot be combined with self-contained output",
                ));
            }
            let root = dir.join("MathJax.js");
            let url = match relative_to(output_dir, &root) {
                Some(rel) => normalize_separators(&rel),
                None => normalize_separators(&root),
            };
            Ok(vec![format!(
                "--mathjax={}?config=TeX-AMS-MML_HTMLorMML",
                url
            )])
        }
    }
}

/// Include files spliced around the document body.
#[derive(Debug, Clone, Default)]
pub struct Includes {
    /// Files injected into the head
    pub in_header: Vec<PathBuf>,
    /// Files injected before the body
    pub before_body: Vec<PathBuf>,
    /// Files injected after the body
    pub after_body: Vec<PathBuf>,
}

impl Includes {
    /// Whether no includes are present.
    pub fn is_empty(&self) -> bool {
        self.in_header.is_empty() && self.before_body.is_empty() && self.after_body.is_empty()
    }

    /// Flags contributed by the include files.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (flag, files) in [
            ("--include-in-header", &self.in_header),
            ("--include-before-body", &self.before_body),
            ("--include-after-body", &self.after_body),
        ] {
            for file in files {
                args.push(flag.to_string());
                args.push(file.to_string_lossy().into_owned());
            }
        }
        args
    }
}
