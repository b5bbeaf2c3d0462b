/*
 * format.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Output format definitions.
 */

//! Output format definitions.
//!
//! An [`OutputFormat`] bundles everything a render needs to drive
//! pandoc for one target: reader/writer names, the output extension,
//! structured options (toc, highlighting, math) and the template. The
//! presets mirror the common document formats; everything is plain data
//! handed to pandoc, there is no template engine here.

use std::path::Path;

use crate::error::Result;
use crate::pandoc::args::{self, MathjaxMode, TocOptions};

/// The default HTML template, embedded at compile time.
///
/// Placeholders (`$title$`, `$for(author)$`, `$date$`,
/// `$header-includes$`, `$highlighting-css$`, `$include-before$`,
/// `$include-after$`, the MathJax bootstrap block) are substituted by
/// pandoc via `--template`.
pub const DEFAULT_HTML_TEMPLATE: &str = include_str!("../resources/default.html");

/// The pandoc markdown dialect read by default.
///
/// Matches what the knitting front end emits: pipe tables, raw HTML,
/// tex math, and autolinked bare URIs.
pub const DEFAULT_FROM_FORMAT: &str =
    "markdown+autolink_bare_uris+tex_math_single_backslash";

/// A complete output format specification.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    /// Format name, used for reporting
    pub name: &'static str,

    /// Pandoc writer (`--to`)
    pub to: String,

    /// Pandoc reader (`--from`)
    pub from: String,

    /// Output file extension
    pub output_extension: &'static str,

    /// Table-of-contents options
    pub toc: TocOptions,

    /// Highlighting theme; `None` disables highlighting
    pub highlight: Option<String>,

    /// Math rendering mode (HTML formats only)
    pub mathjax: MathjaxMode,

    /// Whether output embeds all assets into a single file
    pub self_contained: bool,

    /// Whether this format carries HTML dependencies
    pub html_dependencies: bool,

    /// Extra writer-specific flags appended verbatim
    pub extra_args: Vec<String>,
}

impl OutputFormat {
    /// Standalone HTML document with highlighting and CDN MathJax.
    pub fn html_document() -> Self {
        Self {
            name: "html_document",
            to: "html".to_string(),
            from: DEFAULT_FROM_FORMAT.to_string(),
            output_extension: "html",
            toc: TocOptions::default(),
            highlight: Some("default".to_string()),
            mathjax: MathjaxMode::Default,
            self_contained: false,
            html_dependencies: true,
            extra_args: vec!["--standalone".to_string()],
        }
    }

    /// GitHub-flavored markdown, no HTML machinery.
    pub fn github_document() -> Self {
        Self {
            name: "github_document",
            to: "gfm".to_string(),
            from: DEFAULT_FROM_FORMAT.to_string(),
            output_extension: "md",
            toc: TocOptions::default(),
            highlight: None,
            mathjax: MathjaxMode::Disabled,
            self_contained: false,
            html_dependencies: false,
            extra_args: Vec::new(),
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "html" | "html_document" => Some(Self::html_document()),
            "gfm" | "github_document" => Some(Self::github_document()),
            _ => None,
        }
    }

    /// Whether this is an HTML-based format.
    pub fn is_html(&self) -> bool {
        self.to == "html"
    }

    /// The structured-option flags for this format.
    ///
    /// Fails before any subprocess launch when options are incompatible
    /// (self-contained output with local MathJax).
    pub fn pandoc_args(&self, output_dir: &Path) -> Result<Vec<String>> {
        let mut flags = Vec::new();
        flags.extend(args::toc_args(&self.toc));
        flags.extend(args::highlight_args(self.highlight.as_deref()));
        if self.is_html() {
            flags.extend(args::mathjax_args(
                &self.mathjax,
                self.self_contained,
                output_dir,
            )?);
            if self.self_contained {
                // Pandoc inlines what it knows about; our own pass picks
                // up dependency assets afterwards.
                flags.push("--embed-resources".to_string());
            }
        }
        flags.extend(self.extra_args.iter().cloned());
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use std::path::PathBuf;

    #[test]
    fn test_template_has_expected_placeholders() {
        for placeholder in [
            "$title$",
            "$for(author)$",
            "$date$",
            "$header-includes$",
            "$highlighting-css$",
            "$include-before$",
            "$include-after$",
            "$mathjax-url$",
        ] {
            assert!(
                DEFAULT_HTML_TEMPLATE.contains(placeholder),
                "template missing {}",
                placeholder
            );
        }
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(OutputFormat::preset("html").unwrap().name, "html_document");
        assert_eq!(
            OutputFormat::preset("github_document").unwrap().name,
            "github_document"
        );
        assert!(OutputFormat::preset("docx").is_none());
    }

    #[test]
    fn test_html_document_args() {
        let format = OutputFormat::html_document();
        let flags = format.pandoc_args(Path::new("/out")).unwrap();
        assert!(flags.contains(&"--standalone".to_string()));
        assert!(flags.iter().any(|f| f.starts_with("--mathjax=")));
        assert!(flags.contains(&"--highlight-style".to_string()));
    }

    #[test]
    fn test_self_contained_local_mathjax_rejected_early() {
        let format = OutputFormat {
            self_contained: true,
            mathjax: MathjaxMode::Local(PathBuf::from("/vendored")),
            ..OutputFormat::html_document()
        };
        let err = format.pandoc_args(Path::new("/out")).unwrap_err();
        assert!(matches!(err, RenderError::IncompatibleOptions(_)));
    }

    #[test]
    fn test_github_document_plain() {
        let format = OutputFormat::github_document();
        let flags = format.pandoc_args(Path::new("/out")).unwrap();
        assert_eq!(flags, vec!["--no-highlight"]);
        assert!(!format.is_html());
    }
}
