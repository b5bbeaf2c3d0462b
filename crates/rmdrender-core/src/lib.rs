//! Core rendering infrastructure for rmdrender.
//!
//! This crate converts Markdown documents into HTML (and other formats)
//! by orchestrating the external `pandoc` binary: it resolves the HTML
//! dependency metadata attached by the knitting front end, negotiates a
//! pandoc installation, builds the conversion command line, and
//! post-processes the converted output.
//!
//! # Architecture
//!
//! - [`dependency`] — dependency records, tree flattening, deduplication
//!   and head-markup emission
//! - [`pandoc`] — binary discovery ([`PandocLocator`]) and blocking
//!   invocation ([`ConversionRequest`])
//! - [`postprocess`] — preserved-chunk restoration and path rewriting
//! - [`selfcontained`] — base64 asset inlining for single-file output
//! - [`format`] — output format presets and the embedded template
//! - [`render`] — the orchestration walking one document through
//!   `RAW → CHUNKS_EXTRACTED → CONVERTED → CHUNKS_RESTORED →
//!   PATHS_REWRITTEN → FINAL`
//!
//! # Example
//!
//! ```ignore
//! use rmdrender_core::{OutputFormat, RenderOptions, render};
//!
//! let options = RenderOptions::new(OutputFormat::html_document());
//! let result = render("report.md".as_ref(), &options)?;
//! println!("wrote {}", result.output_file.display());
//! ```

pub mod dependency;
pub mod error;
pub mod format;
pub mod pandoc;
pub mod postprocess;
pub mod render;
pub mod selfcontained;

// Re-export commonly used types
pub use dependency::{
    DependencyKind, DependencyNode, HtmlDependency, LatexDependency, emit_head_markup,
    has_dependencies_of_kind, resolve,
};
pub use error::{RenderError, Result};
pub use format::OutputFormat;
pub use pandoc::{ConversionRequest, Includes, MathjaxMode, PandocLocation, PandocLocator, TocOptions, convert};
pub use render::{RenderOptions, RenderResult, render};
