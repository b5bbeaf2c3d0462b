/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render orchestration: one document through the full pipeline.
 */

//! Render orchestration.
//!
//! [`render`] walks one document through the render stages:
//!
//! ```text
//! RAW → CHUNKS_EXTRACTED → CONVERTED → CHUNKS_RESTORED → PATHS_REWRITTEN → FINAL
//! ```
//!
//! Every stage is a pure transform over the document text except the
//! conversion, which shells out to pandoc. Dependencies attached by the
//! knitting front end travel in a `*.deps.json` sidecar next to the
//! input; their head markup reaches pandoc as a header include.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dependency::{self, DependencyKind, DependencyNode};
use crate::error::{RenderError, Result};
use crate::format::{DEFAULT_HTML_TEMPLATE, OutputFormat};
use crate::pandoc::{self, ConversionRequest, Includes};
use crate::postprocess::{
    PreservedChunks, copy_resources, extract_preserved_chunks, restore_preserved_chunks,
    rewrite_relative_paths,
};
use crate::selfcontained::inline_local_assets;

/// Options for rendering a single document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Target output format
    pub format: OutputFormat,

    /// Output path; defaults to the input with the format's extension
    pub output: Option<PathBuf>,

    /// Library directory for dependency assets; defaults to
    /// `<stem>_files` next to the output
    pub lib_dir: Option<PathBuf>,

    /// Copy referenced local assets next to the output
    pub copy_resources: bool,

    /// Run the citation-processing filter
    pub citeproc: bool,

    /// Explicit working directory for the conversion
    pub working_dir: Option<PathBuf>,
}

impl RenderOptions {
    /// Options for a format with everything else defaulted.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            output: None,
            lib_dir: None,
            copy_resources: false,
            citeproc: false,
            working_dir: None,
        }
    }
}

/// Result of a render operation.
#[derive(Debug)]
pub struct RenderResult {
    /// Primary output file
    pub output_file: PathBuf,

    /// Additional files produced (dependency library, copied resources)
    pub supporting_files: Vec<PathBuf>,
}

/// Render one document through the full pipeline.
pub fn render(input: &Path, options: &RenderOptions) -> Result<RenderResult> {
    let source = std::fs::read_to_string(input)?;
    let input_dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let output_file = resolve_output_path(input, options)?;
    let output_dir = output_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir)?;

    let mut supporting_files = Vec::new();

    // RAW → CHUNKS_EXTRACTED
    let (extracted, chunks) = extract_preserved_chunks(&source);
    debug!(chunks = chunks.len(), "extracted preserved chunks");

    // Dependency head markup, via a header-include file.
    let head_markup = dependency_head_markup(input, options, &output_dir, &mut supporting_files)?;

    // Scratch files must outlive the conversion.
    let mut includes = Includes::default();
    let _head_file = match head_markup {
        Some(markup) => {
            let file = scratch_file(&output_dir, ".head-", ".html", &markup)?;
            includes.in_header.push(file.path().to_path_buf());
            Some(file)
        }
        None => None,
    };
    let template_file = if options.format.is_html() {
        Some(scratch_file(&output_dir, ".template-", ".html", DEFAULT_HTML_TEMPLATE)?)
    } else {
        None
    };
    let intermediate = if chunks.is_empty() {
        None
    } else {
        let mut file = tempfile::Builder::new()
            .prefix(".intermediate-")
            .suffix(".md")
            .tempfile_in(&input_dir)?;
        file.write_all(extracted.as_bytes())?;
        Some(file)
    };

    let conversion_input = match &intermediate {
        Some(file) => file.path().to_path_buf(),
        None => input.to_path_buf(),
    };

    // CHUNKS_EXTRACTED → CONVERTED
    let mut extra_args = options.format.pandoc_args(&output_dir)?;
    extra_args.extend(includes.to_args());
    if let Some(ref template) = template_file {
        extra_args.push("--template".to_string());
        extra_args.push(template.path().to_string_lossy().into_owned());
    }

    let request = ConversionRequest {
        inputs: vec![conversion_input],
        from: Some(options.format.from.clone()),
        to: Some(options.format.to.clone()),
        output: Some(std::path::absolute(&output_file)?),
        citeproc: options.citeproc,
        extra_args,
        working_dir: Some(
            options
                .working_dir
                .clone()
                .unwrap_or_else(|| input_dir.clone()),
        ),
    };
    pandoc::convert(&request)?;
    info!(output = %output_file.display(), "conversion complete");

    // CONVERTED → CHUNKS_RESTORED → PATHS_REWRITTEN → FINAL
    let converted = std::fs::read_to_string(&output_file)?;
    let finalized = finalize_output(
        &converted,
        &chunks,
        options,
        &input_dir,
        &output_dir,
        &mut supporting_files,
    )?;
    if finalized != converted {
        std::fs::write(&output_file, finalized)?;
    }

    Ok(RenderResult {
        output_file,
        supporting_files,
    })
}

/// The pure post-conversion transforms: chunk restoration, then path
/// rewriting or self-contained inlining.
fn finalize_output(
    converted: &str,
    chunks: &PreservedChunks,
    options: &RenderOptions,
    input_dir: &Path,
    output_dir: &Path,
    supporting_files: &mut Vec<PathBuf>,
) -> Result<String> {
    let restored = restore_preserved_chunks(converted, chunks);

    if options.format.self_contained {
        return inline_local_assets(&restored, output_dir);
    }

    let rewritten = rewrite_relative_paths(&restored, output_dir);
    if options.copy_resources {
        // Relative references in the converted output resolve against
        // the input's directory, where the front end left the assets.
        let (copied_content, copied) = copy_resources(&rewritten, input_dir, output_dir)?;
        supporting_files.extend(copied);
        return Ok(copied_content);
    }
    Ok(rewritten)
}

/// Resolve the output path: explicit, or input with the format extension.
fn resolve_output_path(input: &Path, options: &RenderOptions) -> Result<PathBuf> {
    if let Some(ref output) = options.output {
        return Ok(output.clone());
    }
    if input.file_stem().is_none() {
        return Err(RenderError::other(format!(
            "Cannot derive an output name from {}",
            input.display()
        )));
    }
    Ok(input.with_extension(options.format.output_extension))
}

/// Head markup for the input's dependency sidecar, when one exists and
/// the format carries HTML dependencies.
///
/// Self-contained output references dependency assets at their source
/// locations (the inlining pass embeds them afterwards); otherwise the
/// assets are copied into the library directory.
fn dependency_head_markup(
    input: &Path,
    options: &RenderOptions,
    output_dir: &Path,
    supporting_files: &mut Vec<PathBuf>,
) -> Result<Option<String>> {
    if !options.format.html_dependencies {
        return Ok(None);
    }

    let sidecar = input.with_extension("deps.json");
    if !sidecar.is_file() {
        return Ok(None);
    }

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&sidecar)?)?;
    let tree = DependencyNode::from_meta(raw)?;
    if !dependency::has_dependencies_of_kind(&tree, DependencyKind::Html) {
        return Ok(None);
    }

    let deps = dependency::resolve(&tree)?;
    debug!(count = deps.len(), "resolved HTML dependencies");

    let lib_dir = if options.format.self_contained {
        None
    } else {
        let dir = options.lib_dir.clone().unwrap_or_else(|| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            output_dir.join(format!("{}_files", stem))
        });
        std::fs::create_dir_all(&dir)?;
        supporting_files.push(dir.clone());
        Some(dir)
    };

    let markup = dependency::emit_head_markup(&deps, lib_dir.as_deref(), output_dir)?;
    Ok((!markup.is_empty()).then_some(markup))
}

/// Write scratch content to a named temporary file in `dir`.
///
/// The file is deleted when the handle drops, so callers hold it until
/// the conversion has run.
fn scratch_file(
    dir: &Path,
    prefix: &str,
    suffix: &str,
    content: &str,
) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}
