/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation.
 */

//! Render command implementation.
//!
//! Maps CLI flags onto a core [`RenderOptions`], runs the render, and
//! reports the produced files.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

use rmdrender_core::{MathjaxMode, OutputFormat, RenderOptions, TocOptions, render};

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    pub input: String,
    pub to: String,
    pub output: Option<String>,
    pub lib_dir: Option<String>,
    pub self_contained: bool,
    pub copy_resources: bool,
    pub citeproc: bool,
    pub toc: bool,
    pub toc_depth: Option<u32>,
    pub highlight: String,
    pub mathjax: String,
    pub working_dir: Option<String>,
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<()> {
    let input = PathBuf::from(&args.input);
    if !input.is_file() {
        bail!("Input file does not exist: {}", input.display());
    }

    let format = build_format(&args)?;
    let options = RenderOptions {
        format,
        output: args.output.map(PathBuf::from),
        lib_dir: args.lib_dir.map(PathBuf::from),
        copy_resources: args.copy_resources,
        citeproc: args.citeproc,
        working_dir: args.working_dir.map(PathBuf::from),
    };

    let result = render(&input, &options)
        .with_context(|| format!("Failed to render {}", input.display()))?;

    info!(output = %result.output_file.display(), "render complete");
    println!("Output created: {}", result.output_file.display());
    for supporting in &result.supporting_files {
        println!("  supporting: {}", supporting.display());
    }
    Ok(())
}

/// Resolve CLI flags to an output format.
fn build_format(args: &RenderArgs) -> Result<OutputFormat> {
    let Some(mut format) = OutputFormat::preset(&args.to) else {
        bail!(
            "Unknown format '{}'. Available formats: html, gfm.",
            args.to
        );
    };

    format.toc = TocOptions {
        enabled: args.toc,
        depth: args.toc_depth,
    };

    format.highlight = match args.highlight.as_str() {
        "none" => None,
        theme => Some(theme.to_string()),
    };

    format.mathjax = match args.mathjax.as_str() {
        "none" => MathjaxMode::Disabled,
        "default" => MathjaxMode::Default,
        "local" => MathjaxMode::local_from_env().ok_or_else(|| {
            anyhow::anyhow!(
                "--mathjax local requires the {} environment variable",
                rmdrender_core::pandoc::args::MATHJAX_DIR_ENV
            )
        })?,
        other => bail!("Unknown mathjax mode '{}'. Use default, local, or none.", other),
    };

    format.self_contained = args.self_contained;
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> RenderArgs {
        RenderArgs {
            input: "doc.md".to_string(),
            to: "html".to_string(),
            output: None,
            lib_dir: None,
            self_contained: false,
            copy_resources: false,
            citeproc: false,
            toc: false,
            toc_depth: None,
            highlight: "default".to_string(),
            mathjax: "default".to_string(),
            working_dir: None,
        }
    }

    #[test]
    fn test_build_format_defaults() {
        let format = build_format(&base_args()).unwrap();
        assert_eq!(format.name, "html_document");
        assert!(!format.self_contained);
        assert_eq!(format.mathjax, MathjaxMode::Default);
    }

    #[test]
    fn test_build_format_disables_highlight_and_math() {
        let mut args = base_args();
        args.highlight = "none".to_string();
        args.mathjax = "none".to_string();

        let format = build_format(&args).unwrap();
        assert_eq!(format.highlight, None);
        assert_eq!(format.mathjax, MathjaxMode::Disabled);
    }

    #[test]
    fn test_build_format_rejects_unknown() {
        let mut args = base_args();
        args.to = "docx".to_string();
        assert!(build_format(&args).is_err());

        let mut args = base_args();
        args.mathjax = "sometimes".to_string();
        assert!(build_format(&args).is_err());
    }
}
