/*
 * pandoc/convert.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Blocking pandoc invocation.
 */

//! Blocking pandoc invocation.
//!
//! [`convert`] resolves the working directory, builds the argument
//! vector, sanitizes the child environment and runs pandoc to
//! completion. There is no timeout, cancellation or streaming: the call
//! either runs to completion or fails before launch.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use rmdrender_util::paths::{common_parent, shell_arg_quote};

use super::locate::{PandocLocation, PandocLocator};
use crate::error::{RenderError, Result};

/// Runtime stack size passed to pandoc's Haskell RTS.
///
/// Deeply nested documents overflow the default stack; these flags must
/// precede every other argument.
const RTS_ARGS: &[&str] = &["+RTS", "-K512m", "-RTS"];

/// One pandoc invocation, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Input files, in pandoc's concatenation order
    pub inputs: Vec<PathBuf>,

    /// Source format (`--from`); pandoc sniffs the input when unset
    pub from: Option<String>,

    /// Target format (`--to`); pandoc infers from the output when unset
    pub to: Option<String>,

    /// Output file (`--output`); stdout when unset
    pub output: Option<PathBuf>,

    /// Whether to run the citation-processing filter
    pub citeproc: bool,

    /// Caller-supplied flags, appended after the structured ones
    pub extra_args: Vec<String>,

    /// Explicit working directory; defaults to the inputs' common parent
    pub working_dir: Option<PathBuf>,
}

impl ConversionRequest {
    /// A request converting a single input file.
    pub fn single(input: impl Into<PathBuf>) -> Self {
        Self {
            inputs: vec![input.into()],
            ..Default::default()
        }
    }
}

/// Run a conversion with the process-shared locator.
pub fn convert(request: &ConversionRequest) -> Result<Option<PathBuf>> {
    convert_with(PandocLocator::global(), request)
}

/// Run a conversion with an explicit locator.
///
/// Returns the resolved output path, or `None` for stdout output. A
/// nonzero exit status maps to [`RenderError::Conversion`] carrying the
/// exit code and captured stderr.
pub fn convert_with(
    locator: &PandocLocator,
    request: &ConversionRequest,
) -> Result<Option<PathBuf>> {
    let location = locator.require_available(None)?;
    let working_dir = resolve_working_dir(request)?;
    let args = build_args(request);

    debug!(
        cwd = %working_dir.display(),
        command = %display_command(&location, &args),
        "running pandoc"
    );

    let mut cmd = Command::new(&location.binary);
    cmd.args(&args).current_dir(&working_dir);
    sanitize_env(&mut cmd);

    let output = cmd.output().map_err(|e| {
        RenderError::other(format!(
            "Failed to launch pandoc ({}): {}",
            location.binary.display(),
            e
        ))
    })?;

    if !output.status.success() {
        return Err(RenderError::Conversion {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(request.output.as_ref().map(|out| {
        if out.is_absolute() {
            out.clone()
        } else {
            working_dir.join(out)
        }
    }))
}

/// The working directory for an invocation.
///
/// Explicit when given; otherwise the common parent of the inputs.
/// Inputs spanning multiple directories without an explicit directory
/// are ambiguous and rejected.
fn resolve_working_dir(request: &ConversionRequest) -> Result<PathBuf> {
    if let Some(ref dir) = request.working_dir {
        return Ok(dir.clone());
    }

    common_parent(&request.inputs).ok_or_else(|| {
        let mut dirs: Vec<String> = request
            .inputs
            .iter()
            .filter_map(|p| p.parent())
            .map(|d| d.display().to_string())
            .collect();
        dirs.dedup();
        RenderError::AmbiguousInput {
            dirs: dirs.join(", "),
        }
    })
}

/// Build the full argument vector for a request.
fn build_args(request: &ConversionRequest) -> Vec<String> {
    let mut args: Vec<String> = RTS_ARGS.iter().map(|s| s.to_string()).collect();

    for input in &request.inputs {
        args.push(input.to_string_lossy().into_owned());
    }

    if let Some(ref to) = request.to {
        args.push("--to".to_string());
        args.push(to.clone());
    }
    if let Some(ref from) = request.from {
        args.push("--from".to_string());
        args.push(from.clone());
    }
    if let Some(ref output) = request.output {
        args.push("--output".to_string());
        args.push(output.to_string_lossy().into_owned());
    }
    if request.citeproc {
        args.push("--citeproc".to_string());
    }

    args.extend(request.extra_args.iter().cloned());
    args
}

/// Sanitize the child environment.
///
/// On macOS a missing `LC_ALL` is known to hang the converter on some
/// inputs; a UTF-8 locale is injected for the child only, so the parent
/// environment is never mutated.
fn sanitize_env(cmd: &mut Command) {
    #[cfg(target_os = "macos")]
    if std::env::var_os("LC_ALL").is_none() {
        cmd.env("LC_ALL", "en_US.UTF-8");
    }
    #[cfg(not(target_os = "macos"))]
    let _ = cmd;
}

/// The command line in copy-pasteable, shell-quoted form, for logs.
fn display_command(location: &PandocLocation, args: &[String]) -> String {
    let mut parts = vec![shell_arg_quote(&location.binary.to_string_lossy())];
    parts.extend(args.iter().map(|a| shell_arg_quote(a)));
    parts.join(" ")
}
