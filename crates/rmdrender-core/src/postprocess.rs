/*
 * postprocess.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Output post-processing: preserved chunks and path rewriting.
 */

//! Output post-processing.
//!
//! Two independent transforms run over converted output, idempotent and
//! order-independent with respect to each other:
//!
//! - **Preserved chunks** — spans fenced by preserve markers are swapped
//!   for opaque placeholder tokens before conversion and restored
//!   verbatim afterwards, protecting raw content from the converter.
//! - **Path rewriting** — absolute asset references are rewritten
//!   relative to the output directory; already-relative references pass
//!   through untouched. A copy-resources mode additionally copies each
//!   referenced local asset next to the output.
//!
//! Per render the document moves through
//! `RAW → CHUNKS_EXTRACTED → CONVERTED → CHUNKS_RESTORED →
//! PATHS_REWRITTEN → FINAL`; every stage except the conversion itself is
//! a pure transform over the document text.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use rmdrender_util::paths::{normalize_separators, relative_to};

use crate::error::{RenderError, Result};

/// Marker opening a preserved span.
pub const PRESERVE_BEGIN: &str = "<!--html_preserve-->";
/// Marker closing a preserved span.
pub const PRESERVE_END: &str = "<!--/html_preserve-->";

/// Placeholder-to-content mapping produced by extraction.
#[derive(Debug, Clone, Default)]
pub struct PreservedChunks {
    chunks: Vec<(String, String)>,
}

impl PreservedChunks {
    /// Whether any chunks were extracted.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of extracted chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// Replace preserve-fenced spans with opaque placeholder tokens.
///
/// Nested markers are honored: the outermost span wins and is stored
/// whole, markers included, so that restoration reproduces the input
/// exactly. Tokens are plain alphanumeric words the converter passes
/// through unchanged.
pub fn extract_preserved_chunks(doc: &str) -> (String, PreservedChunks) {
    let mut out = String::with_capacity(doc.len());
    let mut chunks = Vec::new();
    let mut rest = doc;

    while let Some(begin) = rest.find(PRESERVE_BEGIN) {
        let Some(span_len) = outermost_span_len(&rest[begin..]) else {
            // Unbalanced marker: leave the tail untouched.
            break;
        };

        out.push_str(&rest[..begin]);
        let span = &rest[begin..begin + span_len];
        let token = placeholder_token(chunks.len(), span);
        out.push_str(&token);
        chunks.push((token, span.to_string()));
        rest = &rest[begin + span_len..];
    }

    out.push_str(rest);
    (out, PreservedChunks { chunks })
}

/// Length of the outermost preserved span starting at the beginning of
/// `s`, markers included; `None` when the markers are unbalanced.
fn outermost_span_len(s: &str) -> Option<usize> {
    debug_assert!(s.starts_with(PRESERVE_BEGIN));
    let mut depth = 0usize;
    let mut pos = 0usize;

    loop {
        let begin = s[pos..].find(PRESERVE_BEGIN);
        let end = s[pos..].find(PRESERVE_END)?;

        match begin {
            Some(b) if b < end => {
                depth += 1;
                pos += b + PRESERVE_BEGIN.len();
            }
            _ => {
                depth -= 1;
                pos += end + PRESERVE_END.len();
                if depth == 0 {
                    return Some(pos);
                }
            }
        }
    }
}

/// A deterministic, collision-free-within-document placeholder.
fn placeholder_token(index: usize, content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    index.hash(&mut hasher);
    content.hash(&mut hasher);
    format!("preserve{:016x}", hasher.finish())
}

/// Replace placeholder tokens with their original content.
///
/// A `<p>` wrapper the converter may have introduced around a lone
/// token is stripped along with the token.
pub fn restore_preserved_chunks(doc: &str, chunks: &PreservedChunks) -> String {
    let mut out = doc.to_string();
    for (token, content) in &chunks.chunks {
        let wrapped = Regex::new(&format!(r"(?i)<p>\s*{}\s*</p>", regex::escape(token)))
            .expect("placeholder pattern is literal");
        if wrapped.is_match(&out) {
            // NoExpand: restored content must never be reinterpreted as
            // capture-group syntax.
            out = wrapped
                .replace_all(&out, regex::NoExpand(content))
                .into_owned();
        }
        out = out.replace(token, content);
    }
    out
}

/// `src`/`href` attribute references in HTML output.
static REF_ATTR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(src|href)\s*=\s*"([^"]*)""#).expect("Invalid reference pattern")
});

/// Whether a reference is a non-file target (URL, fragment, data URI).
fn is_external_ref(reference: &str) -> bool {
    reference.is_empty()
        || reference.starts_with('#')
        || reference.starts_with("data:")
        || reference.starts_with("mailto:")
        || reference.contains("://")
}

/// Apply a fallible rewrite to every local (non-external) reference.
///
/// The callback returns the replacement reference, or `None` to leave
/// the original in place. The first callback error aborts the rewrite.
pub(crate) fn rewrite_local_refs<F>(content: &str, mut f: F) -> Result<String>
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    let mut failure: Option<RenderError> = None;

    let rewritten = REF_ATTR_PATTERN.replace_all(content, |caps: &regex::Captures<'_>| {
        let attr = &caps[1];
        let reference = &caps[2];

        if is_external_ref(reference) || failure.is_some() {
            return caps[0].to_string();
        }

        match f(reference) {
            Ok(Some(new_ref)) => format!("{}=\"{}\"", attr, new_ref),
            Ok(None) => caps[0].to_string(),
            Err(e) => {
                failure = Some(e);
                caps[0].to_string()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(rewritten.into_owned()),
    }
}

/// Rewrite absolute asset references relative to the output directory.
///
/// References that are external or already relative are skipped, which
/// also makes the transform idempotent. Absolute references outside the
/// output directory are left alone; they stay valid as written.
pub fn rewrite_relative_paths(content: &str, output_dir: &Path) -> String {
    REF_ATTR_PATTERN
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let attr = &caps[1];
            let reference = &caps[2];

            if is_external_ref(reference) || !Path::new(reference).is_absolute() {
                return caps[0].to_string();
            }

            match relative_to(output_dir, Path::new(reference)) {
                Some(rel) => format!("{}=\"{}\"", attr, normalize_separators(&rel)),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Copy every referenced local asset next to the output and rewrite the
/// reference to the copy.
///
/// Relative references are resolved against `base_dir` and copied into
/// `output_dir` under the same relative path (the reference text stays
/// unchanged); absolute references are copied flat by file name and
/// rewritten. Returns the rewritten content and the copied files.
pub fn copy_resources(
    content: &str,
    base_dir: &Path,
    output_dir: &Path,
) -> Result<(String, Vec<PathBuf>)> {
    let mut copied: Vec<PathBuf> = Vec::new();
    let mut failure: Option<std::io::Error> = None;

    let rewritten = REF_ATTR_PATTERN.replace_all(content, |caps: &regex::Captures<'_>| {
        let attr = &caps[1];
        let reference = &caps[2];

        if is_external_ref(reference) || failure.is_some() {
            return caps[0].to_string();
        }

        let source = if Path::new(reference).is_absolute() {
            PathBuf::from(reference)
        } else {
            base_dir.join(reference)
        };
        if !source.is_file() {
            return caps[0].to_string();
        }

        let (dest, new_ref) = if Path::new(reference).is_absolute() {
            let name = match source.file_name() {
                Some(name) => name.to_os_string(),
                None => return caps[0].to_string(),
            };
            let dest = output_dir.join(&name);
            (dest, Some(name.to_string_lossy().into_owned()))
        } else {
            (output_dir.join(reference), None)
        };

        if dest != source {
            if let Some(parent) = dest.parent()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                failure = Some(e);
                return caps[0].to_string();
            }
            if let Err(e) = std::fs::copy(&source, &dest) {
                failure = Some(e);
                return caps[0].to_string();
            }
            debug!(from = %source.display(), to = %dest.display(), "copied resource");
            copied.push(dest);
        }

        match new_ref {
            Some(new_ref) => format!("{}=\"{}\"", attr, new_ref),
            None => caps[0].to_string(),
        }
    });

    match failure {
        Some(e) => Err(e.into()),
        None => Ok((rewritten.into_owned(), copied)),
    }
}
