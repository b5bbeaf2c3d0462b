/*
 * selfcontained.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Self-contained output: inlining referenced assets as data URIs.
 */

//! Self-contained output.
//!
//! In self-contained mode every local asset referenced from the output
//! (scripts, stylesheets, images, fonts) is inlined as a base64 `data:`
//! URI, producing a single file with no on-disk companions. External
//! URLs and fragments pass through untouched.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::error::Result;
use crate::postprocess::rewrite_local_refs;

/// MIME type for an asset, by extension.
///
/// Unknown extensions fall back to `application/octet-stream`, which
/// browsers treat as opaque bytes.
fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "js" => "application/javascript",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "html" => "text/html",
        _ => "application/octet-stream",
    }
}

/// Inline every referenced local asset as a base64 `data:` URI.
///
/// Relative references resolve against `base_dir` (the output
/// directory). References whose files are missing are left as-is —
/// dependency validation has already run by this point, so anything
/// still dangling was external to the render.
pub fn inline_local_assets(content: &str, base_dir: &Path) -> Result<String> {
    rewrite_local_refs(content, |reference| {
        let source = if Path::new(reference).is_absolute() {
            Path::new(reference).to_path_buf()
        } else {
            base_dir.join(reference)
        };
        if !source.is_file() {
            return Ok(None);
        }

        let bytes = std::fs::read(&source)?;
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        debug!(asset = %source.display(), bytes = bytes.len(), "inlining asset");

        Ok(Some(format!(
            "data:{};base64,{}",
            mime_for_extension(ext),
            BASE64.encode(&bytes)
        )))
    })
}
