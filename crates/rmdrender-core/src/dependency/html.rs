/*
 * dependency/html.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Head-markup emission and library-directory copying for HTML dependencies.
 */

//! Head-markup emission for resolved dependencies.
//!
//! [`emit_head_markup`] produces the `<head>` fragment for a resolved
//! dependency list: one block of `<meta>`/`<link>`/`<script>` tags per
//! dependency, in resolution order. With a library directory the assets
//! are first copied into `lib_dir/<name>-<version>/` and referenced
//! relative to the output directory; without one they are referenced at
//! their original location.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use rmdrender_util::paths::{normalize_separators, relative_to};

use super::resolve::is_legacy_empty_src;
use super::{HtmlDependency, LatexDependency};
use crate::error::{RenderError, Result};

/// Emit ordered head markup for a resolved dependency list.
///
/// When `lib_dir` is given, every dependency's source directory is copied
/// into it (idempotently: re-copying overwrites with identical content)
/// and references are made relative to `output_dir`. When it is `None`,
/// references point at the original source directories.
pub fn emit_head_markup(
    deps: &[HtmlDependency],
    lib_dir: Option<&Path>,
    output_dir: &Path,
) -> Result<String> {
    let mut markup = String::new();

    for dep in deps {
        // Legacy empty-src entries have no assets of their own to copy or
        // prefix; their references pass through bare.
        let base = if is_legacy_empty_src(dep) {
            None
        } else if let Some(lib) = lib_dir {
            let target = copy_dependency(dep, lib)?;
            reference_base(&target, output_dir)
        } else {
            Some(normalize_separators(&dep.src_dir))
        };

        for meta in &dep.meta {
            markup.push_str(&format!(
                "<meta name=\"{}\" content=\"{}\" />\n",
                escape_attr(&meta.name),
                escape_attr(&meta.content)
            ));
        }

        for stylesheet in &dep.stylesheets {
            markup.push_str(&format!(
                "<link href=\"{}\" rel=\"stylesheet\" />\n",
                escape_attr(&join_ref(base.as_deref(), stylesheet))
            ));
        }

        for script in &dep.scripts {
            markup.push_str(&format!(
                "<script src=\"{}\"></script>\n",
                escape_attr(&join_ref(base.as_deref(), script))
            ));
        }

        if let Some(ref head) = dep.head_content {
            markup.push_str(head);
            if !head.ends_with('\n') {
                markup.push('\n');
            }
        }
    }

    Ok(markup)
}

/// Copy a dependency's assets into `lib_dir/<name>-<version>/`.
///
/// Returns the target directory. Copying is idempotent: destination
/// directories may already exist and files are overwritten in place.
fn copy_dependency(dep: &HtmlDependency, lib_dir: &Path) -> Result<PathBuf> {
    let target = lib_dir.join(format!("{}-{}", dep.name, dep.version));
    debug!(name = %dep.name, target = %target.display(), "copying dependency assets");

    for entry in WalkDir::new(&dep.src_dir) {
        let entry = entry.map_err(|e| {
            RenderError::other(format!(
                "Failed to walk dependency source {}: {}",
                dep.src_dir.display(),
                e
            ))
        })?;

        let rel = entry
            .path()
            .strip_prefix(&dep.src_dir)
            .map_err(|e| RenderError::other(format!("Dependency walk escaped source dir: {}", e)))?;
        let dest = target.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &dest)?;
        }
    }

    Ok(target)
}

/// The href/src base for a copied dependency directory.
///
/// Relative to the output directory when the library lives under it (the
/// normal layout); otherwise the normalized absolute path.
fn reference_base(target: &Path, output_dir: &Path) -> Option<String> {
    Some(match relative_to(output_dir, target) {
        Some(rel) => normalize_separators(&rel),
        None => normalize_separators(target),
    })
}

fn join_ref(base: Option<&str>, file: &str) -> String {
    match base {
        Some(base) => format!("{}/{}", base, file),
        None => file.to_string(),
    }
}

/// Minimal attribute-value escaping for generated tags.
fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}

/// Emit LaTeX preamble lines for a set of LaTeX dependencies.
///
/// One `\usepackage` line per dependency (options bracketed when
/// present), followed by any raw extra lines.
pub fn latex_dependencies_as_string(deps: &[LatexDependency]) -> String {
    let mut out = String::new();
    for dep in deps {
        if dep.options.is_empty() {
            out.push_str(&format!("\\usepackage{{{}}}\n", dep.name));
        } else {
            out.push_str(&format!(
                "\\usepackage[{}]{{{}}}\n",
                dep.options.join(","),
                dep.name
            ));
        }
        for line in &dep.extra_lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture_dep(temp: &TempDir) -> HtmlDependency {
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("css")).unwrap();
        fs::write(src.join("widget.js"), "window.widget = 1;\n").unwrap();
        fs::write(src.join("css/widget.css"), ".widget {}\n").unwrap();

        HtmlDependency::new("widget", "1.2.0", &src)
            .with_script("widget.js")
            .with_stylesheet("css/widget.css")
            .with_meta("viewport", "width=device-width")
    }

    #[test]
    fn test_emit_without_lib_dir_uses_source_paths() {
        let temp = TempDir::new().unwrap();
        let dep = fixture_dep(&temp);

        let markup = emit_head_markup(&[dep.clone()], None, temp.path()).unwrap();
        let src = normalize_separators(&dep.src_dir);
        assert!(markup.contains(&format!("<script src=\"{}/widget.js\"></script>", src)));
        assert!(markup.contains(&format!("<link href=\"{}/css/widget.css\" rel=\"stylesheet\" />", src)));
        assert!(markup.contains("<meta name=\"viewport\" content=\"width=device-width\" />"));
    }

    #[test]
    fn test_emit_with_lib_dir_copies_and_relativizes() {
        let temp = TempDir::new().unwrap();
        let dep = fixture_dep(&temp);
        let out_dir = temp.path().join("out");
        let lib_dir = out_dir.join("libs");
        fs::create_dir_all(&lib_dir).unwrap();

        let markup = emit_head_markup(&[dep], Some(&lib_dir), &out_dir).unwrap();

        assert!(out_dir.join("libs/widget-1.2.0/widget.js").exists());
        assert!(out_dir.join("libs/widget-1.2.0/css/widget.css").exists());
        assert!(markup.contains("<script src=\"libs/widget-1.2.0/widget.js\"></script>"));
        assert!(markup.contains("href=\"libs/widget-1.2.0/css/widget.css\""));
    }

    #[test]
    fn test_emit_copy_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dep = fixture_dep(&temp);
        let out_dir = temp.path().join("out");
        let lib_dir = out_dir.join("libs");
        fs::create_dir_all(&lib_dir).unwrap();

        let first = emit_head_markup(std::slice::from_ref(&dep), Some(&lib_dir), &out_dir).unwrap();
        let second = emit_head_markup(&[dep], Some(&lib_dir), &out_dir).unwrap();
        assert_eq!(first, second);

        let copied = fs::read_to_string(out_dir.join("libs/widget-1.2.0/widget.js")).unwrap();
        assert_eq!(copied, "window.widget = 1;\n");
    }

    #[test]
    fn test_emit_preserves_dependency_order() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("s");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.js"), "").unwrap();
        fs::write(src.join("b.js"), "").unwrap();

        let first = HtmlDependency::new("first", "1.0", &src).with_script("a.js");
        let second = HtmlDependency::new("second", "1.0", &src).with_script("b.js");

        let markup = emit_head_markup(&[first, second], None, temp.path()).unwrap();
        let a = markup.find("a.js").unwrap();
        let b = markup.find("b.js").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_emit_head_content_appended() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("s");
        fs::create_dir_all(&src).unwrap();
        let dep = HtmlDependency::new("raw", "0.1", &src)
            .with_head_content("<style>body { margin: 0 }</style>");

        let markup = emit_head_markup(&[dep], None, temp.path()).unwrap();
        assert!(markup.contains("<style>body { margin: 0 }</style>\n"));
    }

    #[test]
    fn test_latex_dependencies_as_string() {
        let deps = vec![
            LatexDependency {
                name: "longtable".to_string(),
                options: vec![],
                extra_lines: vec![],
            },
            LatexDependency {
                name: "geometry".to_string(),
                options: vec!["margin=1in".to_string()],
                extra_lines: vec!["\\geometry{a4paper}".to_string()],
            },
        ];

        let out = latex_dependencies_as_string(&deps);
        assert_eq!(
            out,
            "\\usepackage{longtable}\n\\usepackage[margin=1in]{geometry}\n\\geometry{a4paper}\n"
        );
    }
}
