/*
 * paths.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Path manipulation helpers shared across the workspace.
 */

//! Path manipulation helpers.
//!
//! Rendering juggles three path spaces: the input document's directory,
//! the output directory, and the shared dependency library. The helpers
//! here convert between them without touching the filesystem.

use std::path::{Component, Path, PathBuf};

/// Normalize path separators to forward slashes.
///
/// Output references (HTML attributes, template variables) always use
/// forward slashes, regardless of platform.
pub fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Compute `target` relative to `base`, if `target` lives under `base`.
///
/// This is a purely lexical computation; neither path needs to exist.
/// Both paths are normalized (`.` and `..` components resolved) before
/// the prefix check.
pub fn relative_to(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = lexical_normalize(base);
    let target = lexical_normalize(target);
    target.strip_prefix(&base).ok().map(Path::to_path_buf)
}

/// Resolve `.` and `..` components without consulting the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// The common parent directory of a set of file paths.
///
/// Returns `None` when the paths do not all share a single parent
/// directory (callers treat that as an ambiguity the user must resolve
/// by supplying an explicit working directory), or when `paths` is empty.
pub fn common_parent(paths: &[PathBuf]) -> Option<PathBuf> {
    let first = paths.first()?.parent()?;
    for path in &paths[1..] {
        if path.parent() != Some(first) {
            return None;
        }
    }
    Some(first.to_path_buf())
}

/// Quote an argument for display in a logged command line.
///
/// Arguments are always passed to the subprocess as an argv vector, so
/// quoting never affects execution. It exists so that debug output is
/// copy-pasteable into a shell.
pub fn shell_arg_quote(arg: &str) -> String {
    const SHELL_SIGNIFICANT: &[char] = &[
        ' ', '\t', '"', '\'', '$', '&', '|', ';', '<', '>', '(', ')', '*', '?', '[', ']', '#',
        '~', '`', '\\', '!', '{', '}',
    ];

    if !arg.is_empty() && !arg.contains(SHELL_SIGNIFICANT) {
        return arg.to_string();
    }

    // Single-quote, with embedded single quotes spliced out POSIX-style.
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Expand a leading `~/` against the `HOME` environment variable.
///
/// Paths without a tilde prefix, and environments without `HOME`, pass
/// through unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    let Some(rest) = s.strip_prefix("~/") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_separators() {
        assert_eq!(
            normalize_separators(Path::new(r"lib\jquery\jquery.js")),
            "lib/jquery/jquery.js"
        );
        assert_eq!(normalize_separators(Path::new("a/b.css")), "a/b.css");
    }

    #[test]
    fn test_relative_to_under_base() {
        let rel = relative_to(Path::new("/out"), Path::new("/out/lib/a.js"));
        assert_eq!(rel, Some(PathBuf::from("lib/a.js")));
    }

    #[test]
    fn test_relative_to_outside_base() {
        assert_eq!(relative_to(Path::new("/out"), Path::new("/elsewhere/a.js")), None);
    }

    #[test]
    fn test_relative_to_normalizes_dots() {
        let rel = relative_to(Path::new("/out/./"), Path::new("/out/sub/../lib/a.js"));
        assert_eq!(rel, Some(PathBuf::from("lib/a.js")));
    }

    #[test]
    fn test_common_parent_same_dir() {
        let paths = vec![PathBuf::from("/a/x.md"), PathBuf::from("/a/y.md")];
        assert_eq!(common_parent(&paths), Some(PathBuf::from("/a")));
    }

    #[test]
    fn test_common_parent_spread_dirs() {
        let paths = vec![PathBuf::from("/a/x.md"), PathBuf::from("/b/y.md")];
        assert_eq!(common_parent(&paths), None);
    }

    #[test]
    fn test_common_parent_empty() {
        assert_eq!(common_parent(&[]), None);
    }

    #[test]
    fn test_shell_arg_quote_plain() {
        assert_eq!(shell_arg_quote("--toc"), "--toc");
        assert_eq!(shell_arg_quote("input.md"), "input.md");
    }

    #[test]
    fn test_shell_arg_quote_significant() {
        assert_eq!(shell_arg_quote("my doc.md"), "'my doc.md'");
        assert_eq!(shell_arg_quote("a'b"), r"'a'\''b'");
        assert_eq!(shell_arg_quote(""), "''");
    }

    #[test]
    fn test_expand_home() {
        // SAFETY: test runs single-threaded over this variable.
        unsafe { std::env::set_var("HOME", "/home/user") };
        assert_eq!(
            expand_home(Path::new("~/opt/pandoc")),
            PathBuf::from("/home/user/opt/pandoc")
        );
        assert_eq!(expand_home(Path::new("/abs/path")), PathBuf::from("/abs/path"));
    }
}
