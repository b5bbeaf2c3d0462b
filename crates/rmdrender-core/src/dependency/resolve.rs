/*
 * dependency/resolve.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Dependency tree flattening, deduplication and validation.
 */

//! Dependency resolution.
//!
//! [`resolve`] turns the nested metadata tree into a flat, validated,
//! duplicate-free list:
//!
//! 1. **Flatten** — recursive walk collecting every HTML leaf, preserving
//!    first-seen order among distinct names.
//! 2. **Deduplicate** — group by name, keep the record with the greatest
//!    dotted version; equal versions keep the earliest-seen record.
//! 3. **Validate** — every survivor needs a non-empty name, a non-empty
//!    version and a source directory that exists on disk. Malformed
//!    records fail fast; they are never silently dropped.
//!
//! Resolution is idempotent: resolving an already-resolved list wrapped
//! back into a tree yields the same list.

use rmdrender_util::Version;
use tracing::debug;

use super::{DependencyKind, DependencyNode, HtmlDependency};
use crate::error::{RenderError, Result};

/// Dependencies that historically shipped with an empty source directory.
///
/// These names/versions predate source validation and are referenced by
/// documents in the wild; validation treats their assets as externally
/// provided instead of failing. Keyed by `(name, version)`.
const LEGACY_EMPTY_SRC: &[(&str, &str)] = &[("jquery", "1.11.3")];

/// Whether a record is exempt from the on-disk source check.
pub(crate) fn is_legacy_empty_src(dep: &HtmlDependency) -> bool {
    LEGACY_EMPTY_SRC
        .iter()
        .any(|&(name, version)| dep.name == name && dep.version == version)
}

/// Flatten, deduplicate and validate a dependency tree.
pub fn resolve(tree: &DependencyNode) -> Result<Vec<HtmlDependency>> {
    let mut flat = Vec::new();
    collect_html(tree, &mut flat);
    let resolved = dedupe_by_name(flat);
    for dep in &resolved {
        validate(dep)?;
    }
    Ok(resolved)
}

/// Collect HTML leaves in tree order.
fn collect_html(node: &DependencyNode, out: &mut Vec<HtmlDependency>) {
    match node {
        DependencyNode::Html(dep) => out.push(dep.clone()),
        DependencyNode::Group(children) => {
            for child in children {
                collect_html(child, out);
            }
        }
        DependencyNode::Latex(_) | DependencyNode::Value(_) => {}
    }
}

/// Keep the highest-versioned record per name, in first-seen name order.
///
/// An unparseable version participates in the comparison as version zero,
/// so any well-formed duplicate beats it; validation rejects it afterwards
/// if it survives.
fn dedupe_by_name(deps: Vec<HtmlDependency>) -> Vec<HtmlDependency> {
    let mut result: Vec<HtmlDependency> = Vec::new();

    for dep in deps {
        match result.iter().position(|d| d.name == dep.name) {
            None => result.push(dep),
            Some(i) => {
                let kept = comparable_version(&result[i]);
                let candidate = comparable_version(&dep);
                // Strictly greater replaces; ties keep the earliest-seen record.
                if candidate > kept {
                    debug!(
                        name = %dep.name,
                        kept = %dep.version,
                        dropped = %result[i].version,
                        "duplicate dependency, keeping higher version"
                    );
                    result[i] = dep;
                }
            }
        }
    }

    result
}

fn comparable_version(dep: &HtmlDependency) -> Version {
    dep.version.parse().unwrap_or_else(|_| Version::zero())
}

/// Validate one resolved record.
fn validate(dep: &HtmlDependency) -> Result<()> {
    if dep.name.is_empty() {
        return Err(RenderError::validation("<unnamed>", "name"));
    }
    if dep.version.is_empty() {
        return Err(RenderError::validation(&dep.name, "version"));
    }
    if is_legacy_empty_src(dep) {
        return Ok(());
    }
    if dep.src_dir.as_os_str().is_empty() {
        return Err(RenderError::validation(&dep.name, "src"));
    }
    if !dep.src_dir.exists() {
        return Err(RenderError::missing_asset(&dep.name, &dep.src_dir));
    }
    Ok(())
}

/// Whether the tree contains at least one dependency of `kind`.
///
/// Short-circuits on the first match; never flattens the whole tree.
pub fn has_dependencies_of_kind(tree: &DependencyNode, kind: DependencyKind) -> bool {
    match tree {
        DependencyNode::Group(children) => children
            .iter()
            .any(|child| has_dependencies_of_kind(child, kind)),
        leaf => leaf.kind() == Some(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::LatexDependency;
    use tempfile::TempDir;

    fn dep(name: &str, version: &str, src: &std::path::Path) -> HtmlDependency {
        HtmlDependency::new(name, version, src)
    }

    fn tree_of(deps: Vec<HtmlDependency>) -> DependencyNode {
        DependencyNode::Group(deps.into_iter().map(DependencyNode::Html).collect())
    }

    #[test]
    fn test_resolve_keeps_highest_version() {
        let temp = TempDir::new().unwrap();
        let tree = tree_of(vec![
            dep("n", "1.0", temp.path()),
            dep("n", "2.0", temp.path()),
            dep("n", "1.5", temp.path()),
        ]);

        let resolved = resolve(&tree).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].version, "2.0");
    }

    #[test]
    fn test_resolve_tie_keeps_first_seen() {
        let temp = TempDir::new().unwrap();
        let first = dep("n", "1.0", temp.path()).with_script("first.js");
        let second = dep("n", "1.0", temp.path()).with_script("second.js");
        let tree = tree_of(vec![first, second]);

        let resolved = resolve(&tree).unwrap();
        assert_eq!(resolved[0].scripts, vec!["first.js"]);
    }

    #[test]
    fn test_resolve_preserves_first_seen_name_order() {
        let temp = TempDir::new().unwrap();
        let tree = tree_of(vec![
            dep("b", "1.0", temp.path()),
            dep("a", "1.0", temp.path()),
            // Later, higher-versioned duplicate must not move "b" back.
            dep("b", "2.0", temp.path()),
        ]);

        let resolved = resolve(&tree).unwrap();
        let names: Vec<&str> = resolved.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(resolved[0].version, "2.0");
    }

    #[test]
    fn test_resolve_descends_nested_groups() {
        let temp = TempDir::new().unwrap();
        let tree = DependencyNode::Group(vec![
            DependencyNode::Group(vec![DependencyNode::Group(vec![DependencyNode::Html(
                dep("deep", "0.1", temp.path()),
            )])]),
            DependencyNode::Value(serde_json::json!("noise")),
        ]);

        let resolved = resolve(&tree).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "deep");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let tree = tree_of(vec![
            dep("x", "1.0", temp.path()),
            dep("y", "3.2", temp.path()),
            dep("x", "2.0", temp.path()),
        ]);

        let once = resolve(&tree).unwrap();
        let again = resolve(&tree_of(once.clone())).unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn test_resolve_rejects_empty_name() {
        let temp = TempDir::new().unwrap();
        let tree = tree_of(vec![dep("", "1.0", temp.path())]);
        let err = resolve(&tree).unwrap_err();
        assert!(matches!(err, RenderError::Validation { field: "name", .. }));
    }

    #[test]
    fn test_resolve_rejects_empty_version() {
        let temp = TempDir::new().unwrap();
        let tree = tree_of(vec![dep("thing", "", temp.path())]);
        let err = resolve(&tree).unwrap_err();
        assert!(matches!(err, RenderError::Validation { field: "version", .. }));
    }

    #[test]
    fn test_resolve_rejects_missing_src_dir() {
        let tree = tree_of(vec![dep("thing", "1.0", std::path::Path::new("/no/such/dir"))]);
        let err = resolve(&tree).unwrap_err();
        assert!(matches!(err, RenderError::MissingAsset { .. }));
    }

    #[test]
    fn test_legacy_empty_src_is_exempt() {
        let tree = tree_of(vec![dep("jquery", "1.11.3", std::path::Path::new(""))]);
        let resolved = resolve(&tree).unwrap();
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_has_dependencies_of_kind_deeply_nested() {
        let tree = DependencyNode::Group(vec![DependencyNode::Group(vec![
            DependencyNode::Group(vec![DependencyNode::Latex(LatexDependency {
                name: "longtable".to_string(),
                options: vec![],
                extra_lines: vec![],
            })]),
        ])]);

        assert!(has_dependencies_of_kind(&tree, DependencyKind::Latex));
        assert!(!has_dependencies_of_kind(&tree, DependencyKind::Html));
    }

    #[test]
    fn test_has_dependencies_of_kind_empty_tree() {
        let tree = DependencyNode::Group(vec![]);
        assert!(!has_dependencies_of_kind(&tree, DependencyKind::Html));
    }
}
