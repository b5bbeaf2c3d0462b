/*
 * dependency/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * HTML dependency data model.
 */

//! HTML dependency data model.
//!
//! A dependency is a named, versioned bundle of script/stylesheet assets
//! attached to a piece of rendered content. Dependencies are produced by
//! the knitting front end and attached to the document as a metadata
//! tree: internal nodes are unnamed lists, leaves are dependency records
//! or unrelated values. The tree arrives as JSON and is classified into
//! [`DependencyNode`] once at the boundary; downstream code never
//! re-inspects raw shapes.
//!
//! Resolution (flattening, deduplication, validation) lives in
//! [`resolve`]; head-markup emission and library copying live in
//! [`html`].

pub mod html;
pub mod resolve;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use html::{emit_head_markup, latex_dependencies_as_string};
pub use resolve::{has_dependencies_of_kind, resolve};

/// A `<meta>` tag carried by a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTag {
    /// The `name` attribute
    pub name: String,
    /// The `content` attribute
    pub content: String,
}

/// A named, versioned bundle of script/stylesheet assets.
///
/// Field names follow the knit-metadata wire format: `src` is the
/// directory the relative `script`/`stylesheet` paths resolve against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlDependency {
    /// Dependency name, unique after resolution
    pub name: String,

    /// Dotted version string
    pub version: String,

    /// Directory containing the dependency's assets
    #[serde(rename = "src")]
    pub src_dir: PathBuf,

    /// Script paths, relative to `src_dir`, in inclusion order
    #[serde(rename = "script", default)]
    pub scripts: Vec<String>,

    /// Stylesheet paths, relative to `src_dir`, in inclusion order
    #[serde(rename = "stylesheet", default)]
    pub stylesheets: Vec<String>,

    /// Ordered `<meta>` tags
    #[serde(default)]
    pub meta: Vec<MetaTag>,

    /// Raw markup appended verbatim after the generated tags
    #[serde(rename = "head", default)]
    pub head_content: Option<String>,
}

impl HtmlDependency {
    /// Create a dependency with the required fields; assets are added
    /// with the builder methods.
    pub fn new(name: impl Into<String>, version: impl Into<String>, src_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            src_dir: src_dir.into(),
            scripts: Vec::new(),
            stylesheets: Vec::new(),
            meta: Vec::new(),
            head_content: None,
        }
    }

    /// Add a script path (relative to `src_dir`).
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.scripts.push(script.into());
        self
    }

    /// Add a stylesheet path (relative to `src_dir`).
    pub fn with_stylesheet(mut self, stylesheet: impl Into<String>) -> Self {
        self.stylesheets.push(stylesheet.into());
        self
    }

    /// Add a `<meta>` tag.
    pub fn with_meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.meta.push(MetaTag {
            name: name.into(),
            content: content.into(),
        });
        self
    }

    /// Set raw head markup.
    pub fn with_head_content(mut self, head: impl Into<String>) -> Self {
        self.head_content = Some(head.into());
        self
    }
}

/// A LaTeX package dependency attached by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatexDependency {
    /// Package name passed to `\usepackage`
    pub name: String,

    /// Package options, emitted bracketed when non-empty
    #[serde(default)]
    pub options: Vec<String>,

    /// Raw preamble lines emitted after the `\usepackage` line
    #[serde(default)]
    pub extra_lines: Vec<String>,
}

/// The kind of dependency a tree leaf carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Script/stylesheet bundles for HTML output
    Html,
    /// LaTeX preamble packages for PDF output
    Latex,
}

/// One node of the dependency metadata tree.
///
/// Internal nodes are unnamed groups; leaves are typed dependency
/// records or opaque values the resolver ignores.
#[derive(Debug, Clone)]
pub enum DependencyNode {
    /// An HTML dependency record
    Html(HtmlDependency),
    /// A LaTeX dependency record
    Latex(LatexDependency),
    /// An unnamed sub-list, flattened recursively
    Group(Vec<DependencyNode>),
    /// An unrelated metadata value, skipped by resolution
    Value(serde_json::Value),
}

impl DependencyNode {
    /// Classify a raw knit-metadata JSON value into a typed tree.
    ///
    /// Arrays become groups. Objects carrying a `"type"` discriminator of
    /// `"html_dependency"` or `"latex_dependency"` become typed leaves;
    /// a malformed record with a known discriminator is a hard error, not
    /// a silent skip. Everything else is an opaque value.
    pub fn from_meta(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Array(items) => {
                let children = items
                    .into_iter()
                    .map(Self::from_meta)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Group(children))
            }
            serde_json::Value::Object(ref map) => match map.get("type").and_then(|t| t.as_str()) {
                Some("html_dependency") => {
                    let dep: HtmlDependency = serde_json::from_value(value)?;
                    Ok(Self::Html(dep))
                }
                Some("latex_dependency") => {
                    let dep: LatexDependency = serde_json::from_value(value)?;
                    Ok(Self::Latex(dep))
                }
                _ => Ok(Self::Value(value)),
            },
            other => Ok(Self::Value(other)),
        }
    }

    /// The kind of this leaf, if it is a dependency record.
    pub fn kind(&self) -> Option<DependencyKind> {
        match self {
            Self::Html(_) => Some(DependencyKind::Html),
            Self::Latex(_) => Some(DependencyKind::Latex),
            Self::Group(_) | Self::Value(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_meta_classifies_html_dependency() {
        let node = DependencyNode::from_meta(json!({
            "type": "html_dependency",
            "name": "jquery",
            "version": "3.6.0",
            "src": "/opt/share/jquery",
            "script": ["jquery.min.js"],
        }))
        .unwrap();

        match node {
            DependencyNode::Html(dep) => {
                assert_eq!(dep.name, "jquery");
                assert_eq!(dep.scripts, vec!["jquery.min.js"]);
                assert!(dep.stylesheets.is_empty());
            }
            other => panic!("expected Html leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_from_meta_nested_groups() {
        let node = DependencyNode::from_meta(json!([
            [{"type": "html_dependency", "name": "a", "version": "1.0", "src": "/x"}],
            "unrelated",
            42,
        ]))
        .unwrap();

        match node {
            DependencyNode::Group(children) => {
                assert_eq!(children.len(), 3);
                assert!(matches!(&children[0], DependencyNode::Group(inner) if inner.len() == 1));
                assert!(matches!(&children[1], DependencyNode::Value(_)));
            }
            other => panic!("expected Group, got {:?}", other),
        }
    }

    #[test]
    fn test_from_meta_malformed_record_is_error() {
        // Known discriminator but missing required fields: hard error.
        let result = DependencyNode::from_meta(json!({
            "type": "html_dependency",
            "name": "broken",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_meta_unknown_object_is_value() {
        let node = DependencyNode::from_meta(json!({"title": "My Doc"})).unwrap();
        assert!(matches!(node, DependencyNode::Value(_)));
        assert_eq!(node.kind(), None);
    }
}
