//! JSON envelope for a document's heading outline.
//!
//! Wraps the heading tree with the metadata that makes on-disk inspection
//! and diffing practical: schema versioning, generator info, and source
//! info. Written by the CLI next to the HTML output when requested.

use super::{HeadingTree, ROOT};
use serde::{Deserialize, Serialize};

/// Schema version for the outline envelope.
///
/// Bump this when making non-backwards-compatible changes to the JSON
/// structure.
pub const SCHEMA_VERSION: u32 = 1;

pub const GENERATOR_NAME: &str = "wiki2html";

pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineFile {
    pub schema_version: u32,

    pub generator: GeneratorInfo,

    pub source: SourceInfo,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<OutlineHeading>,
}

/// Identifies the program that produced the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub name: String,
    pub version: String,
}

/// Optional information about the HTML input the outline was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// If available, the path of the markup file behind the HTML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Length of the HTML input in bytes.
    pub byte_len: u64,
}

/// One heading with its display number and nested children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineHeading {
    pub title: String,

    /// Anchor id, unique within the document.
    pub id: String,

    pub level: u8,

    /// Dot-joined sibling-position chain, e.g. `1.2.`.
    pub number: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineHeading>,
}

/// Derive the heading outline of rendered HTML. Level-1 headings are
/// page-title equivalents and are skipped in favor of their children, as in
/// the rendered ToC.
pub fn outline(html: &str) -> OutlineFile {
    let tree = HeadingTree::from_html(html);
    OutlineFile {
        schema_version: SCHEMA_VERSION,
        generator: GeneratorInfo {
            name: GENERATOR_NAME.to_string(),
            version: GENERATOR_VERSION.to_string(),
        },
        source: SourceInfo {
            path: None,
            byte_len: html.len() as u64,
        },
        headings: collect(&tree, ROOT, ""),
    }
}

fn collect(tree: &HeadingTree, idx: usize, levels: &str) -> Vec<OutlineHeading> {
    let mut out = Vec::new();
    for child in tree.visible_children(idx) {
        let node = &tree.nodes[child];
        let position = tree.sibling_position(child);
        let number = format!("{levels}{position}.");
        out.push(OutlineHeading {
            title: node.title.clone(),
            id: node.id.clone(),
            level: node.level,
            number: number.clone(),
            children: collect(tree, child, &number),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_numbers_follow_the_tree() {
        let html = "<h2>Intro</h2><h3>Setup</h3><h3>Setup</h3><h2>Usage</h2>";
        let file = outline(html);

        assert_eq!(file.headings.len(), 2);
        assert_eq!(file.headings[0].title, "Intro");
        assert_eq!(file.headings[0].number, "1.");
        assert_eq!(file.headings[0].children[0].number, "1.1.");
        assert_eq!(file.headings[0].children[1].id, "setup-2");
        assert_eq!(file.headings[1].number, "2.");
    }

    #[test]
    fn outline_json_round_trip() {
        let html = "<h1>Page</h1><h2>First</h2><h3>Nested</h3>";
        let file = outline(html);

        let json = serde_json::to_string_pretty(&file).expect("serialize");
        let back: OutlineFile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(file, back);
        assert_eq!(back.schema_version, SCHEMA_VERSION);
        assert_eq!(back.generator.name, GENERATOR_NAME);
        assert_eq!(back.source.byte_len, html.len() as u64);
    }
}
