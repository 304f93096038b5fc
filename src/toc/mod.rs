//! Heading tree and table-of-contents insertion.
//!
//! [`insert_toc`] scans rendered HTML for heading elements, builds a
//! hierarchical tree with sibling-position numbering and collision-free
//! anchor ids, injects an `<a name>` anchor into each heading, and replaces
//! the `{TOC}` placeholder with a nested-list rendering of the tree. HTML
//! parsing is delegated to `scraper`; this module never parses HTML itself.
//!
//! The tree is an index arena: every node is owned by the arena, children
//! are index lists, and the parent index exists only for the upward walk
//! during level resolution. Node 0 is a synthetic level-0 root that owns all
//! level-1 headings directly. A new heading walks up from the cursor until
//! it finds an ancestor whose level is strictly less than its own and
//! attaches there, which reproduces skipped-level documents without
//! inventing intermediate levels.

mod outline;

pub use outline::{outline, GeneratorInfo, OutlineFile, OutlineHeading, SourceInfo};

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashMap;
use thiserror::Error;

/// Literal placeholder marking the ToC insertion point in input HTML. The
/// doubled form `{{TOC}}` is an escape and is never substituted.
pub const TOC_TOKEN: &str = "{TOC}";

static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TocError {
    /// The headings found by the HTML parser could not be aligned with the
    /// heading tags in the source text, so anchors cannot be injected
    /// safely. Produced for malformed documents.
    #[error("heading {index} (h{level}) could not be located in the source HTML")]
    HeadingStructure { index: usize, level: u8 },
}

/// One heading occurrence. `id` is unique within the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    pub title: String,
    pub id: String,
    pub level: u8,
    parent: usize,
    children: Vec<usize>,
}

/// Heading hierarchy of one document. Built fresh per call; never cached.
#[derive(Debug, Clone)]
pub struct HeadingTree {
    nodes: Vec<HeadingNode>,
}

const ROOT: usize = 0;

/// Nested-list rendering template. `item_format` supports the `{id}`,
/// `{levels}`, `{itemnumber}`, and `{title}` substitution slots, where
/// `{levels}` is the dot-joined chain of ancestor sibling positions
/// (empty for top-level items).
#[derive(Debug, Clone)]
pub struct TocTemplate {
    pub level_start: String,
    pub level_end: String,
    pub item_start: String,
    pub item_format: String,
    pub item_end: String,
}

impl Default for TocTemplate {
    fn default() -> Self {
        Self {
            level_start: "<ul>".to_string(),
            level_end: "</ul>".to_string(),
            item_start: "<li>".to_string(),
            item_format: "<a href=\"#{id}\">{levels}{itemnumber}. {title}</a>".to_string(),
            item_end: "</li>".to_string(),
        }
    }
}

/// Insert a table of contents at the `{TOC}` placeholder.
///
/// Returns the input unchanged when no substitutable placeholder is present;
/// most pages have none, and this guard keeps them cheap. Otherwise returns
/// the document with anchors injected into every heading below level 1 and
/// each placeholder replaced by the rendered ToC.
pub fn insert_toc(html: &str) -> Result<String, TocError> {
    if find_token(html, 0).is_none() {
        return Ok(html.to_string());
    }
    let tree = HeadingTree::from_html(html);
    let annotated = tree.inject_anchors(html)?;
    let toc = tree.render(&TocTemplate::default());
    Ok(replace_token(&annotated, &toc))
}

impl HeadingTree {
    /// Build the tree from rendered HTML, registering headings in strict
    /// document order.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_fragment(html);
        let mut tree = HeadingTree {
            nodes: vec![HeadingNode {
                title: String::new(),
                id: String::new(),
                level: 0,
                parent: ROOT,
                children: Vec::new(),
            }],
        };
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut cursor = ROOT;
        for element in document.select(&HEADING_SELECTOR) {
            let Some(level) = heading_level(element.value().name()) else {
                continue;
            };
            let title = collapse_whitespace(&element.text().collect::<String>());
            let id = unique_slug(&mut seen, &title);
            cursor = tree.insert(cursor, level, title, id);
        }
        tree
    }

    fn insert(&mut self, cursor: usize, level: u8, title: String, id: String) -> usize {
        let mut at = cursor;
        while self.nodes[at].level >= level {
            at = self.nodes[at].parent;
        }
        let idx = self.nodes.len();
        self.nodes.push(HeadingNode {
            title,
            id,
            level,
            parent: at,
            children: Vec::new(),
        });
        self.nodes[at].children.push(idx);
        idx
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Headings in document order, root excluded.
    pub fn headings(&self) -> impl Iterator<Item = &HeadingNode> {
        self.nodes.iter().skip(1)
    }

    fn sibling_position(&self, idx: usize) -> usize {
        let parent = self.nodes[idx].parent;
        self.nodes[parent]
            .children
            .iter()
            .position(|&child| child == idx)
            .map_or(1, |p| p + 1)
    }

    /// Display children of `idx`: level-1 headings are page-title
    /// equivalents, so they are not shown themselves but their children are
    /// hoisted in place.
    fn visible_children(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &child in &self.nodes[idx].children {
            if self.nodes[child].level <= 1 {
                out.extend(self.visible_children(child));
            } else {
                out.push(child);
            }
        }
        out
    }

    /// Render the tree as nested list markup. Empty string when the
    /// document has no headings below level 1.
    pub fn render(&self, template: &TocTemplate) -> String {
        let items = self.visible_children(ROOT);
        if items.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        self.render_level(&items, "", template, &mut out);
        out
    }

    fn render_level(&self, items: &[usize], levels: &str, template: &TocTemplate, out: &mut String) {
        out.push_str(&template.level_start);
        for &idx in items {
            let node = &self.nodes[idx];
            let number = self.sibling_position(idx);
            let title = crate::render::inline::encode_text(&node.title);
            out.push_str(&template.item_start);
            out.push_str(
                &template
                    .item_format
                    .replace("{id}", &node.id)
                    .replace("{levels}", levels)
                    .replace("{itemnumber}", &number.to_string())
                    .replace("{title}", &title),
            );
            let children = self.visible_children(idx);
            if !children.is_empty() {
                self.render_level(&children, &format!("{levels}{number}."), template, out);
            }
            out.push_str(&template.item_end);
        }
        out.push_str(&template.level_end);
    }

    /// Splice an `<a name>` anchor after the opening tag of every heading
    /// below level 1, walking the source text in step with the registered
    /// nodes. A tag that cannot be aligned surfaces [`TocError`].
    pub fn inject_anchors(&self, html: &str) -> Result<String, TocError> {
        let mut out = String::with_capacity(html.len() + self.nodes.len() * 32);
        let mut pos = 0usize;
        for (index, node) in self.nodes.iter().enumerate().skip(1) {
            let Some(tag_end) = find_heading_open(html, pos, node.level) else {
                return Err(TocError::HeadingStructure {
                    index,
                    level: node.level,
                });
            };
            out.push_str(&html[pos..tag_end]);
            if node.level > 1 {
                out.push_str("<a name=\"");
                out.push_str(&node.id);
                out.push_str("\"></a>");
            }
            pos = tag_end;
        }
        out.push_str(&html[pos..]);
        Ok(out)
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    let digits = tag.strip_prefix(['h', 'H'])?;
    digits.parse::<u8>().ok().filter(|level| (1..=6).contains(level))
}

/// Byte offset just past `>` of the next heading opening tag, which must be
/// of the expected level.
fn find_heading_open(html: &str, from: usize, expect_level: u8) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut i = from;
    while i + 3 <= bytes.len() {
        if bytes[i] != b'<' || bytes[i + 1].to_ascii_lowercase() != b'h' {
            i += 1;
            continue;
        }
        let digit = bytes[i + 2];
        if !digit.is_ascii_digit() || digit == b'0' || digit > b'6' {
            i += 1;
            continue;
        }
        let after = bytes.get(i + 3).copied();
        if !matches!(after, Some(b'>' | b' ' | b'\t' | b'\r' | b'\n' | b'/')) {
            i += 1;
            continue;
        }
        if digit - b'0' != expect_level {
            return None;
        }
        let mut j = i + 3;
        while j < bytes.len() && bytes[j] != b'>' {
            j += 1;
        }
        if j >= bytes.len() {
            return None;
        }
        return Some(j + 1);
    }
    None
}

fn find_token(html: &str, from: usize) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut at = from;
    while let Some(rel) = html[at..].find(TOC_TOKEN) {
        let idx = at + rel;
        let escaped = idx > 0
            && bytes[idx - 1] == b'{'
            && bytes.get(idx + TOC_TOKEN.len()) == Some(&b'}');
        if escaped {
            at = idx + TOC_TOKEN.len();
            continue;
        }
        return Some(idx);
    }
    None
}

fn replace_token(html: &str, toc: &str) -> String {
    let mut out = String::with_capacity(html.len() + toc.len());
    let mut pos = 0usize;
    while let Some(idx) = find_token(html, pos) {
        out.push_str(&html[pos..idx]);
        out.push_str(toc);
        pos = idx + TOC_TOKEN.len();
    }
    out.push_str(&html[pos..]);
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn unique_slug(seen: &mut HashMap<String, usize>, title: &str) -> String {
    let base = slugify(title);
    let base = if base.is_empty() { "section".to_string() } else { base };
    let count = seen.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        base
    } else {
        format!("{base}-{count}")
    }
}

/// URL-fragment-safe id derived from a heading title: transliterated to
/// ASCII, lowercased, runs of other characters collapsed to single hyphens.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode::deunicode(title).to_ascii_lowercase();
    let mut out = String::with_capacity(ascii.len());
    let mut last_was_hyphen = true; // swallows leading hyphens
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            out.push('-');
            last_was_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
