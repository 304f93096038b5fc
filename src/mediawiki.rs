//! MediaWiki dialect adapter.
//!
//! Rewrites the MediaWiki-specific syntax that differs *structurally* from
//! the Creole-family token grammar, so the downstream renderer can run with
//! the MediaWiki token table:
//! - `<nowiki>...</nowiki>` becomes an escape span,
//! - `[[File:...]]` / `[[Image:...]]` / `[[Media:...]]` becomes the image
//!   token syntax (the last pipe segment is kept as the caption),
//! - `__TOC__` becomes the ToC placeholder token,
//! - `<br>` variants become the forced line-break token.
//!
//! Bold/italic/link/list/heading differences are handled by the dialect's
//! token overrides, not by rewriting, to avoid double-escaping. Definition
//! lists, tables, space-indented preformatted blocks, and image
//! sizing/alignment options are unsupported and fall through as literal
//! text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RE_NOWIKI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<nowiki>(?P<body>.*?)</nowiki>").unwrap());

static RE_FILE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\[\s*(?:file|image|media)\s*:(?P<inner>[^\[\]]*)\]\]").unwrap());

static RE_MAGIC_TOC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*__TOC__\s*$").unwrap());

static RE_BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());

/// Rewrite MediaWiki-flavored markup into the token shapes the renderer
/// understands. Applied before block rendering when the active dialect is
/// MediaWiki.
pub fn normalize(text: &str) -> String {
    // 1) lift <nowiki> bodies so no rewrite below can touch verbatim text.
    let (text, escapes) = lift_nowiki_spans(text);

    // 2) __TOC__ -> ToC placeholder.
    let text = RE_MAGIC_TOC
        .replace_all(&text, crate::toc::TOC_TOKEN)
        .to_string();

    // 3) file/image links -> image token syntax.
    let text = rewrite_file_links(&text);

    // 4) explicit HTML line breaks -> line-break token.
    let text = RE_BR.replace_all(&text, r"\\").to_string();

    // 5) restore the lifted bodies as escape spans.
    restore_placeholders(text, &escapes)
}

fn placeholder(idx: usize) -> String {
    format!("{{{{ NOWIKI {} }}}}", idx)
}

fn lift_nowiki_spans(input: &str) -> (String, Vec<String>) {
    let mut stored: Vec<String> = Vec::new();
    let text = RE_NOWIKI
        .replace_all(input, |caps: &Captures| {
            let mut span = String::from("{{{");
            span.push_str(&caps["body"]);
            span.push_str("}}}");
            stored.push(span);
            placeholder(stored.len() - 1)
        })
        .to_string();
    (text, stored)
}

fn restore_placeholders(mut text: String, stored: &[String]) -> String {
    for (idx, body) in stored.iter().enumerate() {
        text = text.replace(&placeholder(idx), body);
    }
    text
}

fn rewrite_file_links(input: &str) -> String {
    RE_FILE_LINK
        .replace_all(input, |caps: &Captures| {
            let inner = &caps["inner"];
            let mut parts = inner.split('|');
            let target = parts.next().unwrap_or("").trim();
            // sizing/alignment options between target and caption are dropped.
            let caption = parts.last().map(str::trim).filter(|c| !c.is_empty());

            let mut out = String::from("{{");
            out.push_str(target);
            if let Some(caption) = caption {
                out.push('|');
                out.push_str(caption);
            }
            out.push_str("}}");
            out
        })
        .to_string()
}
