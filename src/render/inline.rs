//! Inline markup -> HTML.
//!
//! A single inline run (paragraph body, heading text, list item) is rendered
//! by passing a chunk list through one stage per construct, in fixed order:
//! escape spans, images, links, bold, italic, underline, line breaks. Each
//! stage only touches [`Chunk::Raw`] text; already-rendered HTML flows
//! through untouched. The final pass HTML-escapes whatever literal text is
//! left, so structural injection is impossible even for malformed markup.
//!
//! Bracket matching is single-pass and nest-unaware: the first end marker
//! strictly after a start marker closes that pair, and unterminated or
//! overlapping markers degrade to literal text. Nothing in here can fail on
//! malformed input; the only error path is a host resolver refusing a
//! link/image event.

use crate::dialect::{Dialect, Token};
use crate::links::{ImageEvent, LinkEvent, LinkResolver, RenderError};
use std::borrow::Cow;

/// One piece of an inline run: literal source text still subject to token
/// matching, or HTML that earlier stages already produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Chunk {
    Raw(String),
    Html(String),
}

pub(crate) struct InlineRenderer<'r> {
    dialect: &'static Dialect,
    resolver: &'r mut dyn LinkResolver,
}

impl<'r> InlineRenderer<'r> {
    pub(crate) fn new(dialect: &'static Dialect, resolver: &'r mut dyn LinkResolver) -> Self {
        Self { dialect, resolver }
    }

    pub(crate) fn render(&mut self, text: &str) -> Result<String, RenderError> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let dialect = self.dialect;
        let tokens = &dialect.tokens;

        let mut chunks = lift_escape_spans(text, &tokens.nowiki);
        chunks = self.apply_images(chunks)?;
        chunks = self.apply_links(chunks)?;
        chunks = apply_rule(chunks, |raw| (dialect.render_bold)(tokens, raw));
        chunks = apply_rule(chunks, |raw| (dialect.render_italic)(tokens, raw));
        chunks = apply_rule(chunks, |raw| {
            emphasis_pairs(raw, &tokens.underline, "<u>", "</u>")
        });
        chunks = apply_rule(chunks, |raw| line_breaks(raw, tokens.line_break));

        let mut out = String::with_capacity(text.len());
        for chunk in chunks {
            match chunk {
                Chunk::Raw(raw) => out.push_str(&encode_text(&raw)),
                Chunk::Html(html) => out.push_str(&html),
            }
        }
        Ok(out)
    }

    fn apply_images(&mut self, chunks: Vec<Chunk>) -> Result<Vec<Chunk>, RenderError> {
        let token = self.dialect.tokens.image;
        let mut out = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let Chunk::Raw(raw) = chunk else {
                out.push(chunk);
                continue;
            };
            let (pairs, tail) = split_pairs(&raw, &token);
            for (pre, inner) in pairs {
                if !pre.is_empty() {
                    out.push(Chunk::Raw(pre.to_string()));
                }
                out.push(Chunk::Html(self.render_image(inner)?));
            }
            if !tail.is_empty() {
                out.push(Chunk::Raw(tail.to_string()));
            }
        }
        Ok(out)
    }

    fn render_image(&mut self, inner: &str) -> Result<String, RenderError> {
        let (target, caption) = match inner.split_once('|') {
            Some((target, caption)) => (target.trim(), Some(caption.trim())),
            None => (inner.trim(), None),
        };

        let mut event = ImageEvent::new(target, caption);
        self.resolver
            .resolve_image(&mut event)
            .map_err(|source| RenderError::ImageResolver {
                src: target.to_string(),
                source,
            })?;

        let mut tag = String::from("<img src=\"");
        tag.push_str(&encode_attr(&event.src));
        tag.push_str("\" alt=\"");
        tag.push_str(&encode_attr(&event.alt));
        tag.push('"');
        if let Some(title) = &event.title {
            tag.push_str(" title=\"");
            tag.push_str(&encode_attr(title));
            tag.push('"');
        }
        tag.push_str(" />");
        Ok(tag)
    }

    fn apply_links(&mut self, chunks: Vec<Chunk>) -> Result<Vec<Chunk>, RenderError> {
        let token = self.dialect.tokens.link;
        let mut out = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let Chunk::Raw(raw) = chunk else {
                out.push(chunk);
                continue;
            };
            let (pairs, tail) = split_pairs(&raw, &token);
            for (pre, inner) in pairs {
                if !pre.is_empty() {
                    out.push(Chunk::Raw(pre.to_string()));
                }
                self.render_link(inner, &mut out)?;
            }
            if !tail.is_empty() {
                out.push(Chunk::Raw(tail.to_string()));
            }
        }
        Ok(out)
    }

    fn render_link(&mut self, inner: &str, out: &mut Vec<Chunk>) -> Result<(), RenderError> {
        let (target, display) = match inner.split_once('|') {
            Some((target, display)) => (target.trim(), Some(display.trim())),
            None => (inner.trim(), None),
        };

        let mut event = LinkEvent::new(target, display);
        self.resolver
            .resolve_link(&mut event)
            .map_err(|source| RenderError::LinkResolver {
                target: target.to_string(),
                source,
            })?;

        let mut open = String::from("<a href=\"");
        open.push_str(&encode_attr(&event.href));
        open.push('"');
        if let Some(anchor_target) = &event.target {
            open.push_str(" target=\"");
            open.push_str(&encode_attr(anchor_target));
            open.push('"');
        }
        if let Some(title) = &event.title {
            open.push_str(" title=\"");
            open.push_str(&encode_attr(title));
            open.push('"');
        }
        open.push('>');

        out.push(Chunk::Html(open));
        // display text stays raw so the emphasis stages still run inside the
        // anchor body; the closing tag pins the boundary.
        out.push(Chunk::Raw(display.unwrap_or(target).to_string()));
        out.push(Chunk::Html("</a>".to_string()));
        Ok(())
    }
}

/// Split `raw` on `token` pairs: returns (literal-before, inner) for each
/// matched pair plus the trailing literal. The end marker is searched
/// strictly after the start marker; an unmatched start stays in the tail.
fn split_pairs<'s>(raw: &'s str, token: &Token) -> (Vec<(&'s str, &'s str)>, &'s str) {
    let mut pairs = Vec::new();
    let mut cursor = 0usize;
    while let Some(rel) = raw[cursor..].find(token.start) {
        let start = cursor + rel;
        let inner_start = start + token.start.len();
        let Some(end_rel) = raw[inner_start..].find(token.end) else {
            break;
        };
        let end = inner_start + end_rel;
        pairs.push((&raw[cursor..start], &raw[inner_start..end]));
        cursor = end + token.end.len();
    }
    (pairs, &raw[cursor..])
}

/// Generic emphasis stage: wrap each matched pair in `open`/`close`, leaving
/// the pair's content raw so later stages still process it.
pub(crate) fn emphasis_pairs(raw: &str, token: &Token, open: &str, close: &str) -> Vec<Chunk> {
    let (pairs, tail) = split_pairs(raw, token);
    if pairs.is_empty() {
        return vec![Chunk::Raw(raw.to_string())];
    }
    let mut out = Vec::with_capacity(pairs.len() * 4 + 1);
    for (pre, inner) in pairs {
        if !pre.is_empty() {
            out.push(Chunk::Raw(pre.to_string()));
        }
        out.push(Chunk::Html(open.to_string()));
        out.push(Chunk::Raw(inner.to_string()));
        out.push(Chunk::Html(close.to_string()));
    }
    if !tail.is_empty() {
        out.push(Chunk::Raw(tail.to_string()));
    }
    out
}

/// Protect escape-span contents: the literal body is HTML-escaped once, here,
/// and no later stage sees it.
fn lift_escape_spans(text: &str, token: &Token) -> Vec<Chunk> {
    let (pairs, tail) = split_pairs(text, token);
    if pairs.is_empty() {
        return vec![Chunk::Raw(text.to_string())];
    }
    let mut out = Vec::with_capacity(pairs.len() * 2 + 1);
    for (pre, inner) in pairs {
        if !pre.is_empty() {
            out.push(Chunk::Raw(pre.to_string()));
        }
        out.push(Chunk::Html(encode_text(inner).into_owned()));
    }
    if !tail.is_empty() {
        out.push(Chunk::Raw(tail.to_string()));
    }
    out
}

fn line_breaks(raw: &str, marker: &str) -> Vec<Chunk> {
    if !raw.contains(marker) {
        return vec![Chunk::Raw(raw.to_string())];
    }
    let mut out = Vec::new();
    for (i, part) in raw.split(marker).enumerate() {
        if i > 0 {
            out.push(Chunk::Html("<br />".to_string()));
        }
        if !part.is_empty() {
            out.push(Chunk::Raw(part.to_string()));
        }
    }
    out
}

fn apply_rule(chunks: Vec<Chunk>, rule: impl Fn(&str) -> Vec<Chunk>) -> Vec<Chunk> {
    let mut out = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        match chunk {
            Chunk::Raw(raw) => out.extend(rule(&raw)),
            rendered => out.push(rendered),
        }
    }
    out
}

pub(crate) fn encode_text(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

pub(crate) fn encode_attr(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}
