//! Markup dialect tables.
//!
//! A [`Dialect`] is a named bundle of token strings plus two emphasis rule
//! overrides. The tables are process-wide constants; rendering never mutates
//! them, so they are safe to share across concurrent render calls.
//!
//! Bold and italic carry override hooks because quote-based dialects change
//! how bracketing is *detected*, not just which marker is used: MediaWiki's
//! `'''''` run opens bold and italic at once, and Creole's `//` must not
//! trigger inside `http://`-style URLs. Everything else goes through the
//! shared first-end-marker-closes matcher.

use crate::render::inline::{self, Chunk};
use std::fmt;
use std::str::FromStr;

/// A start/end marker pair for one markup construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: &'static str,
    pub end: &'static str,
}

/// The full token table for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Tokens {
    pub bold: Token,
    pub italic: Token,
    pub underline: Token,
    pub link: Token,
    pub image: Token,
    /// Verbatim escape span. The block form is a line consisting of only the
    /// start marker, closed by a line consisting of only the end marker.
    pub nowiki: Token,
    pub bullet: char,
    pub numbered: char,
    pub heading: char,
    /// Forced line break inside a paragraph.
    pub line_break: &'static str,
}

pub(crate) type EmphasisRule = fn(&Tokens, &str) -> Vec<Chunk>;

/// A markup dialect: token table plus emphasis detection overrides.
pub struct Dialect {
    pub name: &'static str,
    pub tokens: Tokens,
    pub(crate) render_bold: EmphasisRule,
    pub(crate) render_italic: EmphasisRule,
}

/// Dialect selection, supplied by the host per render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    Creole,
    Markdown,
    MediaWiki,
}

impl DialectKind {
    pub fn dialect(self) -> &'static Dialect {
        match self {
            DialectKind::Creole => &CREOLE,
            DialectKind::Markdown => &MARKDOWN,
            DialectKind::MediaWiki => &MEDIAWIKI,
        }
    }

    pub fn name(self) -> &'static str {
        self.dialect().name
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creole" => Ok(DialectKind::Creole),
            "markdown" | "md" => Ok(DialectKind::Markdown),
            "mediawiki" | "wiki" => Ok(DialectKind::MediaWiki),
            other => Err(format!(
                "unknown dialect `{other}` (expected creole, markdown, or mediawiki)"
            )),
        }
    }
}

static CREOLE: Dialect = Dialect {
    name: "creole",
    tokens: Tokens {
        bold: Token { start: "**", end: "**" },
        italic: Token { start: "//", end: "//" },
        underline: Token { start: "__", end: "__" },
        link: Token { start: "[[", end: "]]" },
        image: Token { start: "{{", end: "}}" },
        nowiki: Token { start: "{{{", end: "}}}" },
        bullet: '*',
        numbered: '#',
        heading: '=',
        line_break: "\\\\",
    },
    render_bold: default_bold,
    render_italic: creole_italic,
};

// Best-effort Markdown-flavored tokens; CommonMark compliance is out of
// scope. Links stay wikilink-shaped, and ordered lists use a repeated `+`
// marker since `1.`-style enumerators do not fit the repeated-marker grammar.
static MARKDOWN: Dialect = Dialect {
    name: "markdown",
    tokens: Tokens {
        bold: Token { start: "**", end: "**" },
        italic: Token { start: "*", end: "*" },
        underline: Token { start: "__", end: "__" },
        link: Token { start: "[[", end: "]]" },
        image: Token { start: "{{", end: "}}" },
        nowiki: Token { start: "```", end: "```" },
        bullet: '-',
        numbered: '+',
        heading: '#',
        line_break: "\\\\",
    },
    render_bold: default_bold,
    render_italic: default_italic,
};

// The MediaWiki table expects input already run through
// [`crate::mediawiki::normalize`], which rewrites `<nowiki>` and
// `[[File:...]]` syntax into the escape/image token shapes below.
static MEDIAWIKI: Dialect = Dialect {
    name: "mediawiki",
    tokens: Tokens {
        bold: Token { start: "'''", end: "'''" },
        italic: Token { start: "''", end: "''" },
        underline: Token { start: "<u>", end: "</u>" },
        link: Token { start: "[[", end: "]]" },
        image: Token { start: "{{", end: "}}" },
        nowiki: Token { start: "{{{", end: "}}}" },
        bullet: '*',
        numbered: '#',
        heading: '=',
        line_break: "\\\\",
    },
    render_bold: mediawiki_bold,
    render_italic: default_italic,
};

fn default_bold(tokens: &Tokens, raw: &str) -> Vec<Chunk> {
    inline::emphasis_pairs(raw, &tokens.bold, "<strong>", "</strong>")
}

fn default_italic(tokens: &Tokens, raw: &str) -> Vec<Chunk> {
    inline::emphasis_pairs(raw, &tokens.italic, "<em>", "</em>")
}

/// MediaWiki bold: a `'''''` run opens bold and italic at once and must be
/// matched before the plain `'''` pass, or the italic pass would see stray
/// quote pairs inside every bold-italic span.
fn mediawiki_bold(tokens: &Tokens, raw: &str) -> Vec<Chunk> {
    const FIVE_QUOTES: Token = Token { start: "'''''", end: "'''''" };
    let first = inline::emphasis_pairs(raw, &FIVE_QUOTES, "<strong><em>", "</em></strong>");
    let mut out = Vec::with_capacity(first.len());
    for chunk in first {
        match chunk {
            Chunk::Raw(text) => {
                out.extend(inline::emphasis_pairs(&text, &tokens.bold, "<strong>", "</strong>"));
            }
            rendered => out.push(rendered),
        }
    }
    out
}

/// Creole italic: `//` is the marker, but the `//` in `http://` is a URL
/// scheme separator, not emphasis. Markers directly after a `:` are skipped.
fn creole_italic(tokens: &Tokens, raw: &str) -> Vec<Chunk> {
    let marker = tokens.italic.start;
    let mut out = Vec::new();
    let mut cursor = 0usize;
    loop {
        let Some(start) = find_italic_marker(raw, cursor, marker) else {
            break;
        };
        let Some(end) = find_italic_marker(raw, start + marker.len(), marker) else {
            break;
        };
        if cursor < start {
            out.push(Chunk::Raw(raw[cursor..start].to_string()));
        }
        out.push(Chunk::Html("<em>".to_string()));
        out.push(Chunk::Raw(raw[start + marker.len()..end].to_string()));
        out.push(Chunk::Html("</em>".to_string()));
        cursor = end + marker.len();
    }
    if cursor < raw.len() || out.is_empty() {
        out.push(Chunk::Raw(raw[cursor..].to_string()));
    }
    out
}

fn find_italic_marker(raw: &str, from: usize, marker: &str) -> Option<usize> {
    let mut at = from;
    while let Some(rel) = raw[at..].find(marker) {
        let idx = at + rel;
        if idx > 0 && raw.as_bytes()[idx - 1] == b':' {
            at = idx + marker.len();
            continue;
        }
        return Some(idx);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .map(|c| match c {
                Chunk::Raw(s) => s.as_str(),
                Chunk::Html(s) => s.as_str(),
            })
            .collect()
    }

    #[test]
    fn dialect_kind_parses_case_insensitively() {
        assert_eq!("Creole".parse::<DialectKind>().unwrap(), DialectKind::Creole);
        assert_eq!("md".parse::<DialectKind>().unwrap(), DialectKind::Markdown);
        assert_eq!("MediaWiki".parse::<DialectKind>().unwrap(), DialectKind::MediaWiki);
        assert!("textile".parse::<DialectKind>().is_err());
    }

    #[test]
    fn mediawiki_overrides_bold_and_italic_tokens() {
        let mw = DialectKind::MediaWiki.dialect();
        let creole = DialectKind::Creole.dialect();
        assert_eq!(mw.tokens.bold.start, "'''");
        assert_eq!(mw.tokens.italic.start, "''");
        assert_eq!(creole.tokens.bold.start, "**");
        assert_eq!(creole.tokens.italic.start, "//");
        // after normalization both dialects share the escape/image shapes.
        assert_eq!(mw.tokens.nowiki, creole.tokens.nowiki);
        assert_eq!(mw.tokens.image, creole.tokens.image);
    }

    #[test]
    fn mediawiki_five_quote_run_is_bold_italic() {
        let mw = DialectKind::MediaWiki.dialect();
        let chunks = (mw.render_bold)(&mw.tokens, "'''''both''''' and '''bold'''");
        let html = joined(&chunks);
        assert_eq!(html, "<strong><em>both</em></strong> and <strong>bold</strong>");
    }

    #[test]
    fn creole_italic_skips_url_scheme_separators() {
        let creole = DialectKind::Creole.dialect();
        let chunks = (creole.render_italic)(&creole.tokens, "see http://a and http://b");
        assert_eq!(joined(&chunks), "see http://a and http://b");

        let chunks = (creole.render_italic)(&creole.tokens, "an //italic// word");
        assert_eq!(joined(&chunks), "an <em>italic</em> word");
    }
}
