//! Markup -> HTML block renderer.
//!
//! Splits the input into lines and drives the inline renderer per content
//! region. Block state is a small stack of open lists plus the current
//! paragraph buffer; both are allocated fresh per call. Every opened block
//! element is closed by end of input, even when the source text stops in the
//! middle of a list or paragraph.

pub(crate) mod inline;

use crate::dialect::{Dialect, Tokens};
use crate::links::{LinkResolver, RenderError};
use inline::InlineRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    fn open_tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "<ul><li>",
            ListKind::Numbered => "<ol><li>",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "</li></ul>",
            ListKind::Numbered => "</li></ol>",
        }
    }
}

pub(crate) fn render_blocks(
    text: &str,
    dialect: &'static Dialect,
    resolver: &mut dyn LinkResolver,
) -> Result<String, RenderError> {
    let tokens = &dialect.tokens;
    let mut renderer = InlineRenderer::new(dialect, resolver);
    let lines: Vec<&str> = text.lines().collect();

    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut lists: Vec<ListKind> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    let mut i = 0usize;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph(&mut out, &mut paragraph, &mut renderer)?;
            close_lists(&mut out, &mut lists);
            i += 1;
            continue;
        }

        // block-level verbatim region: marker lines bracket a <pre> body.
        if trimmed == tokens.nowiki.start {
            flush_paragraph(&mut out, &mut paragraph, &mut renderer)?;
            close_lists(&mut out, &mut lists);
            let mut body: Vec<&str> = Vec::new();
            i += 1;
            while i < lines.len() && lines[i].trim() != tokens.nowiki.end {
                body.push(lines[i]);
                i += 1;
            }
            if i < lines.len() {
                i += 1; // consume the closing marker line
            }
            out.push_str("<pre>");
            out.push_str(&inline::encode_text(&body.join("\n")));
            out.push_str("</pre>\n");
            continue;
        }

        if trimmed == "----" {
            flush_paragraph(&mut out, &mut paragraph, &mut renderer)?;
            close_lists(&mut out, &mut lists);
            out.push_str("<hr />\n");
            i += 1;
            continue;
        }

        if let Some((level, content)) = heading_line(trimmed, tokens.heading) {
            flush_paragraph(&mut out, &mut paragraph, &mut renderer)?;
            close_lists(&mut out, &mut lists);
            out.push_str("<h");
            out.push_str(&level.to_string());
            out.push('>');
            out.push_str(&renderer.render(content)?);
            out.push_str("</h");
            out.push_str(&level.to_string());
            out.push_str(">\n");
            i += 1;
            continue;
        }

        if let Some((depth, kind, content)) = list_line(trimmed, tokens) {
            // a depth-1 run always starts a list; deeper runs only continue
            // an open one, so `**bold**` at line start still renders bold.
            if depth == 1 || !lists.is_empty() {
                flush_paragraph(&mut out, &mut paragraph, &mut renderer)?;
                transition_lists(&mut out, &mut lists, depth, kind);
                out.push_str(&renderer.render(content)?);
                i += 1;
                continue;
            }
        }

        // plain text: paragraphs never interleave with an open list.
        close_lists(&mut out, &mut lists);
        paragraph.push(line);
        i += 1;
    }

    flush_paragraph(&mut out, &mut paragraph, &mut renderer)?;
    close_lists(&mut out, &mut lists);

    while out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

fn flush_paragraph(
    out: &mut String,
    paragraph: &mut Vec<&str>,
    renderer: &mut InlineRenderer<'_>,
) -> Result<(), RenderError> {
    if paragraph.is_empty() {
        return Ok(());
    }
    let text = paragraph.join("\n");
    paragraph.clear();
    out.push_str("<p>");
    out.push_str(&renderer.render(&text)?);
    out.push_str("</p>\n");
    Ok(())
}

fn close_lists(out: &mut String, lists: &mut Vec<ListKind>) {
    if lists.is_empty() {
        return;
    }
    while let Some(kind) = lists.pop() {
        out.push_str(kind.close_tag());
    }
    out.push('\n');
}

fn transition_lists(out: &mut String, lists: &mut Vec<ListKind>, depth: usize, kind: ListKind) {
    while lists.len() > depth {
        if let Some(closed) = lists.pop() {
            out.push_str(closed.close_tag());
        }
    }

    if lists.len() == depth {
        if lists.last() == Some(&kind) {
            out.push_str("</li><li>");
            return;
        }
        // bullet<->numbered switch at the same depth closes and reopens.
        if let Some(closed) = lists.pop() {
            out.push_str(closed.close_tag());
        }
        out.push_str(kind.open_tag());
        lists.push(kind);
        return;
    }

    while lists.len() < depth {
        out.push_str(kind.open_tag());
        lists.push(kind);
    }
}

/// A heading is a 1..=6 run of the heading marker at line start; an optional
/// matching run at line end is trimmed, Creole-style.
fn heading_line(trimmed: &str, marker: char) -> Option<(usize, &str)> {
    let run = trimmed.chars().take_while(|&c| c == marker).count();
    if run == 0 || run > 6 {
        return None;
    }
    let rest = &trimmed[run * marker.len_utf8()..];
    let content = rest.trim_end_matches(marker).trim();
    if content.is_empty() {
        return None;
    }
    Some((run, content))
}

/// A list line is a run of bullet/numbered markers at line start. Depth is
/// the run length and the kind comes from the last marker, so mixed prefixes
/// like `*#` nest a numbered list inside a bulleted one.
fn list_line<'s>(trimmed: &'s str, tokens: &Tokens) -> Option<(usize, ListKind, &'s str)> {
    let mut depth = 0usize;
    let mut idx = 0usize;
    let mut kind = None;
    for ch in trimmed.chars() {
        if ch == tokens.bullet {
            kind = Some(ListKind::Bullet);
        } else if ch == tokens.numbered {
            kind = Some(ListKind::Numbered);
        } else {
            break;
        }
        depth += 1;
        idx += ch.len_utf8();
    }
    let kind = kind?;
    let mut content = &trimmed[idx..];
    if let Some(rest) = content.strip_prefix(' ') {
        content = rest;
    }
    Some((depth, kind, content))
}
