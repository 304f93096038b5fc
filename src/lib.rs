//! Wiki markup -> HTML conversion and table-of-contents generation.
//!
//! The core is two independent pipelines:
//! 1. markup text -> (MediaWiki normalization, if selected) -> block
//!    renderer -> inline renderer -> HTML fragment, with link/image targets
//!    resolved through a host-supplied [`LinkResolver`];
//! 2. HTML fragment -> heading tree -> ToC markup + anchor injection at the
//!    `{TOC}` placeholder.
//!
//! Both pipelines are synchronous, perform no I/O, and keep all scratch
//! state per call; the dialect tables are the only shared data and are
//! immutable. Result caching (e.g. rendered HTML per page version) is the
//! caller's business.

pub mod dialect;
pub mod links;
pub mod mediawiki;
pub mod render;
pub mod toc;

pub use dialect::{Dialect, DialectKind, Token, Tokens};
pub use links::{ImageEvent, LinkEvent, LinkResolver, PassThrough, RenderError, ResolverError};
pub use toc::{insert_toc, HeadingTree, TocError, TocTemplate, TOC_TOKEN};

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

/// Render markup to an HTML fragment with the default pass-through
/// resolver: link and image targets are emitted unchanged.
///
/// Never fails: malformed markup degrades to escaped literal text, and the
/// empty string renders to the empty string.
pub fn to_html(text: &str, dialect: DialectKind) -> String {
    // the pass-through resolver cannot fail, so neither can this.
    to_html_with(text, dialect, &mut PassThrough).unwrap_or_default()
}

/// Render markup to an HTML fragment, resolving link and image targets
/// through `resolver`. Resolver failures propagate; nothing else fails.
pub fn to_html_with(
    text: &str,
    dialect: DialectKind,
    resolver: &mut dyn LinkResolver,
) -> Result<String, RenderError> {
    let normalized;
    let text = if dialect == DialectKind::MediaWiki {
        normalized = mediawiki::normalize(text);
        normalized.as_str()
    } else {
        text
    };
    render::render_blocks(text, dialect.dialect(), resolver)
}

/// Options controlling how HTML files are written on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Insert a table of contents at the `{TOC}` placeholder after
    /// rendering.
    pub insert_toc: bool,

    /// Write a JSON heading outline next to the HTML output.
    pub write_outline: bool,
}

/// Single file mode: read a markup file, render it, and write the HTML to
/// `dest`. Returns the HTML written.
pub fn convert_file(
    src: &Path,
    dest: &Path,
    dialect: DialectKind,
    resolver: &mut dyn LinkResolver,
    opts: &ConvertOptions,
) -> Result<String, Box<dyn Error>> {
    let markup = read_markup(src)?;
    let mut html = to_html_with(&markup, dialect, resolver)?;
    if opts.insert_toc {
        html = toc::insert_toc(&html)?;
    }

    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, &html)?;

    if opts.write_outline {
        let mut outline = toc::outline(&html);
        outline.source.path = Some(src.to_string_lossy().to_string());
        let json_path = dest.with_extension("json");
        fs::write(&json_path, serde_json::to_string_pretty(&outline)?)?;
    }

    Ok(html)
}

/// Bulk mode: walk `src_root` for `.wiki` files and convert each one into
/// the matching path under `out_root`, preserving the relative directory
/// structure. Returns the number of files converted.
pub fn convert_all_in_dirs(
    src_root: &Path,
    out_root: &Path,
    dialect: DialectKind,
    resolver: &mut dyn LinkResolver,
    opts: &ConvertOptions,
) -> Result<usize, Box<dyn Error>> {
    let start_time = Instant::now();

    if !src_root.exists() {
        return Err(format!("markup source directory not found: {}", src_root.display()).into());
    }

    let mut entries: Vec<_> = WalkDir::new(src_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "wiki")
        })
        .collect();

    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let total = entries.len();
    let mut count = 0;

    for entry in entries {
        let path = entry.path();
        // keep the same relative structure under the output root.
        let relative = path.strip_prefix(src_root)?;
        let mut dest = out_root.join(relative);
        dest.set_extension("html");

        convert_file(path, &dest, dialect, resolver, opts)?;
        count += 1;

        let elapsed = start_time.elapsed();
        let total_ms = elapsed.as_millis();
        let mins = total_ms / 60_000;
        let secs = (total_ms % 60_000) / 1_000;
        let ms = total_ms % 1_000;
        eprintln!(
            "[{:>4}/{:>4}] [{:02}:{:02}.{:03}] Converted: {:?}",
            count, total, mins, secs, ms, dest
        );
    }

    eprintln!(
        "Done. Converted {} files in {:.3}s.",
        count,
        start_time.elapsed().as_secs_f64()
    );
    Ok(count)
}

fn read_markup(path: &Path) -> Result<String, Box<dyn Error>> {
    let bytes = fs::read(path)?;

    // if we ever encounter invalid UTF-8, fall back to lossy conversion
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(&e.into_bytes()).to_string()))
}
