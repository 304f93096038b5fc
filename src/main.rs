use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use wiki2html::{
    convert_all_in_dirs, convert_file, ConvertOptions, DialectKind, ImageEvent, LinkEvent,
    LinkResolver, ResolverError,
};

/// Convert wiki markup files to HTML.
#[derive(Debug, Parser)]
#[command(name = "wiki2html", version)]
struct Cli {
    /// Markup file to convert (omit when using --all).
    input: Option<PathBuf>,

    /// Markup dialect of the input: creole, markdown, or mediawiki.
    #[arg(long, default_value = "creole")]
    dialect: DialectKind,

    /// Insert a table of contents at the {TOC} placeholder.
    #[arg(long)]
    toc: bool,

    /// Write a JSON heading outline next to the HTML output.
    #[arg(long)]
    outline: bool,

    /// Output file; defaults to stdout in single-file mode.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Convert every .wiki file under --src-root into --out-root.
    #[arg(long)]
    all: bool,

    #[arg(long, default_value = "docs/wiki")]
    src_root: PathBuf,

    #[arg(long, default_value = "docs/html")]
    out_root: PathBuf,

    /// Base path prepended to attachment: link and image targets.
    #[arg(long, default_value = "/attachments")]
    attachments_base: String,
}

/// Resolves targets the way the generated site is laid out: `attachment:`
/// targets are served from a configurable base path, external URLs pass
/// through (opening in a new tab), and internal page titles map to
/// `Title_With_Underscores.html` files beside the current page.
#[derive(Debug)]
struct SiteResolver {
    attachments_base: String,
}

impl SiteResolver {
    fn attachment_path(&self, raw: &str) -> Option<String> {
        let rest = raw.strip_prefix("attachment:")?;
        let rest = rest.trim_start_matches('/');
        Some(format!(
            "{}/{}",
            self.attachments_base.trim_end_matches('/'),
            rest
        ))
    }
}

impl LinkResolver for SiteResolver {
    fn resolve_link(&mut self, event: &mut LinkEvent) -> Result<(), ResolverError> {
        if let Some(href) = self.attachment_path(&event.raw_target) {
            event.href = href;
        } else if event.raw_target.starts_with("http://")
            || event.raw_target.starts_with("https://")
        {
            event.target = Some("_blank".to_string());
        } else if !event.raw_target.starts_with('#') {
            event.href = format!("{}.html", event.raw_target.trim().replace(' ', "_"));
        }
        Ok(())
    }

    fn resolve_image(&mut self, event: &mut ImageEvent) -> Result<(), ResolverError> {
        if let Some(src) = self.attachment_path(&event.raw_src) {
            event.src = src;
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut resolver = SiteResolver {
        attachments_base: cli.attachments_base.clone(),
    };
    let opts = ConvertOptions {
        insert_toc: cli.toc,
        write_outline: cli.outline,
    };

    if cli.all {
        convert_all_in_dirs(&cli.src_root, &cli.out_root, cli.dialect, &mut resolver, &opts)?;
        return Ok(());
    }

    let Some(input) = cli.input.as_deref() else {
        return Err("provide an input file, or --all to convert a directory tree".into());
    };

    match cli.out.as_deref() {
        Some(out) => {
            convert_file(input, out, cli.dialect, &mut resolver, &opts)?;
        }
        None => {
            let markup = fs::read_to_string(input)?;
            let mut html = wiki2html::to_html_with(&markup, cli.dialect, &mut resolver)?;
            if cli.toc {
                html = wiki2html::insert_toc(&html)?;
            }
            println!("{}", html);
        }
    }

    Ok(())
}
