//! Link and image resolution protocol.
//!
//! The inline renderer raises one event per recognized link or image token
//! and lets the host rewrite the destination before the tag is emitted. This
//! keeps page lookup, attachment paths, and external-URL policy out of the
//! renderer: it forwards the raw target verbatim (including `attachment:`
//! prefixes) and performs no I/O of its own.
//!
//! Events are synchronous and single-shot: one event per token match, raised
//! on the calling thread, never batched or re-entered.

use thiserror::Error;

/// Error type host resolvers may fail with.
pub type ResolverError = Box<dyn std::error::Error + Send + Sync>;

/// Render failure. Malformed markup never produces one of these; the only
/// failures are host resolver errors, which are propagated rather than
/// swallowed so the host can observe its own defects.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("link resolver failed for target `{target}`")]
    LinkResolver {
        target: String,
        #[source]
        source: ResolverError,
    },

    #[error("image resolver failed for source `{src}`")]
    ImageResolver {
        src: String,
        #[source]
        source: ResolverError,
    },
}

/// Raised when a link token is recognized.
///
/// `raw_target` and `text` describe the source markup and are never modified
/// by the renderer. `href`, `target`, and `title` are the output fields: the
/// resolver may rewrite them, and `href` starts out equal to `raw_target` so
/// an unhandled event passes the raw target through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
    pub raw_target: String,
    pub text: Option<String>,
    pub href: String,
    /// `target` attribute for the emitted anchor (e.g. `_blank`).
    pub target: Option<String>,
    pub title: Option<String>,
}

impl LinkEvent {
    /// Build an event for `raw_target`, with `href` initialized for
    /// pass-through.
    pub fn new(raw_target: &str, text: Option<&str>) -> Self {
        Self {
            raw_target: raw_target.to_string(),
            text: text.map(str::to_string),
            href: raw_target.to_string(),
            target: None,
            title: None,
        }
    }
}

/// Raised when an image token is recognized. Same pass-through contract as
/// [`LinkEvent`]: `src` starts out equal to `raw_src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEvent {
    pub raw_src: String,
    pub alt: String,
    pub src: String,
    pub title: Option<String>,
}

impl ImageEvent {
    /// Build an event for `raw_src`, with `src` initialized for
    /// pass-through.
    pub fn new(raw_src: &str, caption: Option<&str>) -> Self {
        Self {
            raw_src: raw_src.to_string(),
            alt: caption.unwrap_or(raw_src).to_string(),
            src: raw_src.to_string(),
            title: None,
        }
    }
}

/// Host-supplied target resolution, attached before rendering and invoked
/// zero or more times per render call. Both methods default to pass-through.
pub trait LinkResolver {
    fn resolve_link(&mut self, _event: &mut LinkEvent) -> Result<(), ResolverError> {
        Ok(())
    }

    fn resolve_image(&mut self, _event: &mut ImageEvent) -> Result<(), ResolverError> {
        Ok(())
    }
}

/// The default resolver: every raw target passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl LinkResolver for PassThrough {}
