//! prosetree: markup events to ProseMirror document trees
//!
//! This crate assembles the flat open/close/text event stream of a markup
//! parser into a well-formed document tree and serializes it as
//! ProseMirror JSON.
//!
//! # Design Principles
//! - Stack discipline: one open-ancestor stack rooted at `doc`
//! - Lazy schema checks: text under a container opens an implicit paragraph
//! - Forgiving close: closing a node sweeps everything above it; closing
//!   something that is not open is ignored
//! - No global state: marks and the stack belong to one builder
//!
//! The [`TreeBuilder`] is the core. [`DocumentRenderer`] maps
//! [`MarkupEvent`]s onto it.

pub mod builder;
pub mod error;
pub mod event;
pub mod node;
pub mod render;
pub mod schema;

// Re-export primary types
pub use builder::{Finalize, TreeBuilder};
pub use error::{Error, Result};
pub use event::{Alignment, Cell, LinkLabel, MarkupEvent, Media};
pub use node::{AttrValue, Mark, MarkType, Node};
pub use render::DocumentRenderer;
pub use schema::NodeType;

/// Rendering options.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Replace newlines with spaces in text emitted directly into a
    /// paragraph or footnote.
    pub collapse_newlines: bool,
    /// Trim surrounding whitespace of code blocks.
    pub trim_code: bool,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            collapse_newlines: true,
            trim_code: true,
            pretty: true,
        }
    }
}

/// Assemble a document from markup events.
///
/// # Example
/// ```
/// use prosetree::{MarkupEvent, NodeType};
///
/// let doc = prosetree::assemble(&[
///     MarkupEvent::BulletListOpen,
///     MarkupEvent::ListItemOpen { level: 1 },
///     MarkupEvent::Text { text: "item".into() },
///     MarkupEvent::ListItemClose,
///     MarkupEvent::BulletListClose,
/// ]);
/// let item = &doc.content()[0].content()[0];
/// assert_eq!(item.content()[0].kind(), NodeType::Paragraph);
/// ```
pub fn assemble(events: &[MarkupEvent]) -> Node {
    assemble_with_options(events, &Options::default())
}

/// Assemble a document from markup events with options.
pub fn assemble_with_options(events: &[MarkupEvent], options: &Options) -> Node {
    let mut renderer = DocumentRenderer::with_options(*options);
    renderer.render_all(events);
    renderer.finish()
}

/// Convert markup events to ProseMirror JSON.
pub fn to_json(events: &[MarkupEvent]) -> Result<String> {
    to_json_with_options(events, &Options::default())
}

/// Convert markup events to ProseMirror JSON with options.
pub fn to_json_with_options(events: &[MarkupEvent], options: &Options) -> Result<String> {
    let mut renderer = DocumentRenderer::with_options(*options);
    renderer.render_all(events);
    renderer.to_json()
}
