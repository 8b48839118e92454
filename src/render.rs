//! Markup events to document tree.
//!
//! [`DocumentRenderer`] is the thin layer between a markup parser and the
//! [`TreeBuilder`]: it turns each [`MarkupEvent`] into open/close/text calls
//! and shapes link, media and table attributes.

use crate::Options;
use crate::builder::TreeBuilder;
use crate::event::{Alignment, Cell, LinkLabel, Media, MarkupEvent};
use crate::node::{MarkType, Node};
use crate::schema::NodeType;
use std::borrow::Cow;

/// Renders a stream of markup events into a document.
///
/// # Example
/// ```
/// use prosetree::{DocumentRenderer, MarkupEvent};
///
/// let mut renderer = DocumentRenderer::new();
/// renderer.render(&MarkupEvent::ParagraphOpen);
/// renderer.render(&MarkupEvent::Text { text: "Hello".into() });
/// renderer.render(&MarkupEvent::ParagraphClose);
///
/// let doc = renderer.finish();
/// assert_eq!(doc.text_content(), "Hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    builder: TreeBuilder,
    options: Options,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            builder: TreeBuilder::new(),
            options,
        }
    }

    /// The underlying builder.
    pub fn builder(&self) -> &TreeBuilder {
        &self.builder
    }

    /// Render all events in order.
    pub fn render_all<'a>(&mut self, events: impl IntoIterator<Item = &'a MarkupEvent>) {
        for event in events {
            self.render(event);
        }
    }

    /// Render a single event.
    pub fn render(&mut self, event: &MarkupEvent) {
        match event {
            MarkupEvent::DocumentStart => self.builder = TreeBuilder::new(),
            MarkupEvent::DocumentEnd => {}

            MarkupEvent::ParagraphOpen => self.open(NodeType::Paragraph),
            MarkupEvent::ParagraphClose => self.close(NodeType::Paragraph),
            MarkupEvent::QuoteOpen => self.open(NodeType::Quote),
            MarkupEvent::QuoteClose => self.close(NodeType::Quote),

            MarkupEvent::BulletListOpen => {
                self.close_paragraph();
                self.open(NodeType::BulletList);
            }
            MarkupEvent::BulletListClose => self.close(NodeType::BulletList),
            MarkupEvent::OrderedListOpen => {
                self.close_paragraph();
                self.open(NodeType::OrderedList);
            }
            MarkupEvent::OrderedListClose => self.close(NodeType::OrderedList),
            MarkupEvent::ListItemOpen { .. } => self.open(NodeType::ListItem),
            MarkupEvent::ListItemClose => {
                self.close_paragraph();
                self.close(NodeType::ListItem);
            }

            MarkupEvent::TableOpen => self.open(NodeType::Table),
            MarkupEvent::TableClose => self.close(NodeType::Table),
            MarkupEvent::TableRowOpen => self.open(NodeType::TableRow),
            MarkupEvent::TableRowClose => self.close(NodeType::TableRow),
            MarkupEvent::TableCellOpen(cell) => self.table_cell(cell, false),
            MarkupEvent::TableHeaderOpen(cell) => self.table_cell(cell, true),
            MarkupEvent::TableCellClose | MarkupEvent::TableHeaderClose => {
                self.close(NodeType::TableCell)
            }

            MarkupEvent::Heading { text, level } => {
                self.close_paragraph();
                let heading = Node::new(NodeType::Heading)
                    .with_attr("level", *level)
                    .with_child(Node::new_text(text.as_str()));
                self.builder.add_leaf(heading);
            }

            MarkupEvent::Text { text } => self.cdata(text),
            MarkupEvent::Preformatted { text } => {
                self.open(NodeType::Preformatted);
                self.cdata(text);
                self.close(NodeType::Preformatted);
            }
            MarkupEvent::Code { text, lang } => {
                let mut node = Node::new(NodeType::CodeBlock);
                if let Some(lang) = lang {
                    node = node.with_attr("data-language", lang.as_str());
                }
                self.builder.push_open(node);
                let text = if self.options.trim_code { text.trim() } else { text.as_str() };
                self.cdata(text);
                self.close(NodeType::CodeBlock);
            }

            MarkupEvent::FootnoteOpen => self.open(NodeType::Footnote),
            MarkupEvent::FootnoteClose => self.close(NodeType::Footnote),

            MarkupEvent::Media(media) => self.media(media),

            MarkupEvent::LocalLink { hash, name, page } => {
                let link = Node::new(NodeType::LocalLink)
                    .with_attr("href", format!("#{hash}"))
                    .with_attr("title", format!("{page} \u{21b5}"))
                    .with_attr("class", "wikilink1");
                self.link(link, None, name.as_deref().unwrap_or(hash));
            }
            MarkupEvent::InternalLink {
                href,
                page,
                id,
                query,
                hash,
                exists,
                label,
            } => {
                let class = match label {
                    Some(LinkLabel::Media(_)) => "media",
                    _ if *exists => "wikilink1",
                    _ => "wikilink2",
                };
                let link = Node::new(NodeType::InternalLink)
                    .with_attr("href", href.as_str())
                    .with_attr("title", page.as_str())
                    .with_attr("data-id", id.as_str())
                    .with_attr("data-query", query.as_deref())
                    .with_attr("data-hash", hash.as_deref())
                    .with_attr("class", class);
                let title = match simple_title(id) {
                    "" => simple_title(page),
                    title => title,
                };
                self.link(link, label.as_ref(), title);
            }
            MarkupEvent::ExternalLink { url, label } => {
                let class = match label {
                    Some(LinkLabel::Media(_)) => "media",
                    _ => "urlextern",
                };
                let link = Node::new(NodeType::ExternalLink)
                    .with_attr("href", url.as_str())
                    .with_attr("title", url.as_str())
                    .with_attr("class", class);
                self.link(link, label.as_ref(), url);
            }
            MarkupEvent::InterwikiLink {
                url,
                shortcut,
                reference,
                label,
            } => {
                let link = Node::new(NodeType::InterwikiLink)
                    .with_attr("href", url.as_str())
                    .with_attr(
                        "data-shortcut",
                        html_escape::encode_quoted_attribute(shortcut).into_owned(),
                    )
                    .with_attr(
                        "data-reference",
                        html_escape::encode_quoted_attribute(reference).into_owned(),
                    )
                    .with_attr("title", url.as_str())
                    .with_attr("class", format!("interwikilink interwiki iw_{shortcut}"));
                self.link(link, label.as_ref(), reference);
            }
            MarkupEvent::EmailLink { address, label } => {
                let class = match label {
                    Some(LinkLabel::Media(_)) => "media",
                    _ => "mail",
                };
                let link = Node::new(NodeType::EmailLink)
                    .with_attr("href", format!("mailto:{address}"))
                    .with_attr("class", class)
                    .with_attr("title", address.as_str());
                self.link(link, label.as_ref(), address);
            }

            MarkupEvent::LineBreak => self.builder.add_leaf(Node::new(NodeType::HardBreak)),
            MarkupEvent::HorizontalRule => {
                self.close_paragraph();
                self.builder.add_leaf(Node::new(NodeType::HorizontalRule));
            }

            MarkupEvent::Plugin { name, matched } => {
                log::trace!(target: "prosetree::render", "plugin {name}");
                self.open(NodeType::Plugin);
                self.builder.add_leaf(Node::new_text(matched.as_str()));
                self.close(NodeType::Plugin);
            }

            MarkupEvent::MarkOpen { mark } => self.builder.activate_mark(*mark),
            MarkupEvent::MarkClose { mark } => self.builder.deactivate_mark(*mark),
            MarkupEvent::Unformatted { text } => {
                self.builder.activate_mark(MarkType::Unformatted);
                self.cdata(text);
                self.builder.deactivate_mark(MarkType::Unformatted);
            }

            MarkupEvent::Entity { text }
            | MarkupEvent::Acronym { text }
            | MarkupEvent::CamelCaseLink { link: text } => self.cdata(text),
            MarkupEvent::MultiplyEntity { x, y } => self.cdata(&format!("{x}x{y}")),
            MarkupEvent::Apostrophe
            | MarkupEvent::SingleQuoteOpening
            | MarkupEvent::SingleQuoteClosing => self.cdata("'"),
            MarkupEvent::DoubleQuoteOpening | MarkupEvent::DoubleQuoteClosing => self.cdata("\""),
        }
    }

    /// Snapshot of the document so far.
    pub fn document(&self) -> Node {
        self.builder.serialize()
    }

    /// Finish rendering and return the document.
    pub fn finish(self) -> Node {
        self.builder.into_document()
    }

    /// Serialize the document so far, honoring `Options::pretty`.
    pub fn to_json(&self) -> crate::Result<String> {
        self.builder.to_json(self.options.pretty)
    }

    #[inline]
    fn open(&mut self, kind: NodeType) {
        self.builder.push_open(Node::new(kind));
    }

    #[inline]
    fn close(&mut self, kind: NodeType) {
        self.builder.close(kind);
    }

    /// Close the current node if it is a (possibly implicit) paragraph.
    fn close_paragraph(&mut self) {
        if self.builder.current().kind() == NodeType::Paragraph {
            self.builder.close(NodeType::Paragraph);
        }
    }

    fn cdata(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.builder.current().kind();
        let text = if self.options.collapse_newlines
            && matches!(parent, NodeType::Paragraph | NodeType::Footnote)
        {
            collapse_newlines(text)
        } else {
            Cow::Borrowed(text)
        };
        self.builder.emit_text(&text);
    }

    fn table_cell(&mut self, cell: &Cell, is_header: bool) {
        let cell = Node::new(NodeType::TableCell)
            .with_attr("is_header", is_header)
            .with_attr("colspan", cell.colspan)
            .with_attr("rowspan", cell.rowspan)
            .with_attr("align", cell.align.map(Alignment::as_str));
        self.builder.push_open(cell);
    }

    fn media(&mut self, media: &Media) {
        let image = Node::new(NodeType::Image)
            .with_attr("src", media.src.as_str())
            .with_attr("title", media.title.as_deref())
            .with_attr("class", Alignment::media_class(media.align))
            .with_attr("align", media.align.map(Alignment::as_str))
            .with_attr("width", media.width)
            .with_attr("height", media.height)
            .with_attr("id", media.id.as_str())
            .with_attr("cache", media.cache.as_deref())
            .with_attr("linking", media.linking.as_deref());
        self.builder.add_leaf(image);
    }

    /// Open `link`, render its label (or `fallback` text), close it.
    fn link(&mut self, link: Node, label: Option<&LinkLabel>, fallback: &str) {
        let kind = link.kind();
        self.builder.push_open(link);
        match label {
            Some(LinkLabel::Media(media)) => self.media(media),
            Some(LinkLabel::Text(text)) if !text.is_empty() => self.cdata(text),
            _ => self.cdata(fallback),
        }
        self.close(kind);
    }
}

/// Replace newlines with spaces.
fn collapse_newlines(text: &str) -> Cow<'_, str> {
    if memchr::memchr(b'\n', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace('\n', " "))
}

/// Display title for a page id: its last namespace segment.
fn simple_title(id: &str) -> &str {
    let id = id.split(['?', '#']).next().unwrap_or(id);
    id.rsplit(':').next().unwrap_or(id)
}
