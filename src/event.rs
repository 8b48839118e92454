//! Markup events consumed by the renderer.
//!
//! Events arrive in parser order. Link and media targets are expected to be
//! resolved already (URLs built, page existence checked); the renderer
//! only maps them onto node attributes.

use crate::node::MarkType;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Horizontal alignment of a table cell or image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    /// CSS class for an image with this alignment.
    pub fn media_class(align: Option<Self>) -> &'static str {
        match align {
            Some(Self::Left) => "medialeft",
            Some(Self::Right) => "mediaright",
            Some(Self::Center) => "mediacenter",
            None => "media",
        }
    }
}

/// Table cell (or header cell) geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cell {
    pub colspan: u32,
    pub rowspan: u32,
    pub align: Option<Alignment>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            colspan: 1,
            rowspan: 1,
            align: None,
        }
    }
}

/// An embedded image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Media {
    /// Media id as written in the markup.
    pub id: String,
    /// Resolved URL.
    pub src: String,
    pub title: Option<String>,
    pub align: Option<Alignment>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub cache: Option<String>,
    pub linking: Option<String>,
}

/// What a link displays: text, or an image.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkLabel {
    Text(String),
    Media(Media),
}

// A label is either a plain JSON string or a media object.
impl<'de> Deserialize<'de> for LinkLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Media(Media),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Self::Text(text),
            Repr::Media(media) => Self::Media(media),
        })
    }
}

impl Serialize for LinkLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Media(media) => media.serialize(serializer),
        }
    }
}

/// Events emitted by the markup parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MarkupEvent {
    DocumentStart,
    DocumentEnd,

    ParagraphOpen,
    ParagraphClose,

    QuoteOpen,
    QuoteClose,

    BulletListOpen,
    BulletListClose,
    OrderedListOpen,
    OrderedListClose,
    ListItemOpen {
        #[serde(default)]
        level: u32,
    },
    ListItemClose,

    TableOpen,
    TableClose,
    TableRowOpen,
    TableRowClose,
    TableCellOpen(Cell),
    TableCellClose,
    TableHeaderOpen(Cell),
    TableHeaderClose,

    /// A complete heading.
    Heading {
        text: String,
        level: u8,
    },

    /// Character data.
    Text {
        text: String,
    },
    Preformatted {
        text: String,
    },
    Code {
        text: String,
        #[serde(default)]
        lang: Option<String>,
    },

    FootnoteOpen,
    FootnoteClose,

    Media(Media),

    /// Anchor on the current page.
    LocalLink {
        hash: String,
        #[serde(default)]
        name: Option<String>,
        /// Id of the page being rendered.
        page: String,
    },
    /// Link to another page.
    InternalLink {
        /// Resolved URL, including query and hash.
        href: String,
        /// Resolved page id.
        page: String,
        /// Page id as written.
        id: String,
        #[serde(default)]
        query: Option<String>,
        #[serde(default)]
        hash: Option<String>,
        #[serde(default)]
        exists: bool,
        /// Display label; defaults to the page id.
        #[serde(default)]
        label: Option<LinkLabel>,
    },
    ExternalLink {
        url: String,
        #[serde(default)]
        label: Option<LinkLabel>,
    },
    InterwikiLink {
        /// Resolved URL.
        url: String,
        /// Wiki shortcut (`wp`, `doku`, ...).
        shortcut: String,
        /// Part after the shortcut.
        reference: String,
        #[serde(default)]
        label: Option<LinkLabel>,
    },
    EmailLink {
        address: String,
        #[serde(default)]
        label: Option<LinkLabel>,
    },

    LineBreak,
    HorizontalRule,

    /// Plugin syntax, kept as raw text.
    Plugin {
        name: String,
        matched: String,
    },

    MarkOpen {
        mark: MarkType,
    },
    MarkClose {
        mark: MarkType,
    },
    /// Text shown without markup interpretation.
    Unformatted {
        text: String,
    },

    // Typography and recognized words. These render as plain text.
    /// Replacement for an entity such as `->` or `(c)`.
    Entity {
        text: String,
    },
    /// Dimensions like `640x480`, written back as `{x}x{y}`.
    MultiplyEntity {
        x: String,
        y: String,
    },
    Acronym {
        text: String,
    },
    Apostrophe,
    SingleQuoteOpening,
    SingleQuoteClosing,
    DoubleQuoteOpening,
    DoubleQuoteClosing,
    /// A CamelCase word recognized as a page link.
    CamelCaseLink {
        link: String,
    },
}
