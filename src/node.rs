//! Document nodes, attribute values and marks.
//!
//! A [`Node`] is built in two phases. While it is being constructed or sits
//! on the [`TreeBuilder`](crate::TreeBuilder) stack it can grow; once it has
//! been closed the public API only reads it. The mutating helpers are
//! crate-private and the only mutation reachable from outside after close
//! is [`Finalize`](crate::builder::Finalize).

use crate::error::Error;
use crate::schema::NodeType;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u8> for AttrValue {
    fn from(v: u8) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Attribute map. Sorted so serialized output is stable.
pub type Attrs = BTreeMap<String, AttrValue>;

/// Inline formatting mark types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkType {
    Strong,
    Em,
    Underline,
    Deleted,
    Superscript,
    Subscript,
    /// Monospace.
    Code,
    /// Text that must not be interpreted as markup.
    Unformatted,
}

impl MarkType {
    pub const ALL: [MarkType; 8] = [
        MarkType::Strong,
        MarkType::Em,
        MarkType::Underline,
        MarkType::Deleted,
        MarkType::Superscript,
        MarkType::Subscript,
        MarkType::Code,
        MarkType::Unformatted,
    ];

    /// Name used in the serialized document.
    pub fn name(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Em => "em",
            Self::Underline => "underline",
            Self::Deleted => "deleted",
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
            Self::Code => "code",
            Self::Unformatted => "unformatted",
        }
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MarkType {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mark| mark.name() == name)
            .ok_or_else(|| Error::UnknownMarkType(name.to_string()))
    }
}

impl Serialize for MarkType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for MarkType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A formatting mark applied to a text leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    #[serde(rename = "type")]
    kind: MarkType,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,
}

impl Mark {
    pub fn new(kind: MarkType) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> MarkType {
        self.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }
}

/// Marks carried by one text leaf. Rarely more than a handful.
pub type MarkSet = SmallVec<[Mark; 4]>;

/// A document tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(rename = "type")]
    kind: NodeType,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    content: Vec<Node>,
    #[serde(skip_serializing_if = "SmallVec::is_empty")]
    marks: MarkSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Node {
    /// Create an empty node.
    pub fn new(kind: NodeType) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
            content: Vec::new(),
            marks: MarkSet::new(),
            text: None,
        }
    }

    /// Create an empty node from its serialized type name.
    pub fn named(name: &str) -> Result<Self, Error> {
        name.parse().map(Self::new)
    }

    /// Create an unmarked text leaf.
    pub fn new_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NodeType::Text)
        }
    }

    /// Set an attribute during construction.
    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Append a child during construction.
    pub fn with_child(mut self, child: Node) -> Self {
        self.content.push(child);
        self
    }

    /// Attach marks to a text leaf. Ignored on other node types.
    pub fn with_marks(mut self, marks: &[Mark]) -> Self {
        if self.kind == NodeType::Text {
            self.marks = marks.iter().cloned().collect();
        }
        self
    }

    #[inline]
    pub fn kind(&self) -> NodeType {
        self.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Children, in document order.
    pub fn content(&self) -> &[Node] {
        &self.content
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn has_mark(&self, kind: MarkType) -> bool {
        self.marks.iter().any(|m| m.kind == kind)
    }

    /// Text payload of a text leaf.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Concatenated text of all descendant text leaves.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }

    pub(crate) fn set_attr(&mut self, key: &str, value: impl Into<AttrValue>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    pub(crate) fn push_child(&mut self, child: Node) {
        self.content.push(child);
    }

    pub(crate) fn last_child_mut(&mut self) -> Option<&mut Node> {
        self.content.last_mut()
    }
}
