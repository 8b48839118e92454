//! Node types and the containment schema.
//!
//! The schema is a static table: for every [`NodeType`] it records whether
//! the type may hold text directly, which kinds of children it accepts, and
//! which node gets inserted implicitly when content arrives that it cannot
//! hold. [`describe`] is an exhaustive `match`, so a new variant does not
//! compile until it has been classified.

use crate::error::Error;
use crate::node::Node;
use rustc_hash::FxBuildHasher as FastHashBuilder;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Every node type the document model knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    /// Document root.
    Doc,
    Paragraph,
    /// Block quote.
    Quote,
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableRow,
    /// Table cell; header cells carry `is_header = true`.
    TableCell,
    Heading,
    /// Text leaf, the only node carrying marks and a text payload.
    Text,
    Image,
    Preformatted,
    CodeBlock,
    Footnote,
    HardBreak,
    HorizontalRule,
    /// Link to an anchor on the current page.
    LocalLink,
    /// Link to another page of the same wiki.
    InternalLink,
    ExternalLink,
    InterwikiLink,
    EmailLink,
    /// Raw syntax of a markup plugin, kept verbatim.
    Plugin,
}

impl NodeType {
    /// All node types, in declaration order.
    pub const ALL: [NodeType; 23] = [
        NodeType::Doc,
        NodeType::Paragraph,
        NodeType::Quote,
        NodeType::BulletList,
        NodeType::OrderedList,
        NodeType::ListItem,
        NodeType::Table,
        NodeType::TableRow,
        NodeType::TableCell,
        NodeType::Heading,
        NodeType::Text,
        NodeType::Image,
        NodeType::Preformatted,
        NodeType::CodeBlock,
        NodeType::Footnote,
        NodeType::HardBreak,
        NodeType::HorizontalRule,
        NodeType::LocalLink,
        NodeType::InternalLink,
        NodeType::ExternalLink,
        NodeType::InterwikiLink,
        NodeType::EmailLink,
        NodeType::Plugin,
    ];

    /// Schema entry for this type.
    #[inline]
    pub fn spec(self) -> &'static NodeSpec {
        &SCHEMA[self as usize]
    }

    /// Name used in the serialized document.
    #[inline]
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Whether a text leaf may be a direct child of this type.
    #[inline]
    pub fn can_hold_text(self) -> bool {
        self.spec().can_hold_text
    }

    /// Whether `child` may be a direct child of this type.
    #[inline]
    pub fn accepts(self, child: NodeType) -> bool {
        self.spec().accepts_group(child.spec().group)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        by_name()
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownNodeType(name.to_string()))
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Role a node plays when it appears as somebody's child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// Only the document root.
    Root,
    Block,
    /// Text and inline nodes (links, images, breaks, footnotes).
    Inline,
    ListItem,
    TableRow,
    TableCell,
    /// A type the schema does not know; accepted by every container.
    Opaque,
}

/// Which children a node type accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    /// Block nodes.
    Blocks,
    /// Text and inline nodes.
    Inline,
    /// Children of exactly one group.
    Only(Group),
    /// No children at all.
    Leaf,
    /// Anything.
    Any,
}

/// One row of the schema table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpec {
    /// Serialized type name.
    pub name: &'static str,
    /// Whether text leaves may be direct children.
    pub can_hold_text: bool,
    /// Group this type belongs to as a child.
    pub group: Group,
    /// Children this type accepts.
    pub content: Content,
    /// Node opened implicitly when this type rejects a leaf.
    pub wrapper: Option<NodeType>,
}

impl NodeSpec {
    /// Entry for node type names the schema does not know.
    ///
    /// Unknown types are treated permissively: they accept any child, are
    /// accepted by any container, and never get a wrapper. This keeps
    /// validation of serialized trees working when the producer grows new
    /// node types before the schema does.
    pub const OPAQUE: NodeSpec = NodeSpec {
        name: "",
        can_hold_text: true,
        group: Group::Opaque,
        content: Content::Any,
        wrapper: None,
    };

    /// Whether a child of `group` may appear directly under this type.
    pub fn accepts_group(&self, group: Group) -> bool {
        match self.content {
            Content::Leaf => false,
            Content::Any => true,
            _ if group == Group::Opaque => true,
            Content::Blocks => group == Group::Block,
            Content::Inline => group == Group::Inline,
            Content::Only(only) => group == only,
        }
    }
}

const fn container(name: &'static str, group: Group, content: Content) -> NodeSpec {
    NodeSpec {
        name,
        can_hold_text: false,
        group,
        content,
        wrapper: Some(NodeType::Paragraph),
    }
}

const fn textblock(name: &'static str, group: Group) -> NodeSpec {
    NodeSpec {
        name,
        can_hold_text: true,
        group,
        content: Content::Inline,
        wrapper: None,
    }
}

const fn leaf(name: &'static str, group: Group) -> NodeSpec {
    NodeSpec {
        name,
        can_hold_text: false,
        group,
        content: Content::Leaf,
        wrapper: None,
    }
}

/// Classify a node type.
pub const fn describe(ty: NodeType) -> NodeSpec {
    use Content::{Blocks, Only};
    use Group::{Block, Inline};

    match ty {
        NodeType::Doc => container("doc", Group::Root, Blocks),
        NodeType::Paragraph => textblock("paragraph", Block),
        NodeType::Quote => container("quote", Block, Blocks),
        NodeType::BulletList => container("bullet_list", Block, Only(Group::ListItem)),
        NodeType::OrderedList => container("ordered_list", Block, Only(Group::ListItem)),
        NodeType::ListItem => container("list_item", Group::ListItem, Blocks),
        NodeType::Table => container("table", Block, Only(Group::TableRow)),
        NodeType::TableRow => container("table_row", Group::TableRow, Only(Group::TableCell)),
        NodeType::TableCell => container("table_cell", Group::TableCell, Blocks),
        NodeType::Heading => textblock("heading", Block),
        NodeType::Text => leaf("text", Inline),
        NodeType::Image => leaf("image", Inline),
        NodeType::Preformatted => textblock("preformatted", Block),
        NodeType::CodeBlock => textblock("code_block", Block),
        NodeType::Footnote => container("footnote", Inline, Blocks),
        NodeType::HardBreak => leaf("hard_break", Inline),
        NodeType::HorizontalRule => leaf("horizontal_rule", Block),
        NodeType::LocalLink => textblock("locallink", Inline),
        NodeType::InternalLink => textblock("internallink", Inline),
        NodeType::ExternalLink => textblock("externallink", Inline),
        NodeType::InterwikiLink => textblock("interwikilink", Inline),
        NodeType::EmailLink => textblock("emaillink", Inline),
        NodeType::Plugin => textblock("dwplugin", Inline),
    }
}

const fn build_table() -> [NodeSpec; NodeType::ALL.len()] {
    let mut table = [NodeSpec::OPAQUE; NodeType::ALL.len()];
    let mut i = 0;
    while i < NodeType::ALL.len() {
        table[i] = describe(NodeType::ALL[i]);
        i += 1;
    }
    table
}

/// The schema table, indexed by `NodeType as usize`.
pub static SCHEMA: [NodeSpec; NodeType::ALL.len()] = build_table();

fn by_name() -> &'static HashMap<&'static str, NodeType, FastHashBuilder> {
    static INDEX: OnceLock<HashMap<&'static str, NodeType, FastHashBuilder>> = OnceLock::new();
    INDEX.get_or_init(|| NodeType::ALL.iter().map(|&ty| (ty.name(), ty)).collect())
}

/// Look up a schema entry by serialized type name.
///
/// Unknown names resolve to [`NodeSpec::OPAQUE`].
pub fn lookup(name: &str) -> &'static NodeSpec {
    match by_name().get(name) {
        Some(ty) => ty.spec(),
        None => &NodeSpec::OPAQUE,
    }
}

/// A child that its parent's content rule does not allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Child indices from the root down to the offending child.
    pub path: Vec<usize>,
    pub parent: String,
    pub child: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` may not contain `{}` at {:?}", self.parent, self.child, self.path)
    }
}

/// Check every parent/child pair of an assembled tree against the schema.
pub fn validate(root: &Node) -> Vec<Violation> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    validate_node(root, &mut path, &mut out);
    out
}

fn validate_node(node: &Node, path: &mut Vec<usize>, out: &mut Vec<Violation>) {
    for (i, child) in node.content().iter().enumerate() {
        path.push(i);
        if !node.kind().accepts(child.kind()) {
            out.push(Violation {
                path: path.clone(),
                parent: node.kind().name().to_string(),
                child: child.kind().name().to_string(),
            });
        }
        validate_node(child, path, out);
        path.pop();
    }
}

/// Check a serialized document (ProseMirror JSON) against the schema.
///
/// Works on names rather than [`NodeType`], so types the schema does not
/// know are accepted through [`NodeSpec::OPAQUE`].
pub fn validate_value(root: &serde_json::Value) -> Vec<Violation> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    validate_json(root, &mut path, &mut out);
    out
}

fn json_type(value: &serde_json::Value) -> &str {
    value.get("type").and_then(serde_json::Value::as_str).unwrap_or("")
}

fn validate_json(value: &serde_json::Value, path: &mut Vec<usize>, out: &mut Vec<Violation>) {
    let Some(children) = value.get("content").and_then(serde_json::Value::as_array) else {
        return;
    };
    let parent = json_type(value);
    let spec = lookup(parent);
    for (i, child) in children.iter().enumerate() {
        path.push(i);
        let name = json_type(child);
        if !spec.accepts_group(lookup(name).group) {
            out.push(Violation {
                path: path.clone(),
                parent: parent.to_string(),
                child: name.to_string(),
            });
        }
        validate_json(child, path, out);
        path.pop();
    }
}
