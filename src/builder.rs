//! Event-to-tree assembly.
//!
//! [`TreeBuilder`] keeps the stack of open nodes, rooted at a single `doc`.
//! Open nodes are owned by the stack and attached to their parent when
//! they close, so the parent's last child slot is always the open node
//! above it. Nothing is ever reparented: a node is appended exactly once.
//!
//! Recovery is part of the contract:
//! - text arriving under a container that cannot hold it opens the
//!   container's wrapper (a `paragraph`) first;
//! - `close` sweeps off every node above its target;
//! - closing a type that is not open changes nothing.

use crate::error::Result;
use crate::node::{AttrValue, Mark, MarkSet, MarkType, Node};
use crate::schema::NodeType;

const LOG_TARGET: &str = "prosetree::builder";

/// A node on the open stack plus the bookkeeping it collects while open.
#[derive(Debug, Clone)]
struct OpenNode {
    node: Node,
    /// Sum of child cell colspans, for `table_row`.
    columns: u32,
}

impl OpenNode {
    fn new(node: Node) -> Self {
        Self { node, columns: 0 }
    }

    /// Apply close-time attribute writes.
    fn finish(mut self) -> Node {
        if self.node.kind() == NodeType::TableRow {
            self.node.set_attr("columns", self.columns);
        }
        self.node
    }
}

/// Handle to a node that was just closed.
///
/// This is the only way to change a node after it has left the stack, and
/// it lives only until the next builder call.
#[derive(Debug)]
pub struct Finalize<'a> {
    node: &'a mut Node,
}

impl Finalize<'_> {
    pub fn node(&self) -> &Node {
        self.node
    }

    /// Record a bookkeeping attribute on the closed node.
    pub fn set_attr(&mut self, key: &str, value: impl Into<AttrValue>) -> &mut Self {
        self.node.set_attr(key, value);
        self
    }
}

/// Assembles a document tree from open/close/text calls.
///
/// One builder per document. All state (the open stack and the active
/// marks) lives in the instance.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    stack: Vec<OpenNode>,
    marks: MarkSet,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create a builder holding an empty `doc`.
    pub fn new() -> Self {
        Self {
            stack: vec![OpenNode::new(Node::new(NodeType::Doc))],
            marks: MarkSet::new(),
        }
    }

    /// Open `node` as the last child of the current node and make it current.
    ///
    /// The node must not have children yet. No schema check happens here;
    /// containment is enforced lazily when leaves arrive.
    pub fn push_open(&mut self, node: Node) {
        debug_assert!(node.content().is_empty(), "push_open takes a childless node");

        if node.kind() == NodeType::TableCell {
            let colspan = node
                .attr("colspan")
                .and_then(AttrValue::as_int)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(1);
            // Credit the nearest open row, even when an earlier cell was
            // never closed.
            if let Some(row) = self
                .stack
                .iter_mut()
                .rev()
                .find(|open| open.node.kind() == NodeType::TableRow)
            {
                row.columns = row.columns.saturating_add(colspan);
            }
        }

        log::trace!(target: LOG_TARGET, "open {} at depth {}", node.kind(), self.stack.len());
        self.stack.push(OpenNode::new(node));
    }

    /// Append a complete node under the current node without opening it.
    ///
    /// If the current node rejects the leaf and has a default wrapper that
    /// accepts it, the wrapper is opened first and stays open afterwards.
    /// Otherwise the leaf is appended as is.
    pub fn add_leaf(&mut self, node: Node) {
        let parent = self.current().kind();
        if !parent.accepts(node.kind()) {
            match parent.spec().wrapper {
                Some(wrapper) if wrapper.accepts(node.kind()) => {
                    log::debug!(
                        target: LOG_TARGET,
                        "implicit {wrapper} opened in {parent} for {}",
                        node.kind()
                    );
                    self.push_open(Node::new(wrapper));
                }
                _ => {
                    log::debug!(
                        target: LOG_TARGET,
                        "{} appended to {parent} outside the schema",
                        node.kind()
                    );
                }
            }
        }
        self.top_mut().node.push_child(node);
    }

    /// Emit a text run carrying the currently active marks.
    ///
    /// The marks are copied; changing them later does not affect text that
    /// was already emitted. Empty text is ignored.
    pub fn emit_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.add_leaf(Node::new_text(text).with_marks(&self.marks));
    }

    /// Close the nearest open node of type `kind` and everything above it.
    ///
    /// Returns a handle to the closed node for final attribute writes, or
    /// `None` (leaving the stack untouched) when no such node is open. The
    /// root is never closed.
    pub fn close(&mut self, kind: NodeType) -> Option<Finalize<'_>> {
        let Some(index) = (1..self.stack.len())
            .rev()
            .find(|&i| self.stack[i].node.kind() == kind)
        else {
            log::warn!(target: LOG_TARGET, "close({kind}) with no open {kind}; ignored");
            return None;
        };

        while self.stack.len() > index {
            self.pop();
        }

        self.stack[index - 1]
            .node
            .last_child_mut()
            .map(|node| Finalize { node })
    }

    fn pop(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(open) = self.stack.pop() {
            let node = open.finish();
            log::trace!(target: LOG_TARGET, "close {} at depth {}", node.kind(), self.stack.len());
            self.top_mut().node.push_child(node);
        }
    }

    /// The node currently receiving content.
    pub fn current(&self) -> &Node {
        &self.top().node
    }

    /// Number of open nodes, including the root.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Types of the open nodes, root first.
    pub fn open_path(&self) -> impl Iterator<Item = NodeType> + '_ {
        self.stack.iter().map(|open| open.node.kind())
    }

    /// Whether a node of type `kind` is open (the root included).
    pub fn is_open(&self, kind: NodeType) -> bool {
        self.open_path().any(|k| k == kind)
    }

    /// Turn a mark on. Already-active marks stay as they are.
    pub fn activate_mark(&mut self, kind: MarkType) {
        if !self.is_mark_active(kind) {
            self.marks.push(Mark::new(kind));
        }
    }

    /// Turn a mark off. Inactive marks are ignored.
    pub fn deactivate_mark(&mut self, kind: MarkType) {
        self.marks.retain(|mark| mark.kind() != kind);
    }

    pub fn is_mark_active(&self, kind: MarkType) -> bool {
        self.marks.iter().any(|mark| mark.kind() == kind)
    }

    /// Active marks in activation order.
    pub fn active_marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Snapshot of the document, including nodes that are still open.
    ///
    /// Open nodes are closed in the copy only, so the builder can keep
    /// going and repeated calls return equal trees.
    pub fn serialize(&self) -> Node {
        fold(self.stack.iter().cloned())
    }

    /// Finish the document, closing whatever is still open.
    pub fn into_document(self) -> Node {
        fold(self.stack.into_iter())
    }

    /// Serialize the current document to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let doc = self.serialize();
        let json = if pretty {
            serde_json::to_string_pretty(&doc)?
        } else {
            serde_json::to_string(&doc)?
        };
        Ok(json)
    }

    #[inline]
    fn top(&self) -> &OpenNode {
        // The root is never popped, so the stack is never empty.
        &self.stack[self.stack.len() - 1]
    }

    #[inline]
    fn top_mut(&mut self) -> &mut OpenNode {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }
}

/// Close an open stack (root first) into a single tree.
fn fold(stack: impl DoubleEndedIterator<Item = OpenNode>) -> Node {
    let mut child: Option<Node> = None;
    for open in stack.rev() {
        let mut node = open.finish();
        if let Some(c) = child.take() {
            node.push_child(c);
        }
        child = Some(node);
    }
    child.unwrap_or_else(|| Node::new(NodeType::Doc))
}
