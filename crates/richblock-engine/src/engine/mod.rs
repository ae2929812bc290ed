/*!
 * # Document Engine
 *
 * The engine owns the (Document, Selection) pair and is the only thing that
 * mutates it. Consumers such as the key dispatcher read state through
 * [`DocumentEngine::document`] / [`DocumentEngine::selection`] and request
 * changes through the transform API:
 *
 * - [`DocumentEngine::set_node_type`]: retag matching blocks
 * - [`DocumentEngine::set_node_mark`]: set or clear a mark on matching runs,
 *   optionally splitting runs at the selection edges first
 * - [`DocumentEngine::insert_node`]: insert a block after the current one,
 *   or a run at the caret
 *
 * Every transform is applied atomically and leaves the selection pointing
 * at existing text runs.
 *
 * [`Editor`] is the in-memory implementation. Besides the transform API it
 * carries the default editing behaviours (typing, backspace, caret motion)
 * that the presentation layer falls back on for keys the dispatcher does not
 * suppress.
 */

pub mod editor;
mod motion;
pub mod query;

pub use editor::Editor;
pub use query::selected_leaves;

use crate::model::{BlockType, Document, Mark, Node, NodeRef, Path, Selection};

/// Node predicate used by queries and transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMatch {
    Any,
    Block,
    Text,
    BlockType(BlockType),
    Mark(Mark),
}

impl NodeMatch {
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        match (self, node) {
            (NodeMatch::Any, _) => true,
            (NodeMatch::Block, NodeRef::Block(_)) => true,
            (NodeMatch::Text, NodeRef::Text(_)) => true,
            (NodeMatch::BlockType(kind), NodeRef::Block(block)) => block.kind == *kind,
            (NodeMatch::Mark(mark), NodeRef::Text(run)) => run.has_mark(*mark),
            _ => false,
        }
    }
}

/// Options shared by the `set_node_*` transforms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Split text runs at the selection edges so only selected characters change.
    /// Blocks are never split.
    pub split: bool,
}

impl SetOptions {
    pub fn split() -> Self {
        Self { split: true }
    }
}

/// Restrictions applied to a node query over the selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeQuery {
    /// Only consider block nodes
    pub blocks_only: bool,
    /// Every selected run's branch (the run and its ancestors) must contain a
    /// match, otherwise the query yields nothing
    pub universal: bool,
}

impl NodeQuery {
    pub fn blocks() -> Self {
        Self {
            blocks_only: true,
            universal: false,
        }
    }

    pub fn universal() -> Self {
        Self {
            blocks_only: false,
            universal: true,
        }
    }
}

/// The document/selection owner the dispatcher works against
pub trait DocumentEngine {
    fn document(&self) -> &Document;

    /// Current selection, `None` when the editor has no focus
    fn selection(&self) -> Option<&Selection>;

    fn set_node_type(&mut self, matcher: NodeMatch, block_type: BlockType, options: SetOptions);

    fn set_node_mark(&mut self, matcher: NodeMatch, mark: Mark, value: bool, options: SetOptions);

    fn insert_node(&mut self, node: Node);

    /// Nodes touched by the selection that satisfy `matcher`, in document order
    fn nodes(&self, matcher: NodeMatch, query: NodeQuery) -> Vec<(Path, NodeRef<'_>)> {
        query::find_nodes(self.document(), self.selection(), matcher, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, TextRun};

    #[test]
    fn test_node_match() {
        let heading = Block::heading("x");
        let bold = TextRun::new("x").with_mark(Mark::Bold);

        assert!(NodeMatch::Any.matches(NodeRef::Block(&heading)));
        assert!(NodeMatch::Block.matches(NodeRef::Block(&heading)));
        assert!(!NodeMatch::Block.matches(NodeRef::Text(&bold)));
        assert!(NodeMatch::Text.matches(NodeRef::Text(&bold)));
        assert!(NodeMatch::BlockType(BlockType::Heading).matches(NodeRef::Block(&heading)));
        assert!(!NodeMatch::BlockType(BlockType::Code).matches(NodeRef::Block(&heading)));
        assert!(NodeMatch::Mark(Mark::Bold).matches(NodeRef::Text(&bold)));
        assert!(!NodeMatch::Mark(Mark::Italic).matches(NodeRef::Text(&bold)));
    }
}
