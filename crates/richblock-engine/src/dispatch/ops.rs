//! Editing commands over any [`DocumentEngine`]. Each one issues at most one
//! transform and does nothing when the engine has no selection.

use crate::dispatch::queries::{is_block_of_type, is_mark_active};
use crate::engine::{DocumentEngine, NodeMatch, SetOptions};
use crate::model::{Block, BlockType, Mark, Node, TextRun};

/// Set or clear `mark` on exactly the selected characters.
///
/// A caret inside a non-empty run has nothing to mark, so an empty run
/// carrying the adjusted marks is inserted at the caret instead. Text typed
/// next goes into that run.
pub fn set_mark<E: DocumentEngine + ?Sized>(engine: &mut E, mark: Mark, value: bool) {
    let Some(selection) = engine.selection() else {
        return;
    };

    if selection.is_collapsed() {
        let caret_run = engine.document().text(&selection.focus.path).cloned();
        if let Some(run) = caret_run
            && !run.is_empty()
        {
            if run.has_mark(mark) == value {
                return;
            }
            let mut marks = run.marks;
            if value {
                marks.insert(mark);
            } else {
                marks.remove(&mark);
            }
            engine.insert_node(Node::Text(TextRun::empty().with_marks(marks)));
            return;
        }
    }

    engine.set_node_mark(NodeMatch::Text, mark, value, SetOptions::split());
}

/// Clear `mark` when every selected run has it, otherwise set it
pub fn toggle_mark<E: DocumentEngine + ?Sized>(engine: &mut E, mark: Mark) {
    let Some(selection) = engine.selection() else {
        return;
    };
    let active = is_mark_active(engine.document(), selection, mark);
    set_mark(engine, mark, !active);
}

/// Retag every block holding the selection. Applying it twice changes nothing more.
pub fn set_block_type<E: DocumentEngine + ?Sized>(engine: &mut E, block_type: BlockType) {
    if engine.selection().is_none() {
        return;
    }
    engine.set_node_type(NodeMatch::Block, block_type, SetOptions::default());
}

/// Switch the selected blocks to `block_type`, or back to `fallback` when
/// they already have it
pub fn toggle_block_type<E: DocumentEngine + ?Sized>(
    engine: &mut E,
    block_type: BlockType,
    fallback: BlockType,
) {
    let Some(selection) = engine.selection() else {
        return;
    };
    let target = if is_block_of_type(engine.document(), selection, block_type) {
        fallback
    } else {
        block_type
    };
    set_block_type(engine, target);
}

/// Insert an empty block after the one holding the caret and move the caret into it
pub fn insert_block_after_current<E: DocumentEngine + ?Sized>(engine: &mut E, block_type: BlockType) {
    if engine.selection().is_none() {
        return;
    }
    engine.insert_node(Node::Block(Block::empty(block_type)));
}
