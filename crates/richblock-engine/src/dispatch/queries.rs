use crate::engine::query::find_nodes;
use crate::engine::{NodeMatch, NodeQuery};
use crate::model::{BlockType, Document, Mark, Selection};

/// True when every text run the selection covers carries `mark`.
/// A selection covering no runs reports false.
pub fn is_mark_active(document: &Document, selection: &Selection, mark: Mark) -> bool {
    !find_nodes(
        document,
        Some(selection),
        NodeMatch::Mark(mark),
        NodeQuery::universal(),
    )
    .is_empty()
}

/// True when some block holding the selection has type `block_type`
pub fn is_block_of_type(document: &Document, selection: &Selection, block_type: BlockType) -> bool {
    !find_nodes(
        document,
        Some(selection),
        NodeMatch::BlockType(block_type),
        NodeQuery::blocks(),
    )
    .is_empty()
}
