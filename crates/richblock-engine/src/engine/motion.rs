//! Caret motion for the in-memory engine.
//!
//! Motion works on "block offsets": the character index of a point within
//! the concatenated direct text runs of its block.

use crate::engine::Editor;
use crate::model::{Document, Node, Path, Point, Selection};

fn block_len(document: &Document, block: &Path) -> usize {
    document
        .block(block)
        .map(|block| {
            block
                .children
                .iter()
                .filter_map(Node::as_text)
                .map(|run| run.len())
                .sum()
        })
        .unwrap_or(0)
}

/// The block holding `point` and the point's character index within it
fn block_offset(document: &Document, point: &Point) -> Option<(Path, usize)> {
    let block_path = point.path.parent()?;
    let block = document.block(&block_path)?;
    let index = point.path.last()?;
    let before: usize = block.children[..index.min(block.children.len())]
        .iter()
        .filter_map(Node::as_text)
        .map(|run| run.len())
        .sum();
    Some((block_path, before + point.offset))
}

/// Point for a block offset. On a run boundary the earlier run wins.
fn point_at(document: &Document, block_path: &Path, index: usize) -> Option<Point> {
    let block = document.block(block_path)?;
    let mut consumed = 0;
    let mut last = None;
    for (child_index, child) in block.children.iter().enumerate() {
        let Some(run) = child.as_text() else {
            continue;
        };
        let len = run.len();
        if index <= consumed + len {
            return Some(Point::new(block_path.child(child_index), index - consumed));
        }
        consumed += len;
        last = Some(Point::new(block_path.child(child_index), len));
    }
    last
}

impl Editor {
    fn move_focus(&mut self, target: Point, extend: bool) {
        let selection = match (&self.selection, extend) {
            (Some(current), true) => Selection::new(current.anchor.clone(), target),
            _ => Selection::collapsed(target),
        };
        self.set_selection(Some(selection));
    }

    /// Move the caret one character left or right, crossing into the
    /// neighbouring text block at block edges. Without `extend`, an expanded
    /// selection collapses to the edge in the direction of travel.
    pub fn move_horizontal(&mut self, forward: bool, extend: bool) {
        let Some(selection) = self.selection.clone() else {
            return;
        };
        if !extend && !selection.is_collapsed() {
            let edge = if forward {
                selection.end().clone()
            } else {
                selection.start().clone()
            };
            self.set_selection(Some(Selection::collapsed(edge)));
            return;
        }

        let Some((block, index)) = block_offset(&self.document, &selection.focus) else {
            return;
        };
        let target = if forward {
            if index < block_len(&self.document, &block) {
                point_at(&self.document, &block, index + 1)
            } else {
                self.neighbour_block(&block, true)
                    .and_then(|next| point_at(&self.document, &next, 0))
            }
        } else if index > 0 {
            point_at(&self.document, &block, index - 1)
        } else {
            self.neighbour_block(&block, false).and_then(|previous| {
                let len = block_len(&self.document, &previous);
                point_at(&self.document, &previous, len)
            })
        };

        if let Some(target) = target {
            self.move_focus(target, extend);
        }
    }

    /// Move the caret to the previous or next text block, keeping the column
    /// where the target block is long enough. At the first or last block the
    /// caret goes to that block's start or end.
    pub fn move_vertical(&mut self, down: bool, extend: bool) {
        let Some(focus) = self.focus().cloned() else {
            return;
        };
        let Some((block, column)) = block_offset(&self.document, &focus) else {
            return;
        };
        let target = match self.neighbour_block(&block, down) {
            Some(neighbour) => {
                let len = block_len(&self.document, &neighbour);
                point_at(&self.document, &neighbour, column.min(len))
            }
            None if down => {
                let len = block_len(&self.document, &block);
                point_at(&self.document, &block, len)
            }
            None => point_at(&self.document, &block, 0),
        };
        if let Some(target) = target {
            self.move_focus(target, extend);
        }
    }

    /// Move the caret to the start or end of its block
    pub fn move_to_block_edge(&mut self, end: bool, extend: bool) {
        let Some(focus) = self.focus().cloned() else {
            return;
        };
        let Some((block, _)) = block_offset(&self.document, &focus) else {
            return;
        };
        let index = if end {
            block_len(&self.document, &block)
        } else {
            0
        };
        if let Some(target) = point_at(&self.document, &block, index) {
            self.move_focus(target, extend);
        }
    }

    fn neighbour_block(&self, block: &Path, next: bool) -> Option<Path> {
        let blocks = self.document.text_blocks();
        let position = blocks.iter().position(|candidate| candidate == block)?;
        if next {
            blocks.get(position + 1).cloned()
        } else {
            position.checked_sub(1).map(|previous| blocks[previous].clone())
        }
    }
}
