use std::iter;

use crate::engine::{NodeMatch, NodeQuery};
use crate::model::{Document, NodeRef, Path, Selection};

/// Text runs the selection covers, in document order.
///
/// A collapsed selection covers the run at the caret. An expanded one covers
/// every run it intersects: runs strictly between the edges, the start run if
/// the selection does not begin at its very end, and the end run if the
/// selection does not stop at its very start.
pub fn selected_leaves(document: &Document, selection: &Selection) -> Vec<Path> {
    if selection.is_collapsed() {
        return document
            .text(&selection.focus.path)
            .map(|_| vec![selection.focus.path.clone()])
            .unwrap_or_default();
    }

    let (start, end) = selection.ordered();
    if start.path == end.path {
        return document
            .text(&start.path)
            .map(|_| vec![start.path.clone()])
            .unwrap_or_default();
    }

    document
        .texts()
        .into_iter()
        .filter(|(path, run)| {
            if *path == start.path {
                start.offset < run.len()
            } else if *path == end.path {
                end.offset > 0
            } else {
                *path > start.path && *path < end.path
            }
        })
        .map(|(path, _)| path)
        .collect()
}

/// Selected runs plus their ancestors that satisfy `matcher`, in document order
pub fn find_nodes<'a>(
    document: &'a Document,
    selection: Option<&Selection>,
    matcher: NodeMatch,
    query: NodeQuery,
) -> Vec<(Path, NodeRef<'a>)> {
    let Some(selection) = selection else {
        return Vec::new();
    };
    let leaves = selected_leaves(document, selection);
    if leaves.is_empty() {
        return Vec::new();
    }

    let considered = |node: &NodeRef<'_>| !query.blocks_only || node.is_block();

    if query.universal {
        let every_branch_matches = leaves.iter().all(|leaf| {
            leaf.ancestors()
                .chain(iter::once(leaf.clone()))
                .filter_map(|path| document.node(&path))
                .filter(|node| considered(node))
                .any(|node| matcher.matches(node))
        });
        if !every_branch_matches {
            return Vec::new();
        }
    }

    document
        .descendants()
        .into_iter()
        .filter(|(path, node)| {
            considered(node)
                && matcher.matches(*node)
                && leaves
                    .iter()
                    .any(|leaf| leaf == path || path.is_ancestor_of(leaf))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, BlockType, Mark, Node, Point, TextRun};
    use pretty_assertions::assert_eq;

    fn document() -> Document {
        Document::new(vec![
            Block::heading("Title"),
            Block::new(
                BlockType::Paragraph,
                vec![
                    Node::Text(TextRun::new("one ").with_mark(Mark::Bold)),
                    Node::Text(TextRun::new("two").with_mark(Mark::Bold)),
                    Node::Text(TextRun::new(" three")),
                ],
            ),
            Block::with_text(BlockType::Code, "code"),
        ])
    }

    fn paths(nodes: Vec<(Path, NodeRef<'_>)>) -> Vec<Path> {
        nodes.into_iter().map(|(path, _)| path).collect()
    }

    #[test]
    fn test_collapsed_selection_covers_caret_run() {
        let doc = document();
        let selection = Selection::collapsed(Point::new([1, 1], 0));
        assert_eq!(selected_leaves(&doc, &selection), vec![Path::from([1, 1])]);
    }

    #[test]
    fn test_expanded_selection_skips_runs_touched_only_at_their_edges() {
        let doc = document();
        // From the very end of "one " to the very start of " three"
        let selection = Selection::new(Point::new([1, 0], 4), Point::new([1, 2], 0));
        assert_eq!(selected_leaves(&doc, &selection), vec![Path::from([1, 1])]);
    }

    #[test]
    fn test_expanded_selection_across_blocks() {
        let doc = document();
        let selection = Selection::new(Point::new([2, 0], 2), Point::new([0, 0], 1));
        assert_eq!(
            selected_leaves(&doc, &selection),
            vec![
                Path::from([0, 0]),
                Path::from([1, 0]),
                Path::from([1, 1]),
                Path::from([1, 2]),
                Path::from([2, 0]),
            ]
        );
    }

    #[test]
    fn test_find_blocks_of_selection() {
        let doc = document();
        let selection = Selection::new(Point::new([1, 2], 1), Point::new([2, 0], 1));
        let found = find_nodes(&doc, Some(&selection), NodeMatch::Block, NodeQuery::blocks());
        assert_eq!(paths(found), vec![Path::from([1]), Path::from([2])]);
    }

    #[test]
    fn test_universal_mark_query() {
        let doc = document();
        let bold = NodeMatch::Mark(Mark::Bold);

        let inside_bold = Selection::new(Point::new([1, 0], 1), Point::new([1, 1], 2));
        let found = find_nodes(&doc, Some(&inside_bold), bold, NodeQuery::universal());
        assert_eq!(paths(found), vec![Path::from([1, 0]), Path::from([1, 1])]);

        let spills_over = Selection::new(Point::new([1, 0], 1), Point::new([1, 2], 2));
        assert!(find_nodes(&doc, Some(&spills_over), bold, NodeQuery::universal()).is_empty());
    }

    #[test]
    fn test_no_selection_finds_nothing() {
        let doc = document();
        assert!(find_nodes(&doc, None, NodeMatch::Any, NodeQuery::default()).is_empty());
    }
}
