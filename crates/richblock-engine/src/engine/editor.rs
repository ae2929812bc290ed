use crate::engine::{DocumentEngine, NodeMatch, NodeQuery, SetOptions};
use crate::error::EngineError;
use crate::input::{Key, KeyEvent};
use crate::model::{BlockType, Document, Mark, Node, Path, Point, Selection};

/// In-memory document engine.
///
/// Owns the document and the selection for the whole editing session. The
/// presentation layer holds one `Editor` and lends it to the dispatcher for
/// each key event.
#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    pub(crate) document: Document,
    pub(crate) selection: Option<Selection>,
    /// Incremented on every change to the document or selection
    pub(crate) version: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            document: Document::initial(),
            selection: None,
            version: 0,
        }
    }
}

impl Editor {
    /// Create an editor over `document` with no selection
    pub fn new(document: Document) -> Result<Self, EngineError> {
        document.validate()?;
        Ok(Self {
            document,
            selection: None,
            version: 0,
        })
    }

    /// Create an editor with an initial selection
    pub fn with_selection(document: Document, selection: Selection) -> Result<Self, EngineError> {
        let mut editor = Self::new(document)?;
        editor.select(selection)?;
        Ok(editor)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn focus(&self) -> Option<&Point> {
        self.selection.as_ref().map(|selection| &selection.focus)
    }

    pub fn select(&mut self, selection: Selection) -> Result<(), EngineError> {
        self.check_point(&selection.anchor)?;
        self.check_point(&selection.focus)?;
        self.set_selection(Some(selection));
        Ok(())
    }

    pub fn select_point(&mut self, point: Point) -> Result<(), EngineError> {
        self.select(Selection::collapsed(point))
    }

    /// Put the caret at the start of the document. A document without text
    /// has nowhere to put it, so the selection is cleared.
    pub fn select_start(&mut self) {
        match self.document.texts().first().map(|(path, _)| path.clone()) {
            Some(path) => self.set_selection(Some(Selection::collapsed(Point::new(path, 0)))),
            None => self.deselect(),
        }
    }

    pub fn deselect(&mut self) {
        self.set_selection(None);
    }

    fn check_point(&self, point: &Point) -> Result<(), EngineError> {
        let run = self
            .document
            .text(&point.path)
            .ok_or_else(|| EngineError::InvalidPath(point.path.clone()))?;
        let len = run.len();
        if point.offset > len {
            return Err(EngineError::InvalidOffset {
                path: point.path.clone(),
                offset: point.offset,
                len,
            });
        }
        Ok(())
    }

    pub(crate) fn set_selection(&mut self, selection: Option<Selection>) {
        if self.selection != selection {
            self.selection = selection;
            self.version += 1;
        }
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Marks of the run under the caret
    pub fn marks_at_focus(&self) -> Vec<Mark> {
        self.focus()
            .and_then(|focus| self.document.text(&focus.path))
            .map(|run| run.marks.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Type of the block holding the caret
    pub fn block_type_at_focus(&self) -> Option<BlockType> {
        let parent = self.focus()?.path.parent()?;
        self.document.block(&parent).map(|block| block.kind)
    }

    /// Split the runs at the selection edges and point the selection at the
    /// split pieces, so the selected characters are exactly whole runs.
    /// Returns true if any run was split.
    fn split_at_selection_edges(&mut self) -> bool {
        let Some(selection) = self.selection.clone() else {
            return false;
        };
        let (start, end) = selection.ordered();
        let (mut start, mut end) = (start.clone(), end.clone());

        // End first: splitting it never moves the start point
        let mut split = self.document.split_text(&end.path, end.offset);

        if self.document.split_text(&start.path, start.offset) {
            split = true;
            let inserted = start.path.next_sibling();
            if end.path == start.path {
                end = Point::new(inserted.clone(), end.offset - start.offset);
            } else {
                end.path = end.path.shifted_by_insert(&inserted);
            }
            start = Point::new(inserted, 0);
        }

        self.selection = Some(selection.with_range(start, end));
        split
    }

    /// Insert text at the caret, replacing an expanded selection first
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() || self.selection.is_none() {
            return;
        }
        self.delete_selection();

        let Some(focus) = self.focus().cloned() else {
            return;
        };
        let Some(run) = self.document.text_mut(&focus.path) else {
            return;
        };
        run.insert_str(focus.offset, text);
        let caret = Point::new(focus.path, focus.offset + text.chars().count());
        self.selection = Some(Selection::collapsed(caret));
        self.touch();
    }

    /// Default backspace: delete the selection, or the character before the
    /// caret, or merge the caret's block into the previous text block when the
    /// caret sits at the start of its block.
    pub fn delete_backward(&mut self) {
        let Some(selection) = self.selection.clone() else {
            return;
        };
        if !selection.is_collapsed() {
            self.delete_selection();
            return;
        }

        let focus = selection.focus;
        if focus.offset > 0 {
            if let Some(run) = self.document.text_mut(&focus.path) {
                run.remove_range(focus.offset - 1, focus.offset);
            }
            self.selection = Some(Selection::collapsed(Point::new(
                focus.path,
                focus.offset - 1,
            )));
            self.touch();
            return;
        }

        let Some(block_path) = focus.path.parent() else {
            return;
        };

        // Earlier runs of the same block: delete their last character
        let mut previous = self.document.previous_text(&focus.path);
        while let Some(path) = previous.clone() {
            if path.parent().as_ref() != Some(&block_path) {
                break;
            }
            let len = self.document.text(&path).map(|run| run.len()).unwrap_or(0);
            if len > 0 {
                if let Some(run) = self.document.text_mut(&path) {
                    run.remove_range(len - 1, len);
                }
                self.selection = Some(Selection::collapsed(Point::new(path, len - 1)));
                self.touch();
                return;
            }
            previous = self.document.previous_text(&path);
        }

        // Start of the block: merge it into the block before
        if let Some(previous_leaf) = previous {
            log::debug!("merging block {block_path} into the block holding {previous_leaf}");
            self.join_block_after(&previous_leaf, &block_path);
        }
    }

    /// Move the children of the block at `block` to just after the run at
    /// `leaf`, then drop the emptied block. The caret lands at the join.
    fn join_block_after(&mut self, leaf: &Path, block: &Path) {
        if block.is_ancestor_of(leaf) {
            return;
        }
        let leaf_len = self.document.text(leaf).map(|run| run.len()).unwrap_or(0);
        let Some(Node::Block(removed)) = self.document.remove_node(block) else {
            return;
        };

        let mut at = leaf.next_sibling();
        for child in removed.children {
            self.document.insert_node(&at, child);
            at = at.next_sibling();
        }
        self.selection = Some(Selection::collapsed(Point::new(leaf.clone(), leaf_len)));
        self.touch();
    }

    /// Delete the characters of an expanded selection, joining the edge
    /// blocks when it spans several. Collapsed selections are left alone.
    pub fn delete_selection(&mut self) {
        let Some(selection) = self.selection.clone() else {
            return;
        };
        if selection.is_collapsed() {
            return;
        }
        let (start, end) = selection.ordered();
        let (start, end) = (start.clone(), end.clone());

        if start.path == end.path {
            if let Some(run) = self.document.text_mut(&start.path) {
                run.remove_range(start.offset, end.offset);
            }
            self.selection = Some(Selection::collapsed(start));
            self.touch();
            return;
        }

        if let Some(run) = self.document.text_mut(&end.path) {
            run.remove_range(0, end.offset);
        }
        if let Some(run) = self.document.text_mut(&start.path) {
            let len = run.len();
            run.remove_range(start.offset, len);
        }

        let between: Vec<Path> = self
            .document
            .texts()
            .into_iter()
            .map(|(path, _)| path)
            .filter(|path| *path > start.path && *path < end.path)
            .collect();
        for path in between.iter().rev() {
            self.document.remove_node(path);
        }

        // Every run between the edges is gone, so the end run now follows the start run
        if let Some(end_path) = self.document.next_text(&start.path)
            && let (Some(start_block), Some(end_block)) = (start.path.parent(), end_path.parent())
            && start_block != end_block
        {
            self.join_block_after(&start.path, &end_block);
        }

        self.selection = Some(Selection::collapsed(start));
        self.touch();
    }

    /// Built-in handling of a key the dispatcher let through. Returns true if
    /// the engine has a default behaviour for the key.
    pub fn apply_default_key(&mut self, event: &KeyEvent) -> bool {
        let extend = event.modifiers.shift();
        match event.key {
            Key::Char(c) if !event.modifiers.is_command_chord() => {
                self.insert_text(c.encode_utf8(&mut [0; 4]));
                true
            }
            Key::Backspace => {
                self.delete_backward();
                true
            }
            Key::Left => {
                self.move_horizontal(false, extend);
                true
            }
            Key::Right => {
                self.move_horizontal(true, extend);
                true
            }
            Key::Up => {
                self.move_vertical(false, extend);
                true
            }
            Key::Down => {
                self.move_vertical(true, extend);
                true
            }
            Key::Home => {
                self.move_to_block_edge(false, extend);
                true
            }
            Key::End => {
                self.move_to_block_edge(true, extend);
                true
            }
            _ => false,
        }
    }
}

impl DocumentEngine for Editor {
    fn document(&self) -> &Document {
        &self.document
    }

    fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    fn set_node_type(&mut self, matcher: NodeMatch, block_type: BlockType, _options: SetOptions) {
        let targets: Vec<Path> = self
            .nodes(matcher, NodeQuery::blocks())
            .into_iter()
            .map(|(path, _)| path)
            .collect();

        let mut changed = false;
        for path in targets {
            if let Some(block) = self.document.block_mut(&path)
                && block.kind != block_type
            {
                block.kind = block_type;
                changed = true;
            }
        }
        if changed {
            self.touch();
        }
    }

    fn set_node_mark(&mut self, matcher: NodeMatch, mark: Mark, value: bool, options: SetOptions) {
        let Some(selection) = self.selection.clone() else {
            return;
        };

        let mut changed = false;
        if options.split {
            if selection.is_collapsed() {
                // Nothing is selected inside a non-empty run
                let caret_run_empty = self
                    .document
                    .text(&selection.focus.path)
                    .is_some_and(|run| run.is_empty());
                if !caret_run_empty {
                    return;
                }
            } else {
                changed = self.split_at_selection_edges();
            }
        }

        let targets: Vec<Path> = self
            .nodes(matcher, NodeQuery::default())
            .into_iter()
            .filter(|(_, node)| node.is_text())
            .map(|(path, _)| path)
            .collect();

        for path in targets {
            if let Some(run) = self.document.text_mut(&path)
                && run.has_mark(mark) != value
            {
                run.set_mark(mark, value);
                changed = true;
            }
        }
        if changed {
            self.touch();
        }
    }

    fn insert_node(&mut self, node: Node) {
        if self.selection.is_none() {
            return;
        }
        match node {
            Node::Block(block) => {
                let Some(current) = self.focus().and_then(|focus| focus.path.parent()) else {
                    return;
                };
                let at = current.next_sibling();
                if !self.document.insert_node(&at, Node::Block(block)) {
                    return;
                }
                if let Some(start) = self.document.start_of(&at) {
                    self.selection = Some(Selection::collapsed(start));
                }
                self.touch();
            }
            Node::Text(run) => {
                self.delete_selection();
                let Some(focus) = self.focus().cloned() else {
                    return;
                };
                let Some(caret_len) = self.document.text(&focus.path).map(|run| run.len()) else {
                    return;
                };

                let at = if focus.offset == 0 {
                    focus.path.clone()
                } else {
                    if focus.offset < caret_len {
                        self.document.split_text(&focus.path, focus.offset);
                    }
                    focus.path.next_sibling()
                };
                let inserted_len = run.len();
                if self.document.insert_node(&at, Node::Text(run)) {
                    self.selection = Some(Selection::collapsed(Point::new(at, inserted_len)));
                    self.touch();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, TextRun};
    use pretty_assertions::assert_eq;

    fn editor_at(document: Document, path: impl Into<Path>, offset: usize) -> Editor {
        Editor::with_selection(document, Selection::collapsed(Point::new(path, offset))).unwrap()
    }

    fn two_paragraphs() -> Document {
        Document::new(vec![Block::paragraph("Hello"), Block::paragraph("world")])
    }

    #[test]
    fn test_new_rejects_invalid_document() {
        let doc = Document::new(vec![Block::new(BlockType::Paragraph, vec![])]);
        assert_eq!(Editor::new(doc), Err(EngineError::EmptyBlock(Path::from([0]))));
    }

    #[test]
    fn test_select_validates_points() {
        let mut editor = Editor::new(two_paragraphs()).unwrap();
        assert_eq!(
            editor.select_point(Point::new([5, 0], 0)),
            Err(EngineError::InvalidPath(Path::from([5, 0])))
        );
        assert_eq!(
            editor.select_point(Point::new([0, 0], 9)),
            Err(EngineError::InvalidOffset {
                path: Path::from([0, 0]),
                offset: 9,
                len: 5
            })
        );
        // A block is not a valid caret target
        assert!(editor.select_point(Point::new([0], 0)).is_err());
        assert!(editor.select_point(Point::new([0, 0], 5)).is_ok());
    }

    #[test]
    fn test_select_start() {
        let mut editor = editor_at(two_paragraphs(), [1, 0], 3);
        editor.select_start();
        assert_eq!(editor.focus(), Some(&Point::new([0, 0], 0)));

        // Nothing to put a caret in
        let mut editor = editor_at(two_paragraphs(), [1, 0], 3);
        editor.document = Document::new(vec![]);
        editor.select_start();
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn test_insert_text_advances_caret() {
        let mut editor = editor_at(two_paragraphs(), [0, 0], 5);
        editor.insert_text(", dear");
        assert_eq!(editor.document().blocks[0].plain_text(), "Hello, dear");
        assert_eq!(editor.focus(), Some(&Point::new([0, 0], 11)));
    }

    #[test]
    fn test_insert_text_without_selection_is_noop() {
        let mut editor = Editor::new(two_paragraphs()).unwrap();
        editor.insert_text("x");
        assert_eq!(editor.document(), &two_paragraphs());
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_delete_backward_removes_previous_character() {
        let mut editor = editor_at(two_paragraphs(), [1, 0], 3);
        editor.delete_backward();
        assert_eq!(editor.document().blocks[1].plain_text(), "wold");
        assert_eq!(editor.focus(), Some(&Point::new([1, 0], 2)));
    }

    #[test]
    fn test_delete_backward_at_block_start_merges_blocks() {
        let mut editor = editor_at(two_paragraphs(), [1, 0], 0);
        editor.delete_backward();
        assert_eq!(editor.document().block_count(), 1);
        assert_eq!(editor.document().blocks[0].plain_text(), "Helloworld");
        assert_eq!(editor.focus(), Some(&Point::new([0, 0], 5)));
    }

    #[test]
    fn test_delete_backward_at_document_start_is_noop() {
        let mut editor = editor_at(two_paragraphs(), [0, 0], 0);
        editor.delete_backward();
        assert_eq!(editor.document(), &two_paragraphs());
    }

    #[test]
    fn test_delete_backward_crosses_run_boundary_within_block() {
        let doc = Document::new(vec![Block::new(
            BlockType::Paragraph,
            vec![
                Node::Text(TextRun::new("ab")),
                Node::Text(TextRun::new("cd").with_mark(Mark::Bold)),
            ],
        )]);
        let mut editor = editor_at(doc, [0, 1], 0);
        editor.delete_backward();
        assert_eq!(editor.document().blocks[0].plain_text(), "acd");
        assert_eq!(editor.focus(), Some(&Point::new([0, 0], 1)));
    }

    #[test]
    fn test_delete_selection_across_blocks() {
        let doc = Document::new(vec![
            Block::paragraph("Hello"),
            Block::paragraph("middle"),
            Block::paragraph("world"),
        ]);
        let selection = Selection::new(Point::new([0, 0], 2), Point::new([2, 0], 3));
        let mut editor = Editor::with_selection(doc, selection).unwrap();

        editor.delete_selection();

        assert_eq!(editor.document().block_count(), 1);
        assert_eq!(editor.document().blocks[0].plain_text(), "Held");
        assert_eq!(editor.focus(), Some(&Point::new([0, 0], 2)));
        assert!(editor.document().validate().is_ok());
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let selection = Selection::new(Point::new([0, 0], 1), Point::new([0, 0], 4));
        let mut editor = Editor::with_selection(two_paragraphs(), selection).unwrap();
        editor.insert_text("i");
        assert_eq!(editor.document().blocks[0].plain_text(), "Hio");
        assert_eq!(editor.focus(), Some(&Point::new([0, 0], 2)));
    }

    #[test]
    fn test_set_node_mark_splits_runs_at_selection_edges() {
        let selection = Selection::new(Point::new([0, 0], 1), Point::new([0, 0], 4));
        let mut editor = Editor::with_selection(two_paragraphs(), selection).unwrap();

        editor.set_node_mark(NodeMatch::Text, Mark::Bold, true, SetOptions::split());

        insta::assert_snapshot!(editor.document().outline(), @r#"
        paragraph
          "H"
          "ell" [bold]
          "o"
        paragraph
          "world"
        "#);
        let selection = editor.selection().unwrap();
        assert_eq!(selection.anchor, Point::new([0, 1], 0));
        assert_eq!(selection.focus, Point::new([0, 1], 3));
    }

    #[test]
    fn test_set_node_mark_keeps_backward_direction() {
        let selection = Selection::new(Point::new([1, 0], 2), Point::new([0, 0], 3));
        let mut editor = Editor::with_selection(two_paragraphs(), selection).unwrap();

        editor.set_node_mark(NodeMatch::Text, Mark::Italic, true, SetOptions::split());

        let selection = editor.selection().unwrap();
        assert!(selection.is_backward());
        assert_eq!(selection.focus, Point::new([0, 1], 0));
        assert_eq!(selection.anchor, Point::new([1, 0], 2));
        assert!(editor.document().text(&Path::from([0, 1])).unwrap().has_mark(Mark::Italic));
        assert!(editor.document().text(&Path::from([1, 0])).unwrap().has_mark(Mark::Italic));
        assert!(!editor.document().text(&Path::from([1, 1])).unwrap().has_mark(Mark::Italic));
    }

    #[test]
    fn test_set_node_mark_collapsed_in_non_empty_run_is_noop() {
        let mut editor = editor_at(two_paragraphs(), [0, 0], 2);
        editor.set_node_mark(NodeMatch::Text, Mark::Bold, true, SetOptions::split());
        assert_eq!(editor.document(), &two_paragraphs());
        assert_eq!(editor.version(), 1);
    }

    #[test]
    fn test_set_node_mark_collapsed_in_empty_run() {
        let mut editor = editor_at(Document::initial(), [1, 0], 0);
        editor.set_node_mark(NodeMatch::Text, Mark::Bold, true, SetOptions::split());
        assert!(editor.document().text(&Path::from([1, 0])).unwrap().has_mark(Mark::Bold));
        assert!(!editor.document().text(&Path::from([0, 0])).unwrap().has_mark(Mark::Bold));
    }

    #[test]
    fn test_set_node_type_targets_blocks_in_selection() {
        let doc = Document::new(vec![
            Block::paragraph("a"),
            Block::paragraph("b"),
            Block::paragraph("c"),
        ]);
        let selection = Selection::new(Point::new([0, 0], 0), Point::new([1, 0], 1));
        let mut editor = Editor::with_selection(doc, selection).unwrap();

        editor.set_node_type(NodeMatch::Block, BlockType::Code, SetOptions::default());
        let kinds: Vec<BlockType> = editor.document().blocks.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BlockType::Code, BlockType::Code, BlockType::Paragraph]);

        let version = editor.version();
        editor.set_node_type(NodeMatch::Block, BlockType::Code, SetOptions::default());
        assert_eq!(editor.version(), version);
    }

    #[test]
    fn test_insert_block_after_current() {
        let mut editor = editor_at(two_paragraphs(), [0, 0], 2);
        editor.insert_node(Node::Block(Block::empty(BlockType::Paragraph)));

        assert_eq!(editor.document().block_count(), 3);
        assert_eq!(editor.document().blocks[1].plain_text(), "");
        assert_eq!(editor.document().blocks[2].plain_text(), "world");
        assert_eq!(editor.focus(), Some(&Point::new([1, 0], 0)));
    }

    #[test]
    fn test_insert_text_run_splits_at_caret() {
        let mut editor = editor_at(two_paragraphs(), [0, 0], 2);
        editor.insert_node(Node::Text(TextRun::new("XY").with_mark(Mark::Bold)));

        insta::assert_snapshot!(editor.document().outline(), @r#"
        paragraph
          "He"
          "XY" [bold]
          "llo"
        paragraph
          "world"
        "#);
        assert_eq!(editor.focus(), Some(&Point::new([0, 1], 2)));
    }

    #[test]
    fn test_apply_default_key() {
        let mut editor = editor_at(two_paragraphs(), [0, 0], 5);
        assert!(editor.apply_default_key(&KeyEvent::plain(Key::Char('!'))));
        assert_eq!(editor.document().blocks[0].plain_text(), "Hello!");

        // Command chords never type
        assert!(!editor.apply_default_key(&KeyEvent::ctrl('z')));
        assert_eq!(editor.document().blocks[0].plain_text(), "Hello!");

        assert!(!editor.apply_default_key(&KeyEvent::plain(Key::Enter)));
        assert_eq!(editor.document().block_count(), 2);
    }
}
