use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{Block, Node, Path, Point, TextRun};

/// Borrowed view of a node, covering top-level blocks as well as nested nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Block(&'a Block),
    Text(&'a TextRun),
}

impl<'a> NodeRef<'a> {
    pub fn is_block(&self) -> bool {
        matches!(self, NodeRef::Block(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeRef::Text(_))
    }

    pub fn as_block(&self) -> Option<&'a Block> {
        match self {
            NodeRef::Block(block) => Some(block),
            NodeRef::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&'a TextRun> {
        match self {
            NodeRef::Text(run) => Some(run),
            NodeRef::Block(_) => None,
        }
    }
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        match node {
            Node::Block(block) => NodeRef::Block(block),
            Node::Text(run) => NodeRef::Text(run),
        }
    }
}

/// The editable document: an ordered sequence of top-level blocks.
///
/// Serialized as the bare list of blocks, the same shape the presentation
/// layer and the config file use for initial content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Startup content: an empty heading followed by an empty paragraph
    pub fn initial() -> Self {
        Self::new(vec![Block::heading(""), Block::paragraph("")])
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// True if no run in the document holds any text
    pub fn is_blank(&self) -> bool {
        self.texts().iter().all(|(_, run)| run.is_empty())
    }

    /// Check the structural invariants: every block has at least one child
    pub fn validate(&self) -> Result<(), EngineError> {
        fn check(block: &Block, path: Path) -> Result<(), EngineError> {
            if block.children.is_empty() {
                return Err(EngineError::EmptyBlock(path));
            }
            for (index, child) in block.children.iter().enumerate() {
                if let Node::Block(inner) = child {
                    check(inner, path.child(index))?;
                }
            }
            Ok(())
        }

        for (index, block) in self.blocks.iter().enumerate() {
            check(block, Path::from([index]))?;
        }
        Ok(())
    }

    pub fn node(&self, path: &Path) -> Option<NodeRef<'_>> {
        let (first, rest) = path.indices().split_first()?;
        let mut current = NodeRef::Block(self.blocks.get(*first)?);
        for index in rest {
            let block = current.as_block()?;
            current = NodeRef::from(block.children.get(*index)?);
        }
        Some(current)
    }

    pub fn block(&self, path: &Path) -> Option<&Block> {
        self.node(path)?.as_block()
    }

    pub fn text(&self, path: &Path) -> Option<&TextRun> {
        self.node(path)?.as_text()
    }

    pub(crate) fn block_mut(&mut self, path: &Path) -> Option<&mut Block> {
        let (first, rest) = path.indices().split_first()?;
        let mut block = self.blocks.get_mut(*first)?;
        for index in rest {
            block = block.children.get_mut(*index)?.as_block_mut()?;
        }
        Some(block)
    }

    pub(crate) fn text_mut(&mut self, path: &Path) -> Option<&mut TextRun> {
        let parent = path.parent()?;
        let index = path.last()?;
        self.block_mut(&parent)?
            .children
            .get_mut(index)?
            .as_text_mut()
    }

    /// Every node in document order (pre-order), with its path
    pub fn descendants(&self) -> Vec<(Path, NodeRef<'_>)> {
        fn walk<'a>(block: &'a Block, path: Path, out: &mut Vec<(Path, NodeRef<'a>)>) {
            out.push((path.clone(), NodeRef::Block(block)));
            for (index, child) in block.children.iter().enumerate() {
                match child {
                    Node::Block(inner) => walk(inner, path.child(index), out),
                    Node::Text(run) => out.push((path.child(index), NodeRef::Text(run))),
                }
            }
        }

        let mut out = Vec::new();
        for (index, block) in self.blocks.iter().enumerate() {
            walk(block, Path::from([index]), &mut out);
        }
        out
    }

    /// Every text run in document order
    pub fn texts(&self) -> Vec<(Path, &TextRun)> {
        self.descendants()
            .into_iter()
            .filter_map(|(path, node)| node.as_text().map(|run| (path, run)))
            .collect()
    }

    /// Paths of the blocks that directly hold text runs, in document order
    pub fn text_blocks(&self) -> Vec<Path> {
        self.descendants()
            .into_iter()
            .filter_map(|(path, node)| {
                node.as_block()
                    .filter(|block| block.holds_text())
                    .map(|_| path)
            })
            .collect()
    }

    /// First caret position inside the node at `path`
    pub fn start_of(&self, path: &Path) -> Option<Point> {
        self.texts()
            .into_iter()
            .find(|(text_path, _)| text_path == path || path.is_ancestor_of(text_path))
            .map(|(text_path, _)| Point::new(text_path, 0))
    }

    /// The text run following `path` in document order
    pub fn next_text(&self, path: &Path) -> Option<Path> {
        let texts = self.texts();
        let index = texts.iter().position(|(text_path, _)| text_path == path)?;
        texts.get(index + 1).map(|(text_path, _)| text_path.clone())
    }

    /// The text run preceding `path` in document order
    pub fn previous_text(&self, path: &Path) -> Option<Path> {
        let texts = self.texts();
        let index = texts.iter().position(|(text_path, _)| text_path == path)?;
        index
            .checked_sub(1)
            .map(|previous| texts[previous].0.clone())
    }

    /// Insert `node` so that it ends up at `path`. Top-level positions only
    /// accept blocks.
    pub(crate) fn insert_node(&mut self, path: &Path, node: Node) -> bool {
        let (Some(parent), Some(index)) = (path.parent(), path.last()) else {
            return false;
        };
        if parent.is_empty() {
            return match node {
                Node::Block(block) if index <= self.blocks.len() => {
                    self.blocks.insert(index, block);
                    true
                }
                _ => false,
            };
        }
        match self.block_mut(&parent) {
            Some(block) if index <= block.children.len() => {
                block.children.insert(index, node);
                true
            }
            _ => false,
        }
    }

    /// Remove the node at `path`, then remove any ancestor blocks left without
    /// children. Returns the removed node.
    pub(crate) fn remove_node(&mut self, path: &Path) -> Option<Node> {
        let parent = path.parent()?;
        let index = path.last()?;
        if parent.is_empty() {
            if index >= self.blocks.len() {
                return None;
            }
            return Some(Node::Block(self.blocks.remove(index)));
        }

        let block = self.block_mut(&parent)?;
        if index >= block.children.len() {
            return None;
        }
        let removed = block.children.remove(index);
        if block.children.is_empty() {
            self.remove_node(&parent);
        }
        Some(removed)
    }

    /// Split the run at `path` at a character offset, moving the tail into a
    /// new sibling run. Returns false when the offset is at either edge.
    pub(crate) fn split_text(&mut self, path: &Path, offset: usize) -> bool {
        let Some(run) = self.text_mut(path) else {
            return false;
        };
        if offset == 0 || offset >= run.len() {
            return false;
        }
        let tail = run.split_off(offset);
        self.insert_node(&path.next_sibling(), Node::Text(tail))
    }

    /// Text of every text block, one line per block
    pub fn plain_text(&self) -> String {
        self.text_blocks()
            .iter()
            .filter_map(|path| self.block(path))
            .map(|block| {
                block
                    .children
                    .iter()
                    .filter_map(Node::as_text)
                    .map(|run| run.text.as_str())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Human-readable tree dump, one node per line, indented by depth
    pub fn outline(&self) -> String {
        let mut lines = Vec::new();
        for (path, node) in self.descendants() {
            let indent = "  ".repeat(path.len() - 1);
            match node {
                NodeRef::Block(block) => lines.push(format!("{indent}{}", block.kind)),
                NodeRef::Text(run) => {
                    let mut line = format!("{indent}{:?}", run.text);
                    if !run.marks.is_empty() {
                        let marks: Vec<&str> = run.marks.iter().map(|mark| mark.name()).collect();
                        line.push_str(&format!(" [{}]", marks.join(", ")));
                    }
                    lines.push(line);
                }
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockType, Mark};
    use pretty_assertions::assert_eq;

    fn sample() -> Document {
        Document::new(vec![
            Block::heading("Title"),
            Block::new(
                BlockType::Paragraph,
                vec![
                    Node::Text(TextRun::new("Hello ")),
                    Node::Text(TextRun::new("world").with_mark(Mark::Bold)),
                ],
            ),
            Block::new(
                BlockType::List,
                vec![Node::Block(Block::paragraph("item"))],
            ),
        ])
    }

    #[test]
    fn test_initial_document() {
        let doc = Document::initial();
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.blocks[0].kind, BlockType::Heading);
        assert_eq!(doc.blocks[1].kind, BlockType::Paragraph);
        assert!(doc.is_blank());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_node_lookup() {
        let doc = sample();
        assert_eq!(doc.text(&Path::from([1, 1])).map(|run| run.text.as_str()), Some("world"));
        assert_eq!(doc.block(&Path::from([2, 0])).map(|b| b.kind), Some(BlockType::Paragraph));
        assert!(doc.node(&Path::from([1, 5])).is_none());
        assert!(doc.node(&Path::root()).is_none());
        // A text run has no children to descend into
        assert!(doc.node(&Path::from([1, 0, 0])).is_none());
    }

    #[test]
    fn test_validate_rejects_empty_block() {
        let doc = Document::new(vec![Block::heading(""), Block::new(BlockType::Paragraph, vec![])]);
        assert_eq!(doc.validate(), Err(EngineError::EmptyBlock(Path::from([1]))));
    }

    #[test]
    fn test_texts_and_text_blocks_in_document_order() {
        let doc = sample();
        let paths: Vec<Path> = doc.texts().into_iter().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            vec![
                Path::from([0, 0]),
                Path::from([1, 0]),
                Path::from([1, 1]),
                Path::from([2, 0, 0]),
            ]
        );
        assert_eq!(
            doc.text_blocks(),
            vec![Path::from([0]), Path::from([1]), Path::from([2, 0])]
        );
    }

    #[test]
    fn test_start_of() {
        let doc = sample();
        assert_eq!(doc.start_of(&Path::from([1])), Some(Point::new([1, 0], 0)));
        assert_eq!(doc.start_of(&Path::from([2])), Some(Point::new([2, 0, 0], 0)));
        assert_eq!(doc.start_of(&Path::from([5])), None);
    }

    #[test]
    fn test_next_and_previous_text() {
        let doc = sample();
        assert_eq!(doc.next_text(&Path::from([0, 0])), Some(Path::from([1, 0])));
        assert_eq!(doc.previous_text(&Path::from([2, 0, 0])), Some(Path::from([1, 1])));
        assert_eq!(doc.previous_text(&Path::from([0, 0])), None);
        assert_eq!(doc.next_text(&Path::from([2, 0, 0])), None);
    }

    #[test]
    fn test_split_text() {
        let mut doc = sample();
        assert!(doc.split_text(&Path::from([0, 0]), 2));
        assert_eq!(doc.blocks[0].children.len(), 2);
        assert_eq!(doc.text(&Path::from([0, 0])).map(|r| r.text.as_str()), Some("Ti"));
        assert_eq!(doc.text(&Path::from([0, 1])).map(|r| r.text.as_str()), Some("tle"));

        // Edges are not split
        assert!(!doc.split_text(&Path::from([0, 0]), 0));
        assert!(!doc.split_text(&Path::from([0, 0]), 2));
    }

    #[test]
    fn test_remove_node_prunes_empty_ancestors() {
        let mut doc = sample();
        let removed = doc.remove_node(&Path::from([2, 0, 0]));
        assert!(removed.is_some());
        // The nested paragraph and the list around it were left empty
        assert_eq!(doc.block_count(), 2);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_insert_node_at_top_level_requires_block() {
        let mut doc = sample();
        assert!(!doc.insert_node(&Path::from([1]), Node::Text(TextRun::new("x"))));
        assert!(doc.insert_node(&Path::from([1]), Node::Block(Block::paragraph("x"))));
        assert_eq!(doc.block_count(), 4);
        assert_eq!(doc.blocks[1].plain_text(), "x");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(sample().plain_text(), "Title\nHello world\nitem");
    }

    #[test]
    fn test_outline() {
        insta::assert_snapshot!(sample().outline(), @r#"
        heading
          "Title"
        paragraph
          "Hello "
          "world" [bold]
        list
          paragraph
            "item"
        "#);
    }
}
