use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::model::{Node, TextRun};

/// Structural type tag of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading,
    Code,
    List,
}

impl BlockType {
    pub const ALL: [BlockType; 4] = [
        BlockType::Paragraph,
        BlockType::Heading,
        BlockType::Code,
        BlockType::List,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading => "heading",
            BlockType::Code => "code",
            BlockType::List => "list",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|block_type| block_type.name() == s)
            .ok_or_else(|| ParseError::UnknownBlockType(s.to_string()))
    }
}

/// Structural node holding nested blocks and/or text runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub children: Vec<Node>,
}

impl Block {
    pub fn new(kind: BlockType, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    /// A block holding a single unformatted run
    pub fn with_text(kind: BlockType, text: impl Into<String>) -> Self {
        Self::new(kind, vec![Node::Text(TextRun::new(text))])
    }

    /// An empty block; it still carries one empty run so it stays editable
    pub fn empty(kind: BlockType) -> Self {
        Self::with_text(kind, "")
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_text(BlockType::Paragraph, text)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::with_text(BlockType::Heading, text)
    }

    /// Concatenated text of every run under this block
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                Node::Text(run) => text.push_str(&run.text),
                Node::Block(block) => text.push_str(&block.plain_text()),
            }
        }
        text
    }

    /// True if this block directly contains at least one text run
    pub fn holds_text(&self) -> bool {
        self.children.iter().any(Node::is_text)
    }
}
