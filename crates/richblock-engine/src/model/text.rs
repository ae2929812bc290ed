use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Formatting attribute carried by a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

impl Mark {
    pub const ALL: [Mark; 3] = [Mark::Bold, Mark::Italic, Mark::Underline];

    pub fn name(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mark {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mark::ALL
            .into_iter()
            .find(|mark| mark.name() == s)
            .ok_or_else(|| ParseError::UnknownMark(s.to_string()))
    }
}

pub type Marks = BTreeSet<Mark>;

/// Leaf node: literal text plus its formatting marks
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub marks: Marks,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.insert(mark);
        self
    }

    pub fn with_marks(mut self, marks: Marks) -> Self {
        self.marks = marks;
        self
    }

    pub fn has_mark(&self, mark: Mark) -> bool {
        self.marks.contains(&mark)
    }

    pub fn set_mark(&mut self, mark: Mark, value: bool) {
        if value {
            self.marks.insert(mark);
        } else {
            self.marks.remove(&mark);
        }
    }

    /// Length in characters, the unit used by point offsets
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split at a character offset, keeping the head and returning the tail.
    /// Both halves keep this run's marks.
    pub fn split_off(&mut self, offset: usize) -> TextRun {
        let at = byte_index(&self.text, offset);
        let tail = self.text.split_off(at);
        TextRun {
            text: tail,
            marks: self.marks.clone(),
        }
    }

    pub fn insert_str(&mut self, offset: usize, text: &str) {
        let at = byte_index(&self.text, offset);
        self.text.insert_str(at, text);
    }

    /// Remove the characters in `start..end`
    pub fn remove_range(&mut self, start: usize, end: usize) {
        let from = byte_index(&self.text, start);
        let to = byte_index(&self.text, end);
        self.text.replace_range(from..to, "");
    }
}

/// Byte index of a character offset, clamped to the end of the string
fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}
