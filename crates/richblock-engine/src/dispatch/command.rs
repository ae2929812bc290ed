use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::model::{BlockType, Mark};

/// A bindable editing command.
///
/// Commands are named in bindings and on the toolbar by their string form:
/// `toggle_bold`, `toggle_code`, `set_heading`, `insert_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Command {
    ToggleMark(Mark),
    /// Switch the selected blocks to the type, or back to the default type
    /// when they already have it
    ToggleBlock(BlockType),
    SetBlockType(BlockType),
    InsertBlock,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ToggleMark(mark) => write!(f, "toggle_{mark}"),
            Command::ToggleBlock(kind) => write!(f, "toggle_{kind}"),
            Command::SetBlockType(kind) => write!(f, "set_{kind}"),
            Command::InsertBlock => write!(f, "insert_block"),
        }
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseError::UnknownCommand(s.to_string());
        let name = s.trim().to_lowercase();

        if name == "insert_block" {
            return Ok(Command::InsertBlock);
        }
        if let Some(target) = name.strip_prefix("toggle_") {
            if let Ok(mark) = target.parse::<Mark>() {
                return Ok(Command::ToggleMark(mark));
            }
            return target
                .parse::<BlockType>()
                .map(Command::ToggleBlock)
                .map_err(|_| unknown());
        }
        if let Some(target) = name.strip_prefix("set_") {
            return target
                .parse::<BlockType>()
                .map(Command::SetBlockType)
                .map_err(|_| unknown());
        }
        Err(unknown())
    }
}

impl TryFrom<String> for Command {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Command> for String {
    fn from(command: Command) -> Self {
        command.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("toggle_bold", Command::ToggleMark(Mark::Bold))]
    #[case("toggle_underline", Command::ToggleMark(Mark::Underline))]
    #[case("toggle_code", Command::ToggleBlock(BlockType::Code))]
    #[case("Toggle_List", Command::ToggleBlock(BlockType::List))]
    #[case("set_heading", Command::SetBlockType(BlockType::Heading))]
    #[case("insert_block", Command::InsertBlock)]
    fn test_parse(#[case] input: &str, #[case] expected: Command) {
        assert_eq!(input.parse::<Command>(), Ok(expected));
    }

    #[rstest]
    #[case("undo")]
    #[case("toggle_strike")]
    #[case("set_bold")]
    #[case("")]
    fn test_parse_unknown(#[case] input: &str) {
        assert_eq!(
            input.parse::<Command>(),
            Err(ParseError::UnknownCommand(input.to_string()))
        );
    }

    #[test]
    fn test_display_uses_binding_names() {
        assert_eq!(Command::ToggleMark(Mark::Italic).to_string(), "toggle_italic");
        assert_eq!(Command::SetBlockType(BlockType::Paragraph).to_string(), "set_paragraph");
    }
}
