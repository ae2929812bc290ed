use crate::model::Path;

/// Errors raised when a document or selection violates the model invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Block at {0} has no children")]
    EmptyBlock(Path),
    #[error("Path {0} does not resolve to a text run")]
    InvalidPath(Path),
    #[error("Offset {offset} is past the end of the text run at {path} (length {len})")]
    InvalidOffset { path: Path, offset: usize, len: usize },
}

/// Errors raised when parsing keystrokes, commands and model names from strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty keystroke")]
    EmptyKeystroke,
    #[error("Unknown modifier '{0}'")]
    UnknownModifier(String),
    #[error("Unknown key '{0}'")]
    UnknownKey(String),
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    #[error("Unknown block type '{0}'")]
    UnknownBlockType(String),
    #[error("Unknown mark '{0}'")]
    UnknownMark(String),
}
