pub mod dispatch;
pub mod engine;
pub mod error;
pub mod input;
pub mod model;

// Re-export key types for easier usage
pub use dispatch::{Command, Dispatch, Dispatcher, Keymap, TransformRequest};
pub use engine::{DocumentEngine, Editor, NodeMatch, NodeQuery, SetOptions};
pub use error::{EngineError, ParseError};
pub use input::{Key, KeyEvent, Keystroke, Modifiers};
pub use model::{
    Block, BlockType, Document, Mark, Marks, Node, NodeRef, Path, Point, Selection, TextRun,
};
