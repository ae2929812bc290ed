//! Document model: blocks, text runs, paths and selections.
//!
//! The tree is owned by the [`Editor`](crate::engine::Editor) and only
//! mutated through its transforms; everything here is plain data plus
//! read-only navigation helpers.

pub mod block;
pub mod document;
pub mod node;
pub mod path;
pub mod selection;
pub mod text;

pub use block::{Block, BlockType};
pub use document::{Document, NodeRef};
pub use node::Node;
pub use path::Path;
pub use selection::{Point, Selection};
pub use text::{Mark, Marks, TextRun};
