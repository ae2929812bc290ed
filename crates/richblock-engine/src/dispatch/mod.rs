//! Key command dispatcher.
//!
//! [`Dispatcher::handle_key`] decides what a key event means for the current
//! document and selection without touching either. [`Dispatcher::apply`]
//! carries out the decision against a [`DocumentEngine`](crate::engine::DocumentEngine).
//! The free functions in [`ops`] are the editing commands both paths share,
//! and are also what the toolbar calls.

pub mod command;
pub mod dispatcher;
pub mod keymap;
pub mod ops;
pub mod queries;

pub use command::Command;
pub use dispatcher::{Dispatch, Dispatcher, TransformRequest};
pub use keymap::Keymap;
pub use ops::{insert_block_after_current, set_block_type, set_mark, toggle_block_type, toggle_mark};
pub use queries::{is_block_of_type, is_mark_active};
