use std::fmt;

use crate::dispatch::queries::{is_block_of_type, is_mark_active};
use crate::dispatch::{Command, Keymap, ops};
use crate::engine::DocumentEngine;
use crate::input::{Key, KeyEvent};
use crate::model::{BlockType, Document, Mark, Selection};

/// A structural edit decided by the dispatcher, resolved against the
/// document state at the time of the key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformRequest {
    SetMark { mark: Mark, value: bool },
    SetBlockType(BlockType),
    InsertBlockAfterCurrent(BlockType),
}

impl fmt::Display for TransformRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformRequest::SetMark { mark, value: true } => write!(f, "add {mark}"),
            TransformRequest::SetMark { mark, value: false } => write!(f, "remove {mark}"),
            TransformRequest::SetBlockType(kind) => write!(f, "set {kind}"),
            TransformRequest::InsertBlockAfterCurrent(kind) => write!(f, "insert {kind}"),
        }
    }
}

/// Outcome of dispatching one key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// The engine's default handling of the key must not run
    pub suppress_default: bool,
    pub request: Option<TransformRequest>,
}

impl Dispatch {
    /// Let the engine handle the key
    pub const fn pass() -> Self {
        Self {
            suppress_default: false,
            request: None,
        }
    }

    /// Swallow the key without editing
    pub const fn suppress() -> Self {
        Self {
            suppress_default: true,
            request: None,
        }
    }

    pub const fn suppress_with(request: Option<TransformRequest>) -> Self {
        Self {
            suppress_default: true,
            request,
        }
    }
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.suppress_default, self.request) {
            (_, Some(request)) => write!(f, "{request}"),
            (true, None) => write!(f, "suppressed"),
            (false, None) => write!(f, "default"),
        }
    }
}

/// Turns key events into at most one transform plus a suppress decision.
///
/// Rules, first match wins:
/// 1. Enter inserts a block of the default type after the current one.
/// 2. Backspace at the very start of the protected block is swallowed, so
///    the block above cannot be merged away. Any other backspace passes.
/// 3. A bound ctrl/alt/meta chord runs its command.
/// 4. Any other ctrl/alt/meta chord is swallowed.
/// 5. Everything else passes through to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatcher {
    keymap: Keymap,
    protected_block_index: Option<usize>,
    default_block_type: BlockType,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            keymap: Keymap::default(),
            protected_block_index: Some(1),
            default_block_type: BlockType::Paragraph,
        }
    }
}

impl Dispatcher {
    pub fn new(keymap: Keymap) -> Self {
        Self {
            keymap,
            ..Self::default()
        }
    }

    /// Top-level block whose start absorbs backspace. `None` disables the rule.
    pub fn with_protected_block_index(mut self, index: Option<usize>) -> Self {
        self.protected_block_index = index;
        self
    }

    pub fn with_default_block_type(mut self, block_type: BlockType) -> Self {
        self.default_block_type = block_type;
        self
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn protected_block_index(&self) -> Option<usize> {
        self.protected_block_index
    }

    pub fn default_block_type(&self) -> BlockType {
        self.default_block_type
    }

    /// Decide what `event` does. Reads the document and selection only.
    pub fn handle_key(
        &self,
        event: &KeyEvent,
        document: &Document,
        selection: Option<&Selection>,
    ) -> Dispatch {
        let dispatch = match event.key {
            Key::Enter => Dispatch::suppress_with(
                selection.map(|_| TransformRequest::InsertBlockAfterCurrent(self.default_block_type)),
            ),
            Key::Backspace => {
                if selection.is_some_and(|selection| self.absorbs_backspace(document, selection)) {
                    Dispatch::suppress()
                } else {
                    Dispatch::pass()
                }
            }
            _ if event.modifiers.is_command_chord() => match self.keymap.lookup(&event.keystroke()) {
                Some(command) => Dispatch::suppress_with(
                    selection.map(|selection| self.resolve(command, document, selection)),
                ),
                None => Dispatch::suppress(),
            },
            _ => Dispatch::pass(),
        };
        log::debug!("key {event} -> {dispatch}");
        dispatch
    }

    /// True when backspace would merge the protected block into the one before it.
    ///
    /// The caret must be collapsed at character 0 of the protected top-level
    /// block: offset 0 in its run, and every earlier run of that block empty.
    pub fn absorbs_backspace(&self, document: &Document, selection: &Selection) -> bool {
        let Some(protected) = self.protected_block_index else {
            return false;
        };
        let focus = &selection.focus;
        if !selection.is_collapsed() || focus.offset != 0 || focus.path.top_level() != Some(protected) {
            return false;
        }
        document
            .texts()
            .into_iter()
            .filter(|(path, _)| path.top_level() == Some(protected))
            .take_while(|(path, _)| *path != focus.path)
            .all(|(_, run)| run.is_empty())
    }

    /// The concrete edit `command` makes on this document and selection
    pub fn resolve(&self, command: Command, document: &Document, selection: &Selection) -> TransformRequest {
        match command {
            Command::ToggleMark(mark) => TransformRequest::SetMark {
                mark,
                value: !is_mark_active(document, selection, mark),
            },
            Command::ToggleBlock(block_type) => {
                if is_block_of_type(document, selection, block_type) {
                    TransformRequest::SetBlockType(self.default_block_type)
                } else {
                    TransformRequest::SetBlockType(block_type)
                }
            }
            Command::SetBlockType(block_type) => TransformRequest::SetBlockType(block_type),
            Command::InsertBlock => TransformRequest::InsertBlockAfterCurrent(self.default_block_type),
        }
    }

    /// Carry out a request against the engine
    pub fn apply<E: DocumentEngine + ?Sized>(&self, engine: &mut E, request: TransformRequest) {
        match request {
            TransformRequest::SetMark { mark, value } => ops::set_mark(engine, mark, value),
            TransformRequest::SetBlockType(block_type) => ops::set_block_type(engine, block_type),
            TransformRequest::InsertBlockAfterCurrent(block_type) => {
                ops::insert_block_after_current(engine, block_type)
            }
        }
    }

    /// Handle a key down event end to end. The caller runs the engine's
    /// default handling only when the returned dispatch does not suppress it.
    pub fn on_key_down<E: DocumentEngine + ?Sized>(&self, engine: &mut E, event: &KeyEvent) -> Dispatch {
        let dispatch = self.handle_key(event, engine.document(), engine.selection());
        if let Some(request) = dispatch.request {
            self.apply(engine, request);
        }
        dispatch
    }

    /// Run a command regardless of key state, as the toolbar does.
    /// Returns the request that was applied.
    pub fn run_command<E: DocumentEngine + ?Sized>(
        &self,
        engine: &mut E,
        command: Command,
    ) -> Option<TransformRequest> {
        let request = self.resolve(command, engine.document(), engine.selection()?);
        log::debug!("command {command} -> {request}");
        self.apply(engine, request);
        Some(request)
    }
}
