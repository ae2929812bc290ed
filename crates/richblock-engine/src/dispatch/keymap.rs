use std::collections::HashMap;

use crate::dispatch::Command;
use crate::input::Keystroke;
use crate::model::{BlockType, Mark};

/// Keystroke to command bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: HashMap<Keystroke, Command>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::with_bindings([
            (Keystroke::ctrl('b'), Command::ToggleMark(Mark::Bold)),
            (Keystroke::ctrl('i'), Command::ToggleMark(Mark::Italic)),
            (Keystroke::ctrl('u'), Command::ToggleMark(Mark::Underline)),
            (Keystroke::ctrl('`'), Command::ToggleBlock(BlockType::Code)),
            (Keystroke::ctrl('1'), Command::ToggleBlock(BlockType::List)),
            (Keystroke::ctrl('2'), Command::ToggleBlock(BlockType::Heading)),
        ])
    }
}

impl Keymap {
    /// A keymap with no bindings: every modifier chord is suppressed
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn with_bindings(bindings: impl IntoIterator<Item = (Keystroke, Command)>) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }

    /// Bind `keystroke`, returning the command it replaced
    pub fn bind(&mut self, keystroke: Keystroke, command: Command) -> Option<Command> {
        self.bindings.insert(keystroke, command)
    }

    pub fn unbind(&mut self, keystroke: &Keystroke) -> Option<Command> {
        self.bindings.remove(keystroke)
    }

    pub fn lookup(&self, keystroke: &Keystroke) -> Option<Command> {
        self.bindings.get(keystroke).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings sorted by their keystroke text, for help output
    pub fn bindings(&self) -> Vec<(Keystroke, Command)> {
        let mut bindings: Vec<_> = self
            .bindings
            .iter()
            .map(|(keystroke, command)| (*keystroke, *command))
            .collect();
        bindings.sort_by_key(|(keystroke, _)| keystroke.to_string());
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, Modifiers};

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default();
        assert_eq!(keymap.len(), 6);
        assert_eq!(
            keymap.lookup(&Keystroke::ctrl('b')),
            Some(Command::ToggleMark(Mark::Bold))
        );
        assert_eq!(
            keymap.lookup(&Keystroke::ctrl('`')),
            Some(Command::ToggleBlock(BlockType::Code))
        );
        assert_eq!(keymap.lookup(&Keystroke::ctrl('z')), None);
    }

    #[test]
    fn test_lookup_ignores_character_case_but_not_modifiers() {
        let keymap = Keymap::default();
        let upper = Keystroke::new(Key::Char('B'), Modifiers::CTRL);
        assert_eq!(upper, Keystroke::ctrl('b'));
        assert!(keymap.lookup(&upper).is_some());

        let with_alt = Keystroke::new(Key::Char('b'), Modifiers::CTRL | Modifiers::ALT);
        assert_eq!(keymap.lookup(&with_alt), None);
    }

    #[test]
    fn test_bind_replaces_and_unbind_removes() {
        let mut keymap = Keymap::default();
        let previous = keymap.bind(Keystroke::ctrl('b'), Command::SetBlockType(BlockType::Heading));
        assert_eq!(previous, Some(Command::ToggleMark(Mark::Bold)));
        assert_eq!(
            keymap.lookup(&Keystroke::ctrl('b')),
            Some(Command::SetBlockType(BlockType::Heading))
        );

        keymap.unbind(&Keystroke::ctrl('b'));
        assert_eq!(keymap.lookup(&Keystroke::ctrl('b')), None);
        assert!(Keymap::empty().is_empty());
    }

    #[test]
    fn test_bindings_are_sorted() {
        let names: Vec<String> = Keymap::default()
            .bindings()
            .into_iter()
            .map(|(keystroke, _)| keystroke.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["ctrl+1", "ctrl+2", "ctrl+`", "ctrl+b", "ctrl+i", "ctrl+u"]
        );
    }
}
