//! Crossterm key events to engine key events

use crossterm::event::{KeyCode, KeyEvent as TermKeyEvent, KeyEventKind, KeyModifiers};
use richblock_engine::{Key, KeyEvent, Modifiers};

/// How the terminal encodes keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEncoding {
    /// Keyboard enhancement protocol active: ctrl chords arrive as typed
    Enhanced,
    /// Plain escape codes. Ctrl+` and Ctrl+2 both send NUL, which crossterm
    /// reports as ctrl+space. Ctrl+1 cannot be told apart from `1`.
    Legacy,
}

/// Translate a terminal key event. Releases, repeats and keys the editor has
/// no name for (function keys, media keys) yield `None`.
pub fn key_event(event: &TermKeyEvent, encoding: KeyEncoding) -> Option<KeyEvent> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let nul = encoding == KeyEncoding::Legacy
        && event.code == KeyCode::Char(' ')
        && event.modifiers.contains(KeyModifiers::CONTROL);
    let key = match event.code {
        // NUL is what ctrl+` sends, so it reaches the code block binding
        KeyCode::Char(_) if nul => Key::Char('`'),
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => return None,
    };

    let mods = event.modifiers;
    let modifiers = Modifiers::new(
        mods.contains(KeyModifiers::CONTROL),
        mods.contains(KeyModifiers::SHIFT) || event.code == KeyCode::BackTab,
        mods.contains(KeyModifiers::ALT),
        mods.intersects(KeyModifiers::SUPER | KeyModifiers::META),
    );
    Some(KeyEvent::new(key, modifiers))
}
