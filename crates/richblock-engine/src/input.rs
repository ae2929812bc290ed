//! Key event types delivered by the presentation layer: Key, Modifiers,
//! KeyEvent and the normalized Keystroke used as a binding key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Modifier keys as a bitfield
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000);

    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= Self::CTRL.0;
        }
        if shift {
            bits |= Self::SHIFT.0;
        }
        if alt {
            bits |= Self::ALT.0;
        }
        if meta {
            bits |= Self::META.0;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & Self::CTRL.0 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & Self::SHIFT.0 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & Self::ALT.0 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & Self::META.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when ctrl, alt or meta is held. Shift on its own only changes
    /// the typed character, so it does not make a shortcut.
    #[inline]
    pub const fn is_command_chord(self) -> bool {
        self.ctrl() || self.alt() || self.meta()
    }

}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("ctrl");
        }
        if self.alt() {
            parts.push("alt");
        }
        if self.shift() {
            parts.push("shift");
        }
        if self.meta() {
            parts.push("meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A logical key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    const NAMED: [(Key, &'static str); 13] = [
        (Key::Enter, "enter"),
        (Key::Backspace, "backspace"),
        (Key::Delete, "delete"),
        (Key::Tab, "tab"),
        (Key::Escape, "escape"),
        (Key::Up, "up"),
        (Key::Down, "down"),
        (Key::Left, "left"),
        (Key::Right, "right"),
        (Key::Home, "home"),
        (Key::End, "end"),
        (Key::PageUp, "pageup"),
        (Key::PageDown, "pagedown"),
    ];
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => write!(f, "space"),
            Key::Char(c) => write!(f, "{c}"),
            named => {
                let name = Key::NAMED
                    .iter()
                    .find(|(key, _)| key == named)
                    .map(|(_, name)| *name)
                    .unwrap_or("?");
                write!(f, "{name}")
            }
        }
    }
}

impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(c.to_ascii_lowercase()));
        }

        let lower = s.to_lowercase();
        let canonical = match lower.as_str() {
            "return" => "enter",
            "esc" => "escape",
            "del" => "delete",
            "space" => return Ok(Key::Char(' ')),
            other => other,
        };
        Key::NAMED
            .iter()
            .find(|(_, name)| *name == canonical)
            .map(|(key, _)| *key)
            .ok_or_else(|| ParseError::UnknownKey(s.to_string()))
    }
}

/// A keyboard event as delivered by the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// An unmodified key press
    pub const fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::CTRL)
    }

    pub fn keystroke(&self) -> Keystroke {
        Keystroke::new(self.key, self.modifiers)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keystroke())
    }
}

/// Normalized key + modifiers, used to look up bindings.
///
/// Character keys are lower-cased so that `ctrl+B` and `ctrl+b` bind the same
/// way. Parses from strings like `ctrl+b` or `ctrl+shift+enter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Keystroke {
    pub key: Key,
    pub mods: Modifiers,
}

impl Keystroke {
    pub fn new(key: Key, mods: Modifiers) -> Self {
        let key = match key {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self { key, mods }
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::CTRL)
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.mods, self.key)
        }
    }
}

impl FromStr for Keystroke {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyKeystroke);
        }

        // The key is whatever follows the last '+', so "ctrl++" binds '+'
        let (mod_part, key_part) = if let Some(prefix) = trimmed.strip_suffix("++") {
            (prefix, "+")
        } else if trimmed == "+" {
            ("", "+")
        } else {
            match trimmed.rfind('+') {
                Some(index) => (&trimmed[..index], &trimmed[index + 1..]),
                None => ("", trimmed),
            }
        };

        let mut mods = Modifiers::NONE;
        for part in mod_part.split('+').filter(|part| !part.is_empty()) {
            mods = mods
                | match part.to_lowercase().as_str() {
                    "ctrl" | "control" => Modifiers::CTRL,
                    "shift" => Modifiers::SHIFT,
                    "alt" | "option" => Modifiers::ALT,
                    "meta" | "super" | "cmd" => Modifiers::META,
                    _ => return Err(ParseError::UnknownModifier(part.to_string())),
                };
        }

        if key_part.is_empty() {
            return Err(ParseError::EmptyKeystroke);
        }
        Ok(Keystroke::new(key_part.parse()?, mods))
    }
}

impl TryFrom<String> for Keystroke {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Keystroke> for String {
    fn from(keystroke: Keystroke) -> Self {
        keystroke.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_modifiers_combined() {
        let mods = Modifiers::CTRL | Modifiers::SHIFT;
        assert!(mods.ctrl());
        assert!(mods.shift());
        assert!(!mods.alt());
        assert!(!mods.meta());
        assert_eq!(mods | Modifiers::CTRL, mods);
    }

    #[test]
    fn test_shift_alone_is_not_a_command_chord() {
        assert!(!Modifiers::SHIFT.is_command_chord());
        assert!(!Modifiers::NONE.is_command_chord());
        assert!(Modifiers::CTRL.is_command_chord());
        assert!(Modifiers::ALT.is_command_chord());
        assert!(Modifiers::new(false, true, false, true).is_command_chord());
    }

    #[test]
    fn test_keystroke_lowercases_characters() {
        let upper = Keystroke::new(Key::Char('B'), Modifiers::CTRL);
        assert_eq!(upper, Keystroke::ctrl('b'));
    }

    #[rstest]
    #[case("ctrl+b", Keystroke::ctrl('b'))]
    #[case("Ctrl+B", Keystroke::ctrl('b'))]
    #[case("ctrl+`", Keystroke::ctrl('`'))]
    #[case("ctrl+1", Keystroke::ctrl('1'))]
    #[case("ctrl+shift+enter", Keystroke::new(Key::Enter, Modifiers::CTRL | Modifiers::SHIFT))]
    #[case("alt+space", Keystroke::new(Key::Char(' '), Modifiers::ALT))]
    #[case("backspace", Keystroke::new(Key::Backspace, Modifiers::NONE))]
    #[case("ctrl++", Keystroke::ctrl('+'))]
    fn test_keystroke_parse(#[case] input: &str, #[case] expected: Keystroke) {
        assert_eq!(input.parse::<Keystroke>(), Ok(expected));
    }

    #[rstest]
    #[case("", ParseError::EmptyKeystroke)]
    #[case("ctrl+", ParseError::EmptyKeystroke)]
    #[case("hyper+b", ParseError::UnknownModifier("hyper".to_string()))]
    #[case("ctrl+banana", ParseError::UnknownKey("banana".to_string()))]
    fn test_keystroke_parse_errors(#[case] input: &str, #[case] expected: ParseError) {
        assert_eq!(input.parse::<Keystroke>(), Err(expected));
    }

    #[test]
    fn test_keystroke_display_parses_back() {
        for text in ["ctrl+b", "ctrl+alt+x", "shift+tab", "enter", "ctrl+`"] {
            let keystroke: Keystroke = text.parse().unwrap();
            assert_eq!(keystroke.to_string(), text);
        }
    }

    #[test]
    fn test_key_event_keystroke() {
        let event = KeyEvent::new(Key::Char('Z'), Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(
            event.keystroke(),
            Keystroke::new(Key::Char('z'), Modifiers::CTRL | Modifiers::SHIFT)
        );
    }
}
