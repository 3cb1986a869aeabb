//! Command Dispatcher: transcript → `VoiceCommand` → registry / ambient
//! mutations.
//!
//! Parsing is keyword based, case-insensitive and first-match-wins:
//!
//! 1. deletion : `clear` / `remove` / `delete` (`all` ⇒ whole registry)
//! 2. creation : `create` / `add` / `spawn` together with `object`
//! 3. colour   : any name from [`color::NAMED_COLORS`]
//!
//! Anything else is ignored. Voice input is noisy, so an unmatched phrase is
//! not an error.

pub mod color;
pub mod dispatch;

pub use color::{NamedColor, DEFAULT_AMBIENT_COLOR, NAMED_COLORS};
pub use dispatch::{CommandContext, CommandDispatcher, DispatchOutcome, VoiceConfig};

const DELETE_KEYWORDS: [&str; 3] = ["clear", "remove", "delete"];
const CREATE_KEYWORDS: [&str; 3] = ["create", "add", "spawn"];

/// A recognised voice command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    ClearAll,
    /// Remove the object currently in focus.
    RemoveFocused,
    Spawn { quantity: usize },
    SetColor(&'static NamedColor),
}

impl VoiceCommand {
    /// Parse one transcript. `None` when no rule matches.
    pub fn parse(transcript: &str) -> Option<Self> {
        let text = transcript.to_lowercase();

        if DELETE_KEYWORDS.iter().any(|k| text.contains(k)) {
            return Some(if text.contains("all") {
                Self::ClearAll
            } else {
                Self::RemoveFocused
            });
        }

        if CREATE_KEYWORDS.iter().any(|k| text.contains(k)) && text.contains("object") {
            return Some(Self::Spawn {
                quantity: parse_quantity(&text),
            });
        }

        color::find_in(&text).map(Self::SetColor)
    }
}

/// Requested spawn count: "three"/"3" ⇒ 3, "two"/"2" ⇒ 2, otherwise 1.
fn parse_quantity(text: &str) -> usize {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.iter().any(|w| *w == "three" || *w == "3") {
        3
    } else if words.iter().any(|w| *w == "two" || *w == "2") {
        2
    } else {
        1
    }
}

/// If `transcript` starts with `wake_word`, return the remainder (possibly
/// empty) with surrounding punctuation trimmed.
pub fn strip_wake_word<'a>(transcript: &'a str, wake_word: &str) -> Option<&'a str> {
    let trimmed = transcript.trim_matches(|c: char| !c.is_alphanumeric());
    let head = trimmed.get(..wake_word.len())?;
    if !head.eq_ignore_ascii_case(wake_word) {
        return None;
    }
    let rest = &trimmed[wake_word.len()..];
    // "auras" or "auratic" are not the wake word.
    if rest.chars().next().is_some_and(|c| c.is_alphanumeric()) {
        return None;
    }
    Some(rest.trim_matches(|c: char| !c.is_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_wins_over_creation() {
        assert_eq!(
            VoiceCommand::parse("remove the object I added"),
            Some(VoiceCommand::RemoveFocused)
        );
    }

    #[test]
    fn delete_all_clears() {
        assert_eq!(
            VoiceCommand::parse("Clear all objects"),
            Some(VoiceCommand::ClearAll)
        );
    }

    #[test]
    fn creation_requires_object_keyword() {
        assert_eq!(VoiceCommand::parse("add some sparkle"), None);
        assert_eq!(
            VoiceCommand::parse("spawn an object"),
            Some(VoiceCommand::Spawn { quantity: 1 })
        );
    }

    #[test]
    fn quantity_words_and_digits() {
        assert_eq!(
            VoiceCommand::parse("create two objects"),
            Some(VoiceCommand::Spawn { quantity: 2 })
        );
        assert_eq!(
            VoiceCommand::parse("add 3 objects"),
            Some(VoiceCommand::Spawn { quantity: 3 })
        );
        // "someone" must not read as a number.
        assert_eq!(parse_quantity("someone create object"), 1);
    }

    #[test]
    fn colour_is_last_resort() {
        match VoiceCommand::parse("make it GOLD") {
            Some(VoiceCommand::SetColor(c)) => assert_eq!(c.hex, "#ffd700"),
            other => panic!("expected colour, got {other:?}"),
        }
        assert_eq!(VoiceCommand::parse("hello there"), None);
    }

    #[test]
    fn wake_word_prefix() {
        assert_eq!(strip_wake_word("Aura.", "aura"), Some(""));
        assert_eq!(
            strip_wake_word("aura, create an object", "aura"),
            Some("create an object")
        );
        assert_eq!(strip_wake_word("auratic", "aura"), None);
        assert_eq!(strip_wake_word("red", "aura"), None);
    }
}
