use crate::controller::command_types::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct KeyHandler;

impl KeyHandler {
    /// Parse a normal-mode key. Digits accumulate in `number_prefix` and
    /// are consumed by the next key; only `j` gives them a meaning.
    pub fn parse_normal_key_with_state(
        key_event: &KeyEvent,
        number_prefix: &mut Option<usize>,
    ) -> Option<Command> {
        let key = key_event.code;
        let modifiers = key_event.modifiers;

        match key {
            // Handle numbers for prefixes
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(digit) = c.to_digit(10) {
                    *number_prefix = Some(
                        number_prefix
                            .unwrap_or(0)
                            .saturating_mul(10)
                            .saturating_add(digit as usize),
                    );
                }
                None // Wait for the actual command
            }
            KeyCode::Char('j') if number_prefix.is_some() => {
                number_prefix.take().map(Command::JumpToMatch)
            }
            _ => {
                number_prefix.take();
                Self::parse_normal_mode_key(key, modifiers)
            }
        }
    }

    fn parse_normal_mode_key(key: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
        match key {
            // Control keys first (more specific)
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
            KeyCode::Char('l') if modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Redraw)
            }
            KeyCode::Char('f') if modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::PageDown)
            }
            KeyCode::Char('b') if modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::PageUp)
            }

            // Pattern entry
            KeyCode::Char('/') => Some(Command::EnterPatternInput),
            KeyCode::Char('h') => Some(Command::ShowHistory),
            KeyCode::Char('f') => Some(Command::ToggleIgnoreCase),

            // Match navigation
            KeyCode::Enter if modifiers.contains(KeyModifiers::SHIFT) => {
                Some(Command::PreviousMatch)
            }
            KeyCode::Char('n') | KeyCode::Enter => Some(Command::NextMatch),
            KeyCode::Char('N') => Some(Command::PreviousMatch),
            KeyCode::Char('g') => Some(Command::FirstMatch),
            KeyCode::Char('G') => Some(Command::LastMatch),

            // Session
            KeyCode::Char('c') => Some(Command::ClearHighlights),
            KeyCode::Char('y') => Some(Command::CopyResults),
            KeyCode::Char('r') => Some(Command::Reload),
            KeyCode::Char('q') => Some(Command::Quit),

            // Scrolling
            KeyCode::Char('j') | KeyCode::Down => Some(Command::ScrollDown(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Command::ScrollUp(1)),
            KeyCode::PageDown | KeyCode::Char(' ') => Some(Command::PageDown),
            KeyCode::PageUp => Some(Command::PageUp),

            _ => None,
        }
    }
}
