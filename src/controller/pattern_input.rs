use crate::controller::command_types::Mode;
use crate::controller::search_commands::SearchCommands;
use crate::controller::shared_state::{ModeController, ModeTransition, SharedViewerState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The `/` input line. Up and Down recall history entries.
pub struct PatternInputController {
    pub input_buffer: String,
    history_cursor: Option<usize>,
}

impl Default for PatternInputController {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternInputController {
    pub fn new() -> Self {
        Self {
            input_buffer: String::new(),
            history_cursor: None,
        }
    }

    pub fn reset(&mut self) {
        self.input_buffer.clear();
        self.history_cursor = None;
    }

    fn recall(&mut self, shared: &SharedViewerState, older: bool) {
        let history = shared.client.history();
        if history.is_empty() {
            return;
        }
        let next = match (self.history_cursor, older) {
            (None, true) => Some(0),
            (None, false) => None,
            (Some(i), true) => Some((i + 1).min(history.len() - 1)),
            (Some(0), false) => None,
            (Some(i), false) => Some(i - 1),
        };
        self.history_cursor = next;
        self.input_buffer = next
            .and_then(|i| history.get(i))
            .unwrap_or_default()
            .to_string();
    }
}

impl ModeController for PatternInputController {
    fn handle_key(&mut self, key_event: KeyEvent, shared: &mut SharedViewerState) -> ModeTransition {
        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset();
                ModeTransition::ToMode(Mode::Normal)
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                ModeTransition::Stay
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                ModeTransition::Stay
            }
            KeyCode::Up => {
                self.recall(shared, true);
                ModeTransition::Stay
            }
            KeyCode::Down => {
                self.recall(shared, false);
                ModeTransition::Stay
            }
            KeyCode::Enter => {
                let pattern = std::mem::take(&mut self.input_buffer);
                SearchCommands::submit(shared, &pattern);
                self.reset();
                ModeTransition::ToMode(Mode::Normal)
            }
            KeyCode::Esc => {
                self.reset();
                ModeTransition::ToMode(Mode::Normal)
            }
            _ => ModeTransition::Stay,
        }
    }
}
