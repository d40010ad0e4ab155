use crate::controller::command_types::Mode;
use crate::controller::search_commands::SearchCommands;
use crate::controller::shared_state::{ModeController, ModeTransition, SharedViewerState};
use crossterm::event::{KeyCode, KeyEvent};

/// Browsing the remembered patterns.
pub struct HistoryController {
    pub selected: usize,
}

impl Default for HistoryController {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryController {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    fn delete_selected(&mut self, shared: &mut SharedViewerState) {
        let history = shared.client.history_mut();
        if let Some(pattern) = history.remove(self.selected) {
            if let Err(e) = history.save() {
                log::warn!("could not save history: {e}");
            }
            shared.set_status(format!("Removed {pattern} from history"));
        }
        let len = shared.client.history().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

impl ModeController for HistoryController {
    fn handle_key(&mut self, key_event: KeyEvent, shared: &mut SharedViewerState) -> ModeTransition {
        let len = shared.client.history().len();
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                ModeTransition::Stay
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < len {
                    self.selected += 1;
                }
                ModeTransition::Stay
            }
            KeyCode::Enter => {
                let Some(pattern) = shared.client.history().get(self.selected).map(str::to_string)
                else {
                    return ModeTransition::Stay;
                };
                SearchCommands::submit(shared, &pattern);
                ModeTransition::ToMode(Mode::Normal)
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.delete_selected(shared);
                ModeTransition::Stay
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') => {
                ModeTransition::ToMode(Mode::Normal)
            }
            _ => ModeTransition::Stay,
        }
    }
}
