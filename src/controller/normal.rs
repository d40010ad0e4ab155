use crate::controller::command_types::{Command, Mode};
use crate::controller::key_handler::KeyHandler;
use crate::controller::search_commands::SearchCommands;
use crate::controller::shared_state::{ModeController, ModeTransition, SharedViewerState};
use crossterm::event::KeyEvent;

pub struct NormalController {
    pub number_prefix: Option<usize>,
}

impl Default for NormalController {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalController {
    pub fn new() -> Self {
        Self {
            number_prefix: None,
        }
    }

    fn scroll(shared: &mut SharedViewerState, delta: isize) {
        let content_rows = shared.content_rows();
        let visible_rows = shared.viewport.1;
        shared.view.scroll_by(delta, content_rows, visible_rows);
    }
}

impl ModeController for NormalController {
    fn handle_key(&mut self, key_event: KeyEvent, shared: &mut SharedViewerState) -> ModeTransition {
        let Some(command) = KeyHandler::parse_normal_key_with_state(&key_event, &mut self.number_prefix)
        else {
            return ModeTransition::Stay;
        };

        let page = shared.viewport.1.saturating_sub(1).max(1) as isize;
        match command {
            Command::EnterPatternInput => return ModeTransition::ToMode(Mode::PatternInput),
            Command::ShowHistory => return ModeTransition::ToMode(Mode::History),
            Command::Quit => return ModeTransition::Quit,

            Command::NextMatch => SearchCommands::next(shared),
            Command::PreviousMatch => SearchCommands::previous(shared),
            Command::FirstMatch => SearchCommands::first(shared),
            Command::LastMatch => SearchCommands::last(shared),
            Command::JumpToMatch(number) => SearchCommands::jump(shared, number),

            Command::ClearHighlights => SearchCommands::clear(shared),
            Command::CopyResults => SearchCommands::copy(shared),
            Command::Reload => SearchCommands::reload(shared),
            Command::ToggleIgnoreCase => SearchCommands::toggle_ignore_case(shared),

            Command::ScrollDown(n) => Self::scroll(shared, n as isize),
            Command::ScrollUp(n) => Self::scroll(shared, -(n as isize)),
            Command::PageDown => Self::scroll(shared, page),
            Command::PageUp => Self::scroll(shared, -page),
            Command::Redraw => shared.view.force_redraw(),
        }
        ModeTransition::Stay
    }
}
