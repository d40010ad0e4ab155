use crate::client::{SearchClient, Target};
use crate::controller::command_types::Mode;
use crate::controller::history::HistoryController;
use crate::controller::normal::NormalController;
use crate::controller::pattern_input::PatternInputController;
use crate::controller::search_commands::SearchCommands;
use crate::controller::shared_state::{ModeController, ModeTransition, SharedViewerState};
use crate::document_model::DocumentTree;
use crate::view::renderer::entry_at;
use crate::view::{RenderParams, View};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::io::stdout;

const WHEEL_ROWS: isize = 3;

pub struct ViewerController {
    shared_state: SharedViewerState,
    current_mode: Mode,

    // Mode-specific controllers
    normal_controller: NormalController,
    pattern_input_controller: PatternInputController,
    history_controller: HistoryController,
}

impl ViewerController {
    pub fn new(tree: DocumentTree, target: Target, client: SearchClient) -> Self {
        Self {
            shared_state: SharedViewerState::new(tree, target, client),
            current_mode: Mode::Normal,
            normal_controller: NormalController::new(),
            pattern_input_controller: PatternInputController::new(),
            history_controller: HistoryController::new(),
        }
    }

    pub fn shared_state(&self) -> &SharedViewerState {
        &self.shared_state
    }

    pub fn current_mode(&self) -> Mode {
        self.current_mode
    }

    /// Run a search before the first frame, e.g. from `--pattern`.
    pub fn initial_search(&mut self, pattern: &str) {
        SearchCommands::submit(&mut self.shared_state, pattern);
    }

    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

        let result = self.run_loop();

        execute!(stdout(), cursor::Show, DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let (width, rows) = View::text_area()?;
            self.shared_state.set_viewport(width, rows);
            self.render()?;

            match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    if self.handle_key(key_event) == ModeTransition::Quit {
                        break;
                    }
                }
                Event::Mouse(mouse_event) => self.handle_mouse(mouse_event),
                Event::Resize(..) => self.shared_state.view.force_redraw(),
                _ => {}
            }
        }

        Ok(())
    }

    fn render(&mut self) -> std::io::Result<()> {
        let shared = &mut self.shared_state;
        let position_label = shared.client.position_label();
        let flags = shared.client.flags.to_string();
        let params = RenderParams {
            mode: &self.current_mode,
            input_buffer: &self.pattern_input_controller.input_buffer,
            status_message: &shared.status_message,
            is_error: shared.is_error,
            position_label: &position_label,
            flags: &flags,
            history: shared.client.history().entries(),
            history_selected: self.history_controller.selected,
        };
        shared.view.render(
            shared.engine.tree(),
            shared.engine.geometry(),
            &shared.engine.session().position_map,
            &params,
        )
    }

    /// Dispatch one key press. Any message on screen is dismissed first.
    pub fn handle_key(&mut self, key_event: KeyEvent) -> ModeTransition {
        self.shared_state.dismiss_message();

        let transition = match self.current_mode {
            Mode::Normal => self.normal_controller.handle_key(key_event, &mut self.shared_state),
            Mode::PatternInput => self
                .pattern_input_controller
                .handle_key(key_event, &mut self.shared_state),
            Mode::History => self
                .history_controller
                .handle_key(key_event, &mut self.shared_state),
        };

        if let ModeTransition::ToMode(mode) = transition {
            self.transition_to_mode(mode);
        }
        transition
    }

    fn transition_to_mode(&mut self, new_mode: Mode) {
        match new_mode {
            Mode::PatternInput => self.pattern_input_controller.reset(),
            Mode::History => self.history_controller.selected = 0,
            Mode::Normal => {}
        }
        if self.current_mode == Mode::History || new_mode == Mode::History {
            self.shared_state.view.force_redraw();
        }
        self.current_mode = new_mode;
    }

    /// Wheel scrolls; a click on the overview strip jumps to that match.
    pub fn handle_mouse(&mut self, mouse_event: MouseEvent) {
        let shared = &mut self.shared_state;
        let (text_width, rows) = shared.viewport;
        let content_rows = shared.content_rows();
        match mouse_event.kind {
            MouseEventKind::ScrollDown => shared.view.scroll_by(WHEEL_ROWS, content_rows, rows),
            MouseEventKind::ScrollUp => shared.view.scroll_by(-WHEEL_ROWS, content_rows, rows),
            MouseEventKind::Down(MouseButton::Left)
                if self.current_mode == Mode::Normal && mouse_event.column as usize == text_width =>
            {
                let map = &shared.engine.session().position_map;
                if let Some(index) = entry_at(map, mouse_event.row as usize, rows) {
                    shared.dismiss_message();
                    SearchCommands::jump(shared, index + 1);
                }
            }
            _ => {}
        }
    }
}
