/// Controller subsystem - Handles all user input for the interactive viewer
///
/// This module contains the mode-specific controllers and the search command
/// handlers, keeping key interpretation apart from the engine and the view.

pub mod command_types;
pub mod history;
pub mod key_handler;
pub mod normal;
pub mod pattern_input;
pub mod search_commands;
pub mod shared_state;
pub mod viewer;

// Re-export public interface
pub use command_types::Mode;
pub use shared_state::SharedViewerState;
pub use viewer::ViewerController;
