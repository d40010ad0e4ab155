/// View subsystem - Terminal layout and rendering of the searched document
///
/// The layout flattens the document tree into wrapped rows and doubles as the
/// engine's geometry provider; the renderer draws those rows with highlighted
/// markers, the overview strip and the status line.

pub mod layout;
pub mod renderer;

// Re-export public interface
pub use layout::TerminalLayout;
pub use renderer::{RenderParams, View};
