//! Text-match-and-highlight engine.
//!
//! Stages, each consuming the previous one's output:
//! - [`locator`] walks text leaves in document order and collects matches
//! - [`highlighter`] wraps each match in a marker node
//! - [`position_map`] derives the overview strip from marker geometry
//! - [`navigator`] moves the single "current" marker
//! - [`restorer`] puts each cut-up leaf back together
//!
//! [`SearchEngine`] ties them to one document and one session.

pub mod engine;
pub mod highlighter;
pub mod locator;
pub mod navigator;
pub mod pattern;
pub mod position_map;
pub mod restorer;

pub use engine::{DEFAULT_MAX_MATCHES, SearchEngine};
pub use navigator::{Direction, NavigationOutcome};
pub use pattern::PatternFlags;
pub use position_map::{GeometryProvider, Rect};
