/// Document model subsystem - The searchable tree and per-search state
///
/// This module contains the arena document tree the engine mutates in place,
/// the markup loader that builds it, and the session value object that holds
/// one search's matches, markers, overview map and navigation state.

pub mod markup;
pub mod search_state;
pub mod tree;

// Re-export main types for convenience
pub use search_state::{
    LeafSplit, Match, MarkerPlacement, NavigationState, PositionEntry, ScrollBlock,
    ScrollRequest, SearchSession,
};
pub use tree::{DocumentTree, NodeId, NodeKind};
