/// Configuration subsystem - Search settings and preferences
///
/// This module handles loading settings from .markfindrc files: the match cap,
/// history size, default flags and where the search history is kept.

pub mod rc;

// Re-export public interface
pub use rc::{RcConfig, RcLoader};
