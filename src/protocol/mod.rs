//! Message boundary between callers and the engine.
//!
//! Requests are a tagged union dispatched through [`route`]; [`serve`] carries
//! them as JSON lines over any reader/writer pair.

pub mod message;
pub mod router;
pub mod transport;

pub use message::{FailureKind, MatchSummary, Request, Response};
pub use router::route;
pub use transport::serve;
