use crate::document_model::NodeId;
use crate::error::Error;
use crate::search::{DEFAULT_MAX_MATCHES, Direction};
use serde::{Deserialize, Serialize};

/// A request crossing the caller/engine boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    Search(SearchRequest),
    Navigate(NavigateRequest),
    JumpTo(JumpRequest),
    ClearHighlights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub pattern: String,
    #[serde(default)]
    pub flags: String,
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,
}

fn default_max_matches() -> usize {
    DEFAULT_MAX_MATCHES
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpRequest {
    pub index: usize,
}

/// Per-match summary returned by a search; `index` is the in-leaf offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub text: String,
    pub index: usize,
    pub length: usize,
}

/// Why a request failed. Kept in-process only; the wire shape is just
/// `{success:false,error}`, which reads back as `Pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureKind {
    #[default]
    Pattern,
    DocumentChanged(NodeId),
    /// The request never reached a handler
    Rejected,
}

impl From<&Error> for FailureKind {
    fn from(error: &Error) -> Self {
        match error {
            Error::Pattern(_) => FailureKind::Pattern,
            Error::DocumentChanged(node) => FailureKind::DocumentChanged(*node),
            _ => FailureKind::Rejected,
        }
    }
}

/// Responses, shaped exactly like the payloads callers already expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Searched {
        success: bool,
        count: usize,
        matches: Vec<MatchSummary>,
    },
    Failed {
        success: bool,
        error: String,
        #[serde(skip)]
        kind: FailureKind,
    },
    Navigated {
        index: usize,
        text: String,
    },
    NoSelection {
        index: i64,
    },
    Cleared {
        success: bool,
    },
}

impl Response {
    pub fn searched(matches: Vec<MatchSummary>) -> Self {
        Response::Searched {
            success: true,
            count: matches.len(),
            matches,
        }
    }

    pub fn failed(error: &Error) -> Self {
        Response::Failed {
            success: false,
            error: error.to_string(),
            kind: FailureKind::from(error),
        }
    }

    /// Failure for a request that could not be decoded.
    pub fn rejected(error: impl Into<String>) -> Self {
        Response::Failed {
            success: false,
            error: error.into(),
            kind: FailureKind::Rejected,
        }
    }

    pub fn navigated(index: usize, text: String) -> Self {
        Response::Navigated { index, text }
    }

    pub fn no_selection() -> Self {
        Response::NoSelection { index: -1 }
    }

    pub fn cleared() -> Self {
        Response::Cleared { success: true }
    }
}
