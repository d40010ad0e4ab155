//! The caller side of the engine: what a search box needs.
//!
//! [`SearchClient`] validates and submits patterns, tracks the last result
//! for the "i / n" label and the navigation controls, keeps the pattern
//! history, and copies results to the clipboard. It talks to the engine only
//! through a [`Channel`].

pub mod history;
pub mod target;

pub use history::SearchHistory;
pub use target::Target;

use crate::config::RcConfig;
use crate::error::{Error, Result};
use crate::protocol::message::{JumpRequest, NavigateRequest, SearchRequest};
use crate::protocol::{FailureKind, MatchSummary, Request, Response, route};
use crate::search::{Direction, GeometryProvider, PatternFlags, SearchEngine};

/// Anything that can carry a request to an engine and bring back its response.
pub trait Channel {
    fn send(&mut self, request: Request) -> Result<Response>;
}

impl<G: GeometryProvider> Channel for SearchEngine<G> {
    fn send(&mut self, request: Request) -> Result<Response> {
        Ok(route(self, request))
    }
}

pub struct SearchClient {
    pub flags: PatternFlags,
    max_matches: usize,
    history: SearchHistory,
    count: usize,
    current: Option<usize>,
    matches: Vec<MatchSummary>,
    last_error: Option<String>,
}

impl SearchClient {
    pub fn new(config: &RcConfig, history: SearchHistory) -> Self {
        Self {
            flags: config.flags,
            max_matches: config.max_matches,
            history,
            count: 0,
            current: None,
            matches: Vec::new(),
            last_error: None,
        }
    }

    /// Trim, validate and search. Successful patterns are remembered.
    pub fn submit(&mut self, channel: &mut dyn Channel, raw_pattern: &str) -> Result<usize> {
        let pattern = raw_pattern.trim();
        if pattern.is_empty() {
            return self.fail(Error::Pattern("Please enter a pattern".to_string()));
        }

        let request = Request::Search(SearchRequest {
            pattern: pattern.to_string(),
            flags: self.flags.to_string(),
            max_matches: self.max_matches,
        });
        match channel.send(request) {
            Ok(Response::Searched { count, matches, .. }) => {
                self.last_error = None;
                self.count = count;
                self.current = (count > 0).then_some(0);
                self.matches = matches;
                self.history.add(pattern);
                if let Err(e) = self.history.save() {
                    log::warn!("could not save history: {e}");
                }
                Ok(count)
            }
            Ok(Response::Failed { error, kind, .. }) => self.fail(failure_error(kind, error)),
            Ok(other) => self.fail(Error::Connection(format!("unexpected reply {other:?}"))),
            Err(e) => self.fail(e),
        }
    }

    pub fn navigate(&mut self, channel: &mut dyn Channel, direction: Direction) -> Result<Option<usize>> {
        self.send_navigation(channel, Request::Navigate(NavigateRequest { direction }))
    }

    pub fn jump(&mut self, channel: &mut dyn Channel, index: usize) -> Result<Option<usize>> {
        self.send_navigation(channel, Request::JumpTo(JumpRequest { index }))
    }

    fn send_navigation(&mut self, channel: &mut dyn Channel, request: Request) -> Result<Option<usize>> {
        match channel.send(request) {
            Ok(Response::Navigated { index, .. }) => {
                self.current = Some(index);
                Ok(Some(index))
            }
            Ok(_) => Ok(None),
            Err(e) => self.fail(e),
        }
    }

    pub fn clear(&mut self, channel: &mut dyn Channel) -> Result<()> {
        self.reset();
        match channel.send(Request::ClearHighlights) {
            Ok(_) => Ok(()),
            Err(e) => {
                // The document may already be gone; nothing left to clear
                log::debug!("clear highlights failed: {e}");
                Ok(())
            }
        }
    }

    fn fail<T>(&mut self, error: Error) -> Result<T> {
        self.reset();
        self.last_error = Some(error.to_string());
        Err(error)
    }

    fn reset(&mut self) {
        self.count = 0;
        self.current = None;
        self.matches.clear();
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn matches(&self) -> &[MatchSummary] {
        &self.matches
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Previous/next are only usable while there is something to visit.
    pub fn controls_enabled(&self) -> bool {
        self.count > 0
    }

    /// "i / n" with a 1-based position, or "- / -" with no selection.
    pub fn position_label(&self) -> String {
        match self.current {
            Some(i) if self.count > 0 => format!("{} / {}", i + 1, self.count),
            _ => "- / -".to_string(),
        }
    }

    pub fn set_max_matches(&mut self, value: usize) {
        self.max_matches = crate::config::rc::clamp(value, crate::config::rc::MAX_MATCHES_RANGE);
    }

    pub fn max_matches(&self) -> usize {
        self.max_matches
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut SearchHistory {
        &mut self.history
    }

    /// Numbered listing of the last results, one per line.
    pub fn results_text(&self) -> Option<String> {
        if self.matches.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .matches
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{}. {}", i + 1, m.text))
            .collect();
        Some(lines.join("\n"))
    }

    /// Put `results_text` on the system clipboard.
    pub fn copy_results(&self) -> std::result::Result<usize, String> {
        let Some(text) = self.results_text() else {
            return Err("No matches to copy".to_string());
        };
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| format!("Clipboard unavailable: {e}"))?;
        clipboard
            .set_text(text)
            .map_err(|e| format!("Copy failed: {e}"))?;
        Ok(self.matches.len())
    }
}

/// Turn a failure reply back into the error category it came from.
fn failure_error(kind: FailureKind, message: String) -> Error {
    match kind {
        FailureKind::Pattern => Error::Pattern(message),
        FailureKind::DocumentChanged(node) => Error::DocumentChanged(node),
        FailureKind::Rejected => Error::Connection(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::markup;
    use crate::search::position_map::fake::FakeGeometry;

    struct Disconnected;

    impl Channel for Disconnected {
        fn send(&mut self, _request: Request) -> Result<Response> {
            Err(Error::Connection("receiving end does not exist".to_string()))
        }
    }

    /// Answers every request with a fixed reply.
    struct Canned(Response);

    impl Channel for Canned {
        fn send(&mut self, _request: Request) -> Result<Response> {
            Ok(self.0.clone())
        }
    }

    fn setup(source: &str) -> (SearchClient, SearchEngine<FakeGeometry>) {
        let client = SearchClient::new(&RcConfig::default(), SearchHistory::new(20));
        let engine = SearchEngine::new(markup::parse(source), FakeGeometry::new(100.0, 10.0));
        (client, engine)
    }

    #[test]
    fn test_submit_updates_label_and_history() {
        let (mut client, mut engine) = setup("<p>foo foo foo</p>");
        assert_eq!(client.submit(&mut engine, "  foo ").unwrap(), 3);
        assert_eq!(client.position_label(), "1 / 3");
        assert!(client.controls_enabled());
        assert_eq!(client.history().entries(), ["foo"]);

        assert_eq!(client.navigate(&mut engine, Direction::Previous).unwrap(), Some(2));
        assert_eq!(client.position_label(), "3 / 3");
    }

    #[test]
    fn test_empty_pattern_rejected_before_sending() {
        let (mut client, _) = setup("<p>x</p>");
        let err = client.submit(&mut Disconnected, "   ").unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
        assert!(client.history().is_empty());
    }

    #[test]
    fn test_pattern_error_disables_controls() {
        let (mut client, mut engine) = setup("<p>foo</p>");
        client.submit(&mut engine, "foo").unwrap();
        let err = client.submit(&mut engine, "fo(o").unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
        assert!(!client.controls_enabled());
        assert_eq!(client.position_label(), "- / -");
        assert!(client.last_error().is_some());
        assert_eq!(client.history().entries(), ["foo"]);
    }

    #[test]
    fn test_connection_error_is_distinct() {
        let (mut client, _) = setup("<p>x</p>");
        let err = client.submit(&mut Disconnected, "x").unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(!client.controls_enabled());
        assert!(client.last_error().unwrap().contains("Cannot connect"));
        client.dismiss_error();
        assert!(client.last_error().is_none());
    }

    #[test]
    fn test_clear_never_fails() {
        let (mut client, mut engine) = setup("<p>a a</p>");
        client.submit(&mut engine, "a").unwrap();
        assert!(client.clear(&mut engine).is_ok());
        assert!(client.clear(&mut Disconnected).is_ok());
        assert_eq!(client.count(), 0);
    }

    #[test]
    fn test_results_text() {
        let (mut client, mut engine) = setup("<p>cat cot</p>");
        assert_eq!(client.results_text(), None);
        assert_eq!(client.copy_results(), Err("No matches to copy".to_string()));
        client.submit(&mut engine, "c.t").unwrap();
        assert_eq!(client.results_text().unwrap(), "1. cat\n2. cot");
    }

    #[test]
    fn test_jump_and_zero_results() {
        let (mut client, mut engine) = setup("<p>1 2 3</p>");
        client.submit(&mut engine, r"\d").unwrap();
        assert_eq!(client.jump(&mut engine, 2).unwrap(), Some(2));
        assert_eq!(client.submit(&mut engine, "z").unwrap(), 0);
        assert_eq!(client.navigate(&mut engine, Direction::Next).unwrap(), None);
        assert!(!client.controls_enabled());
    }

    #[test]
    fn test_failure_categories_stay_distinct() {
        let (mut client, _) = setup("<p>x</p>");
        let mut changed = Canned(Response::failed(&Error::DocumentChanged(9)));
        let err = client.submit(&mut changed, "x").unwrap_err();
        assert!(matches!(err, Error::DocumentChanged(9)));

        let mut rejected = Canned(Response::rejected("Malformed request: eof"));
        let err = client.submit(&mut rejected, "x").unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(!client.controls_enabled());
        assert!(client.history().is_empty());
    }
}
