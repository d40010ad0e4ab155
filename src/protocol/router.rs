use super::message::{MatchSummary, Request, Response};
use crate::search::{GeometryProvider, NavigationOutcome, SearchEngine};

/// Single dispatch point: one handler per request variant.
pub fn route<G: GeometryProvider>(engine: &mut SearchEngine<G>, request: Request) -> Response {
    match request {
        Request::Search(search) => {
            match engine.search(&search.pattern, &search.flags, search.max_matches) {
                Ok(_) => Response::searched(summaries(engine)),
                Err(e) => {
                    log::debug!("search failed: {e}");
                    Response::failed(&e)
                }
            }
        }
        Request::Navigate(nav) => navigation_response(engine.navigate(nav.direction)),
        Request::JumpTo(jump) => navigation_response(engine.jump_to(jump.index)),
        Request::ClearHighlights => {
            engine.clear_highlights();
            Response::cleared()
        }
    }
}

fn summaries<G: GeometryProvider>(engine: &SearchEngine<G>) -> Vec<MatchSummary> {
    engine
        .session()
        .matches
        .iter()
        .map(|m| MatchSummary {
            text: m.text.clone(),
            index: m.start_offset,
            length: m.length,
        })
        .collect()
}

fn navigation_response(outcome: NavigationOutcome) -> Response {
    match outcome {
        NavigationOutcome::Moved { index, text } => Response::navigated(index, text),
        NavigationOutcome::NoMatches | NavigationOutcome::OutOfRange { .. } => {
            Response::no_selection()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::markup;
    use crate::protocol::message::{JumpRequest, NavigateRequest, SearchRequest};
    use crate::search::Direction;
    use crate::search::position_map::fake::FakeGeometry;

    fn engine(source: &str) -> SearchEngine<FakeGeometry> {
        SearchEngine::new(markup::parse(source), FakeGeometry::new(500.0, 10.0))
    }

    fn search(pattern: &str, flags: &str, max_matches: usize) -> Request {
        Request::Search(SearchRequest {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
            max_matches,
        })
    }

    fn navigate(direction: Direction) -> Request {
        Request::Navigate(NavigateRequest { direction })
    }

    #[test]
    fn test_search_response_lists_matches() {
        let mut engine = engine("<p>foo foo foo</p>");
        let response = route(&mut engine, search("foo", "g", 1000));
        let Response::Searched { count, matches, .. } = response else {
            panic!("expected search results");
        };
        assert_eq!(count, 3);
        let offsets: Vec<usize> = matches.iter().map(|m| m.index).collect();
        assert_eq!(offsets, vec![0, 4, 8]);
        assert!(matches.iter().all(|m| m.length == 3 && m.text == "foo"));
    }

    #[test]
    fn test_next_from_fresh_search() {
        let mut engine = engine("<p>foo foo foo</p>");
        route(&mut engine, search("foo", "g", 1000));
        assert_eq!(
            route(&mut engine, navigate(Direction::Next)),
            Response::navigated(1, "foo".to_string())
        );
    }

    #[test]
    fn test_pattern_error_response() {
        let mut engine = engine("<p>foo</p>");
        match route(&mut engine, search("(foo", "g", 10)) {
            Response::Failed { success, error, .. } => {
                assert!(!success);
                assert!(error.contains("(foo"));
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert!(engine.tree().markers().is_empty());
    }

    #[test]
    fn test_navigation_without_matches() {
        let mut engine = engine("<p>foo</p>");
        assert_eq!(route(&mut engine, navigate(Direction::First)), Response::no_selection());
        assert_eq!(
            route(&mut engine, Request::JumpTo(JumpRequest { index: 0 })),
            Response::no_selection()
        );
    }

    #[test]
    fn test_clear_twice_succeeds() {
        let mut engine = engine("<p>foo</p>");
        route(&mut engine, search("foo", "g", 10));
        assert_eq!(route(&mut engine, Request::ClearHighlights), Response::cleared());
        let after_first = markup::serialize(engine.tree());
        assert_eq!(route(&mut engine, Request::ClearHighlights), Response::cleared());
        assert_eq!(markup::serialize(engine.tree()), after_first);
    }

    #[test]
    fn test_jump_from_overview() {
        let mut engine = engine("<p>a b a b a</p>");
        route(&mut engine, search("a", "g", 10));
        assert_eq!(
            route(&mut engine, Request::JumpTo(JumpRequest { index: 2 })),
            Response::navigated(2, "a".to_string())
        );
        assert_eq!(engine.session().current_index(), Some(2));
    }
}
