//! The search engine: one document tree, one session, one geometry provider.

use super::highlighter::highlight;
use super::locator::locate_compiled;
use super::navigator::{self, Direction, NavigationOutcome};
use super::pattern::CompiledPattern;
use super::position_map::{GeometryProvider, build_position_map, mark_current};
use super::restorer::restore;
use crate::document_model::{DocumentTree, NavigationState, ScrollRequest, SearchSession};
use crate::error::Result;

/// Default cap on matches per search.
pub const DEFAULT_MAX_MATCHES: usize = 1000;

pub struct SearchEngine<G: GeometryProvider> {
    tree: DocumentTree,
    session: SearchSession,
    geometry: G,
}

impl<G: GeometryProvider> SearchEngine<G> {
    pub fn new(tree: DocumentTree, mut geometry: G) -> Self {
        geometry.refresh(&tree);
        Self {
            tree,
            session: SearchSession::new(),
            geometry,
        }
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }

    /// Run a new search, replacing whatever the previous one left behind.
    ///
    /// A pattern that fails to compile returns the error with the previous
    /// highlights still in place.
    pub fn search(&mut self, pattern: &str, flags: &str, max_matches: usize) -> Result<usize> {
        let compiled = CompiledPattern::new(pattern, flags)?;
        self.clear_highlights();

        let root = self.tree.root();
        let matches = locate_compiled(&self.tree, root, &compiled, max_matches);
        let highlighted = match highlight(&mut self.tree, &matches) {
            Ok(highlighted) => highlighted,
            Err(e) => {
                self.clear_highlights();
                return Err(e);
            }
        };

        self.geometry.refresh(&self.tree);
        let position_map = build_position_map(&highlighted.placements, &self.geometry);
        let count = matches.len();

        self.session = SearchSession {
            pattern: pattern.to_string(),
            flags: compiled.flags().to_string(),
            matches,
            markers: highlighted.placements,
            splits: highlighted.splits,
            position_map,
            navigation: NavigationState::start(count),
            ..SearchSession::default()
        };
        if count > 0 {
            navigator::activate(&mut self.tree, &mut self.session, 0);
        }

        log::debug!("search /{pattern}/{flags} found {count} matches");
        Ok(count)
    }

    pub fn navigate(&mut self, direction: Direction) -> NavigationOutcome {
        navigator::navigate(&mut self.tree, &mut self.session, direction)
    }

    pub fn jump_to(&mut self, index: usize) -> NavigationOutcome {
        navigator::jump_to(&mut self.tree, &mut self.session, index)
    }

    /// Remove all markers and reset the session. Always succeeds.
    pub fn clear_highlights(&mut self) {
        let removed = restore(&mut self.tree, &mut self.session);
        if removed > 0 {
            self.geometry.refresh(&self.tree);
            log::debug!("cleared {removed} highlights");
        }
    }

    /// Swap in a freshly loaded document (navigation or reload of the host).
    pub fn replace_document(&mut self, tree: DocumentTree) {
        self.clear_highlights();
        self.tree = tree;
        self.session = SearchSession::new();
        self.geometry.refresh(&self.tree);
    }

    /// Re-measure after the host's viewport changed and rebuild the map.
    pub fn refresh_geometry(&mut self) {
        self.geometry.refresh(&self.tree);
        self.session.position_map = build_position_map(&self.session.markers, &self.geometry);
        let current = self.session.current_index();
        mark_current(&mut self.session.position_map, current);
    }

    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.session.take_scroll_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::markup;
    use crate::error::Error;
    use crate::search::position_map::fake::FakeGeometry;

    fn engine(source: &str) -> SearchEngine<FakeGeometry> {
        SearchEngine::new(markup::parse(source), FakeGeometry::new(1000.0, 10.0))
    }

    #[test]
    fn test_search_then_next() {
        let mut engine = engine("<p>foo foo foo</p>");
        assert_eq!(engine.search("foo", "g", 1000).unwrap(), 3);
        assert_eq!(engine.session().current_index(), Some(0));
        assert_eq!(engine.navigate(Direction::Next).index(), Some(1));
    }

    #[test]
    fn test_search_activates_first_marker_and_map() {
        let mut engine = engine("<p>a</p><p>a</p>");
        engine.search("a", "g", 10).unwrap();
        let session = engine.session();
        assert_eq!(session.position_map.len(), 2);
        assert!(session.position_map[0].current);
        assert!(!session.position_map[1].current);
        assert!(engine.tree().is_current_marker(session.markers[0].marker));
        assert_eq!(engine.take_scroll_request().map(|s| s.sequence_index), Some(0));
    }

    #[test]
    fn test_bad_pattern_keeps_previous_highlights() {
        let mut engine = engine("<p>keep keep</p>");
        engine.search("keep", "g", 10).unwrap();
        let before = markup::serialize(engine.tree());

        let err = engine.search("(", "g", 10).unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
        assert_eq!(markup::serialize(engine.tree()), before);
        assert_eq!(engine.session().count(), 2);
    }

    #[test]
    fn test_new_search_leaves_no_stale_markers() {
        let mut engine = engine("<p>alpha beta alpha</p>");
        engine.search("alpha", "g", 10).unwrap();
        engine.search("beta", "g", 10).unwrap();
        assert_eq!(engine.tree().markers().len(), 1);
        assert_eq!(engine.session().matches[0].text, "beta");
    }

    #[test]
    fn test_zero_matches_is_idle() {
        let mut engine = engine("<p>abc</p>");
        assert_eq!(engine.search("zzz", "g", 10).unwrap(), 0);
        assert_eq!(engine.session().navigation, NavigationState::Idle);
        assert_eq!(engine.navigate(Direction::Next), NavigationOutcome::NoMatches);
    }

    #[test]
    fn test_clear_twice() {
        let mut engine = engine("<p>x y x</p>");
        let original = markup::serialize(engine.tree());
        engine.search("x", "g", 10).unwrap();
        engine.clear_highlights();
        assert_eq!(markup::serialize(engine.tree()), original);
        engine.clear_highlights();
        assert_eq!(markup::serialize(engine.tree()), original);
        assert_eq!(engine.session().count(), 0);
    }

    #[test]
    fn test_replace_document_clears_session() {
        let mut engine = engine("<p>old old</p>");
        engine.search("old", "g", 10).unwrap();
        engine.replace_document(markup::parse("<p>new</p>"));
        assert_eq!(engine.session().count(), 0);
        assert!(engine.tree().markers().is_empty());
        assert_eq!(engine.tree().text_content(engine.tree().root()), "new");
    }

    #[test]
    fn test_max_matches_respected() {
        let mut engine = engine("<p>x x x x x</p>");
        assert_eq!(engine.search("x", "g", 2).unwrap(), 2);
        let indices: Vec<usize> = engine
            .session()
            .matches
            .iter()
            .map(|m| m.sequence_index)
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_refresh_geometry_keeps_current_entry() {
        let mut engine = engine("<p>a</p><p>a</p><p>a</p>");
        engine.search("a", "g", 10).unwrap();
        engine.navigate(Direction::Last);
        assert!((engine.session().position_map[1].top_percent - 1.0).abs() < 1e-9);

        engine.geometry_mut().height = 2000.0;
        engine.refresh_geometry();
        let map = &engine.session().position_map;
        assert_eq!(map.len(), 3);
        assert!((map[1].top_percent - 0.5).abs() < 1e-9);
        let current: Vec<bool> = map.iter().map(|e| e.current).collect();
        assert_eq!(current, vec![false, false, true]);
    }
}
