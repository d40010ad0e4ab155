use crate::controller::shared_state::SharedViewerState;
use crate::search::Direction;

/// Search command handlers - controller logic for search operations
pub struct SearchCommands;

impl SearchCommands {
    /// Run a pattern from the input line or the history list
    pub fn submit(shared: &mut SharedViewerState, pattern: &str) {
        match shared.client.submit(&mut shared.engine, pattern) {
            Ok(0) => {
                shared.set_status(format!("Pattern not found: {}", pattern.trim()));
            }
            Ok(count) => {
                let limit = if count >= shared.client.max_matches() {
                    " (limit reached)"
                } else {
                    ""
                };
                let noun = if count == 1 { "match" } else { "matches" };
                shared.set_status(format!("/{}/  {count} {noun}{limit}", pattern.trim()));
                shared.sync_scroll();
            }
            Err(e) => shared.set_error(&e),
        }
    }

    /// Execute next search (n command)
    pub fn next(shared: &mut SharedViewerState) {
        Self::step(shared, Direction::Next);
    }

    /// Execute previous search (N command)
    pub fn previous(shared: &mut SharedViewerState) {
        Self::step(shared, Direction::Previous);
    }

    fn step(shared: &mut SharedViewerState, direction: Direction) {
        if !Self::ensure_matches(shared) {
            return;
        }
        match shared.client.navigate(&mut shared.engine, direction) {
            Ok(Some(_)) => Self::show_current(shared),
            Ok(None) => shared.set_status("No matches"),
            Err(e) => shared.set_error(&e),
        }
    }

    pub fn first(shared: &mut SharedViewerState) {
        Self::jump(shared, 1);
    }

    pub fn last(shared: &mut SharedViewerState) {
        let count = shared.client.count();
        Self::jump(shared, count);
    }

    /// Jump to a 1-based match number
    pub fn jump(shared: &mut SharedViewerState, number: usize) {
        if !Self::ensure_matches(shared) {
            return;
        }
        let count = shared.client.count();
        if number == 0 || number > count {
            shared.set_status(format!("No match {number} (1-{count})"));
            return;
        }
        match shared.client.jump(&mut shared.engine, number - 1) {
            Ok(Some(_)) => Self::show_current(shared),
            Ok(None) => shared.set_status(format!("No match {number}")),
            Err(e) => shared.set_error(&e),
        }
    }

    pub fn clear(shared: &mut SharedViewerState) {
        // Clearing never fails from the caller's point of view
        let _ = shared.client.clear(&mut shared.engine);
        shared.set_status("Highlights cleared");
    }

    pub fn copy(shared: &mut SharedViewerState) {
        match shared.client.copy_results() {
            Ok(n) => shared.set_status(format!("Copied {n} matches to clipboard")),
            Err(message) => {
                shared.status_message = message;
                shared.is_error = true;
            }
        }
    }

    /// Reload the document from its target; any highlights are discarded
    pub fn reload(shared: &mut SharedViewerState) {
        match shared.target.load() {
            Ok(tree) => {
                let _ = shared.client.clear(&mut shared.engine);
                shared.engine.replace_document(tree);
                shared.view.reset_scroll();
                shared.set_status(format!("Reloaded {}", shared.target.location()));
                log::info!("reloaded {}", shared.target.location());
            }
            Err(e) => shared.set_error(&e),
        }
    }

    /// Flip case sensitivity and re-run the active search with it
    pub fn toggle_ignore_case(shared: &mut SharedViewerState) {
        shared.client.flags.toggle('i');
        let state = if shared.client.flags.ignore_case { "on" } else { "off" };
        let pattern = shared.engine.session().pattern.clone();
        if pattern.is_empty() {
            shared.set_status(format!("Ignore case {state}"));
            return;
        }
        Self::submit(shared, &pattern);
        if !shared.is_error {
            let summary = std::mem::take(&mut shared.status_message);
            shared.set_status(format!("Ignore case {state}  {summary}"));
        }
    }

    fn ensure_matches(shared: &mut SharedViewerState) -> bool {
        if shared.client.controls_enabled() {
            return true;
        }
        let pattern = &shared.engine.session().pattern;
        let message = if pattern.is_empty() {
            "No previous search".to_string()
        } else {
            format!("Pattern not found: {pattern}")
        };
        shared.set_status(message);
        false
    }

    fn show_current(shared: &mut SharedViewerState) {
        let session = shared.engine.session();
        let message = match session.current_match() {
            Some(m) => format!("/{}/  {}", session.pattern, m.text),
            None => format!("/{}/", session.pattern),
        };
        shared.set_status(message);
        shared.sync_scroll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{SearchClient, SearchHistory, Target};
    use crate::config::RcConfig;
    use crate::document_model::markup;

    fn shared(source: &str) -> SharedViewerState {
        let client = SearchClient::new(&RcConfig::default(), SearchHistory::new(20));
        SharedViewerState::new(markup::parse(source), Target::new("test.html"), client)
    }

    #[test]
    fn test_submit_and_step() {
        let mut shared = shared("<p>foo bar foo</p>");
        SearchCommands::submit(&mut shared, "foo");
        assert_eq!(shared.status_message, "/foo/  2 matches");
        SearchCommands::next(&mut shared);
        assert_eq!(shared.client.position_label(), "2 / 2");
        SearchCommands::next(&mut shared);
        assert_eq!(shared.client.position_label(), "1 / 2");
        SearchCommands::previous(&mut shared);
        assert_eq!(shared.client.position_label(), "2 / 2");
    }

    #[test]
    fn test_navigation_without_search() {
        let mut shared = shared("<p>text</p>");
        SearchCommands::next(&mut shared);
        assert_eq!(shared.status_message, "No previous search");
        SearchCommands::submit(&mut shared, "zzz");
        assert_eq!(shared.status_message, "Pattern not found: zzz");
        assert!(!shared.is_error);
    }

    #[test]
    fn test_first_last_and_jump_bounds() {
        let mut shared = shared("<p>a1 a2 a3 a4</p>");
        SearchCommands::submit(&mut shared, r"a\d");
        SearchCommands::last(&mut shared);
        assert_eq!(shared.client.position_label(), "4 / 4");
        SearchCommands::first(&mut shared);
        assert_eq!(shared.client.position_label(), "1 / 4");
        SearchCommands::jump(&mut shared, 9);
        assert_eq!(shared.status_message, "No match 9 (1-4)");
        assert_eq!(shared.client.position_label(), "1 / 4");
    }

    #[test]
    fn test_invalid_pattern_reports_error() {
        let mut shared = shared("<p>x</p>");
        SearchCommands::submit(&mut shared, "(x");
        assert!(shared.is_error);
        assert!(shared.status_message.contains("Invalid regular expression"));
        shared.dismiss_message();
        assert!(!shared.is_error);
        assert!(shared.client.last_error().is_none());
    }

    #[test]
    fn test_toggle_ignore_case_reruns_search() {
        let mut shared = shared("<p>Foo foo FOO</p>");
        SearchCommands::submit(&mut shared, "foo");
        assert_eq!(shared.client.count(), 1);
        SearchCommands::toggle_ignore_case(&mut shared);
        assert_eq!(shared.client.count(), 3);
        assert!(shared.status_message.starts_with("Ignore case on"));
    }

    #[test]
    fn test_clear_resets_label() {
        let mut shared = shared("<p>foo</p>");
        SearchCommands::submit(&mut shared, "foo");
        SearchCommands::clear(&mut shared);
        assert_eq!(shared.client.position_label(), "- / -");
        assert!(shared.engine.tree().markers().is_empty());
    }

    #[test]
    fn test_reload_missing_target_is_connection_error() {
        let mut shared = shared("<p>foo</p>");
        SearchCommands::reload(&mut shared);
        assert!(shared.is_error);
        assert!(shared.status_message.contains("Cannot connect"));
    }

    #[test]
    fn test_reload_replaces_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<p>fresh fresh</p>").unwrap();

        let client = SearchClient::new(&RcConfig::default(), SearchHistory::new(20));
        let mut shared = SharedViewerState::new(
            markup::parse("<p>stale</p>"),
            Target::new(path.display().to_string()),
            client,
        );
        SearchCommands::submit(&mut shared, "stale");
        SearchCommands::reload(&mut shared);
        assert!(!shared.is_error);
        assert_eq!(shared.client.count(), 0);
        assert_eq!(shared.engine.tree().text_content(shared.engine.tree().root()), "fresh fresh");
        SearchCommands::submit(&mut shared, "fresh");
        assert_eq!(shared.client.count(), 2);
    }
}
