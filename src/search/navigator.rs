//! Navigator: move the "current" marker among the session's matches.

use super::position_map::mark_current;
use crate::document_model::{DocumentTree, ScrollBlock, ScrollRequest, SearchSession};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    First,
    Last,
    Next,
    Previous,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Direction::First),
            "last" => Ok(Direction::Last),
            "next" => Ok(Direction::Next),
            "previous" | "prev" => Ok(Direction::Previous),
            other => Err(format!("Unknown direction: {other}")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::First => "first",
            Direction::Last => "last",
            Direction::Next => "next",
            Direction::Previous => "previous",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Moved { index: usize, text: String },
    NoMatches,
    OutOfRange { index: usize, total: usize },
}

impl NavigationOutcome {
    pub fn index(&self) -> Option<usize> {
        match self {
            NavigationOutcome::Moved { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub fn navigate(
    tree: &mut DocumentTree,
    session: &mut SearchSession,
    direction: Direction,
) -> NavigationOutcome {
    if session.navigation.total() == 0 {
        return NavigationOutcome::NoMatches;
    }
    transition(tree, session, |nav| match direction {
        Direction::First => nav.first(),
        Direction::Last => nav.last(),
        Direction::Next => nav.next(),
        Direction::Previous => nav.previous(),
    })
}

/// Jump straight to `index`, e.g. from a click on the overview strip.
pub fn jump_to(tree: &mut DocumentTree, session: &mut SearchSession, index: usize) -> NavigationOutcome {
    let total = session.navigation.total();
    if total == 0 {
        return NavigationOutcome::NoMatches;
    }
    if index >= total {
        return NavigationOutcome::OutOfRange { index, total };
    }
    transition(tree, session, |nav| nav.set(index))
}

/// Shared transition: clear the old current marker, move, flag the new one,
/// sync the overview map and queue a centred scroll.
fn transition(
    tree: &mut DocumentTree,
    session: &mut SearchSession,
    step: impl FnOnce(&mut crate::document_model::NavigationState) -> Option<usize>,
) -> NavigationOutcome {
    if let Some(previous) = session.active_marker.take() {
        tree.set_marker_current(previous, false);
    }

    let Some(index) = step(&mut session.navigation) else {
        return NavigationOutcome::NoMatches;
    };
    activate(tree, session, index)
}

pub(crate) fn activate(
    tree: &mut DocumentTree,
    session: &mut SearchSession,
    index: usize,
) -> NavigationOutcome {
    match session.marker_for(index) {
        Some(marker) if tree.set_marker_current(marker, true) => {
            session.active_marker = Some(marker);
            session.pending_scroll = Some(ScrollRequest {
                sequence_index: index,
                marker,
                block: ScrollBlock::Center,
            });
        }
        _ => log::warn!("marker for match {index} is missing; nothing to activate"),
    }
    mark_current(&mut session.position_map, Some(index));

    let text = session
        .matches
        .get(index)
        .map(|m| m.text.clone())
        .unwrap_or_default();
    NavigationOutcome::Moved { index, text }
}
