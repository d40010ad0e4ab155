use super::tree::NodeId;

/// One located occurrence of the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub text: String,
    /// Byte offset of the match inside its leaf
    pub start_offset: usize,
    /// Byte length of the matched text
    pub length: usize,
    pub node: NodeId,
    /// Document-order rank across the whole match set
    pub sequence_index: usize,
}

impl Match {
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.length
    }
}

/// Where the highlighter put the marker for a given sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerPlacement {
    pub sequence_index: usize,
    pub marker: NodeId,
}

/// A text leaf the highlighter cut up, and the pieces now standing in its
/// place, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSplit {
    pub leaf: NodeId,
    pub fragments: Vec<NodeId>,
}

/// Overview strip entry, in percent of total content height.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionEntry {
    pub sequence_index: usize,
    pub top_percent: f64,
    pub height_percent: f64,
    pub current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Center,
}

/// A request for the host to bring a marker into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub sequence_index: usize,
    pub marker: NodeId,
    pub block: ScrollBlock,
}

/// Navigation state machine over the current match index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationState {
    #[default]
    Idle,
    Active { current: usize, total: usize },
}

impl NavigationState {
    pub fn start(total: usize) -> Self {
        if total == 0 {
            NavigationState::Idle
        } else {
            NavigationState::Active { current: 0, total }
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match *self {
            NavigationState::Idle => None,
            NavigationState::Active { current, .. } => Some(current),
        }
    }

    pub fn total(&self) -> usize {
        match *self {
            NavigationState::Idle => 0,
            NavigationState::Active { total, .. } => total,
        }
    }

    pub fn first(&mut self) -> Option<usize> {
        self.set(0)
    }

    pub fn last(&mut self) -> Option<usize> {
        let total = self.total();
        self.set(total.checked_sub(1)?)
    }

    pub fn next(&mut self) -> Option<usize> {
        let NavigationState::Active { current, total } = *self else {
            return None;
        };
        self.set((current + 1) % total)
    }

    pub fn previous(&mut self) -> Option<usize> {
        let NavigationState::Active { current, total } = *self else {
            return None;
        };
        self.set((current + total - 1) % total)
    }

    /// Jump to an explicit index. Out-of-range indices leave the state alone.
    pub fn set(&mut self, index: usize) -> Option<usize> {
        match self {
            NavigationState::Active { current, total } if index < *total => {
                *current = index;
                Some(index)
            }
            _ => None,
        }
    }
}

/// Everything belonging to one search; replaced wholesale by the next one.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    pub pattern: String,
    pub flags: String,
    pub matches: Vec<Match>,
    pub markers: Vec<MarkerPlacement>,
    pub splits: Vec<LeafSplit>,
    pub position_map: Vec<PositionEntry>,
    pub navigation: NavigationState,
    pub pending_scroll: Option<ScrollRequest>,
    pub(crate) active_marker: Option<NodeId>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.navigation.current_index()
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.current_index().and_then(|i| self.matches.get(i))
    }

    pub fn marker_for(&self, sequence_index: usize) -> Option<NodeId> {
        self.markers
            .get(sequence_index)
            .filter(|p| p.sequence_index == sequence_index)
            .or_else(|| {
                self.markers
                    .iter()
                    .find(|p| p.sequence_index == sequence_index)
            })
            .map(|p| p.marker)
    }

    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }
}
