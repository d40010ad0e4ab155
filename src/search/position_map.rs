//! Overview-strip position map and the geometry capability it reads from.

use crate::document_model::{DocumentTree, MarkerPlacement, NodeId, PositionEntry};

/// Smallest height an entry may have, in percent of the content height.
pub const MIN_VISIBLE_HEIGHT_PERCENT: f64 = 2.0;

/// Vertical extent of a rendered marker, in the provider's own units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

/// Rendered geometry of the tree, supplied by the host.
pub trait GeometryProvider {
    /// Recompute geometry after the tree changed shape.
    fn refresh(&mut self, _tree: &DocumentTree) {}

    /// Absolute rect of a marker, or `None` if it is not rendered.
    fn marker_rect(&self, marker: NodeId) -> Option<Rect>;

    /// Total content height in the same units as `marker_rect`.
    fn content_height(&self) -> f64;
}

pub fn build_position_map(
    placements: &[MarkerPlacement],
    geometry: &dyn GeometryProvider,
) -> Vec<PositionEntry> {
    let total = geometry.content_height();
    if total <= 0.0 {
        return Vec::new();
    }

    placements
        .iter()
        .filter_map(|placement| {
            let rect = geometry.marker_rect(placement.marker)?;
            Some(PositionEntry {
                sequence_index: placement.sequence_index,
                top_percent: rect.top / total * 100.0,
                height_percent: (rect.height / total * 100.0).max(MIN_VISIBLE_HEIGHT_PERCENT),
                current: false,
            })
        })
        .collect()
}

/// Flag the entry for `sequence_index` as current and clear every other one.
pub fn mark_current(map: &mut [PositionEntry], sequence_index: Option<usize>) {
    for entry in map.iter_mut() {
        entry.current = Some(entry.sequence_index) == sequence_index;
    }
}
