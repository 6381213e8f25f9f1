//! Segment and synapse handles.
//!
//! Handles are small `Copy` values that name an entity owned by a
//! [`Connections`](crate::algorithms::Connections). They carry no data of
//! their own beyond identity; all mutable state lives in the graph.
//!
//! A handle is only meaningful while its entity is alive. Slots are reused
//! after destruction, so each handle also records the ordinal it was created
//! with; the graph compares it against the slot occupant and panics on a
//! mismatch instead of silently touching a different entity.

use super::primitives::{CellIdx, FlatIdx, Ordinal};

/// A dendritic segment on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    cell: CellIdx,
    flat_idx: FlatIdx,
    ordinal: Ordinal,
}

impl Segment {
    pub(crate) const fn new(cell: CellIdx, flat_idx: FlatIdx, ordinal: Ordinal) -> Self {
        Self {
            cell,
            flat_idx,
            ordinal,
        }
    }

    /// The cell this segment is on.
    #[inline]
    pub const fn cell(&self) -> CellIdx {
        self.cell
    }

    /// The segment's index in the flat segment list.
    ///
    /// Stable while the segment lives; may be reassigned once it is destroyed.
    #[inline]
    pub const fn flat_idx(&self) -> FlatIdx {
        self.flat_idx
    }

    /// Creation order of this segment among all segments of its graph.
    #[inline]
    pub const fn ordinal(&self) -> Ordinal {
        self.ordinal
    }
}

/// A connection from a presynaptic cell onto a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Synapse {
    // Slot in the synapse arena. Synapses expose no public flat index.
    idx: usize,
    ordinal: Ordinal,
}

impl Synapse {
    pub(crate) const fn new(idx: usize, ordinal: Ordinal) -> Self {
        Self { idx, ordinal }
    }

    #[inline]
    pub(crate) const fn slot(&self) -> usize {
        self.idx
    }

    /// Creation order of this synapse among all synapses of its graph.
    #[inline]
    pub const fn ordinal(&self) -> Ordinal {
        self.ordinal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_accessors() {
        let segment = Segment::new(7, 3, 42);
        assert_eq!(segment.cell(), 7);
        assert_eq!(segment.flat_idx(), 3);
        assert_eq!(segment.ordinal(), 42);
    }

    #[test]
    fn test_reused_slot_is_a_different_handle() {
        let before = Segment::new(7, 3, 42);
        let after = Segment::new(7, 3, 43);
        assert_ne!(before, after);

        assert_ne!(Synapse::new(0, 1), Synapse::new(0, 2));
    }
}
