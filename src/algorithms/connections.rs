//! Connections - The synaptic connectivity graph for HTM.
//!
//! The Connections structure represents the connections of a collection of
//! cells. Every cell owns an ordered list of dendritic segments, and every
//! segment owns an unordered collection of synapses. Synapses are indexed a
//! second time by their presynaptic cell, so the segments excited by a set of
//! active cells can be found without scanning the whole graph.
//!
//! Segments live in a flat arena indexed by [`FlatIdx`]. Destroyed slots go to
//! a free list and are handed out again most-recently-freed first, which keeps
//! the index space dense for callers that maintain per-segment arrays.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{ConnectionsError, Result};
use crate::types::{
    CellIdx, FlatIdx, Ordinal, Permanence, Segment, Synapse, SynapseCount, EPSILON,
};

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use tracing::{trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Data associated with a synapse.
#[derive(Debug, Clone, PartialEq)]
pub struct SynapseData {
    /// The presynaptic cell this synapse connects from.
    pub presynaptic_cell: CellIdx,

    /// The permanence strength of this synapse.
    pub permanence: Permanence,

    /// The segment this synapse belongs to.
    pub segment: Segment,

    /// Creation order among all synapses.
    pub ordinal: Ordinal,

    /// Position in the owning segment's synapse list.
    segment_index: usize,

    /// Position in the presynaptic bucket (for O(1) removal).
    presynaptic_map_index: usize,
}

/// Data associated with a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentData {
    /// The synapses on this segment, in no particular order.
    pub synapses: SmallVec<[Synapse; 32]>,

    /// The cell this segment belongs to.
    pub cell: CellIdx,

    /// Creation order among all segments.
    pub ordinal: Ordinal,
}

impl SegmentData {
    fn new(cell: CellIdx, ordinal: Ordinal) -> Self {
        Self {
            synapses: SmallVec::new(),
            cell,
            ordinal,
        }
    }
}

/// Data associated with a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    /// The segments on this cell, in creation order.
    pub segments: SmallVec<[Segment; 8]>,
}

/// Parameters for creating a Connections instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionsParams {
    /// Number of cells in the connections graph.
    pub num_cells: CellIdx,
}

/// The Connections structure manages the synaptic connections between cells.
///
/// It is a pure mechanism: it never limits segments per cell or synapses per
/// segment and never clamps permanences. Those policies belong to the learning
/// algorithm that drives it.
///
/// Handles returned by this type must be discarded once the entity they name
/// is destroyed. Passing a destroyed handle to any method panics.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(
        into = "crate::algorithms::ConnectionsProto",
        try_from = "crate::algorithms::ConnectionsProto"
    )
)]
pub struct Connections {
    /// All cells in the connections graph.
    cells: Vec<CellData>,

    /// All segments (indexed by flat index). `None` marks a freed slot.
    segments: Vec<Option<SegmentData>>,

    /// Freed flat indices, reused last-in first-out.
    free_flat_idxs: Vec<FlatIdx>,

    /// All synapses (indexed by arena slot). `None` marks a freed slot.
    synapses: Vec<Option<SynapseData>>,

    /// Freed synapse slots.
    free_synapse_slots: Vec<usize>,

    /// Maps presynaptic cell -> synapses from that cell. Never holds empty buckets.
    synapses_for_presynaptic_cell: AHashMap<CellIdx, Vec<Synapse>>,

    next_segment_ordinal: Ordinal,

    next_synapse_ordinal: Ordinal,

    /// Running total of live synapses.
    num_synapses: usize,
}

impl Connections {
    /// Creates a new Connections instance with the given parameters.
    pub fn new(params: ConnectionsParams) -> Self {
        let num_cells = params.num_cells as usize;

        Self {
            cells: vec![CellData::default(); num_cells],
            segments: Vec::new(),
            free_flat_idxs: Vec::new(),
            synapses: Vec::new(),
            free_synapse_slots: Vec::new(),
            synapses_for_presynaptic_cell: AHashMap::new(),
            next_segment_ordinal: 0,
            next_synapse_ordinal: 0,
            num_synapses: 0,
        }
    }

    /// Creates a Connections instance with `num_cells` cells.
    pub fn with_cells(num_cells: CellIdx) -> Self {
        Self::new(ConnectionsParams { num_cells })
    }

    /// Returns the number of cells.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns the number of live segments.
    pub fn num_segments(&self) -> usize {
        self.segments.len() - self.free_flat_idxs.len()
    }

    /// Returns the number of segments on a specific cell.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of range.
    pub fn num_segments_on_cell(&self, cell: CellIdx) -> usize {
        self.cells[cell as usize].segments.len()
    }

    /// Returns the number of live synapses.
    #[inline]
    pub fn num_synapses(&self) -> usize {
        self.num_synapses
    }

    /// Returns the number of synapses on a specific segment.
    pub fn num_synapses_on_segment(&self, segment: Segment) -> usize {
        self.segment_data(segment).synapses.len()
    }

    /// Returns the length a flat-index parallel array must have to hold a
    /// value for every live segment.
    #[inline]
    pub fn segment_flat_list_length(&self) -> usize {
        self.segments.len()
    }

    // ========================================================================
    // Segment operations
    // ========================================================================

    /// Creates a new segment on the specified cell.
    ///
    /// The segment reuses the most recently freed flat index if there is one,
    /// otherwise the flat list grows by one.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionsError::IndexOutOfBounds`] if `cell` is out of range.
    pub fn create_segment(&mut self, cell: CellIdx) -> Result<Segment> {
        self.check_cell(cell)?;

        let flat_idx = match self.free_flat_idxs.pop() {
            Some(reuse) => reuse,
            None => {
                let fresh = FlatIdx::try_from(self.segments.len())
                    .map_err(|_| ConnectionsError::InternalError("flat index space exhausted".into()))?;
                self.segments.push(None);
                fresh
            }
        };

        let ordinal = self.next_segment_ordinal;
        self.next_segment_ordinal += 1;

        let segment = Segment::new(cell, flat_idx, ordinal);
        self.segments[flat_idx as usize] = Some(SegmentData::new(cell, ordinal));
        self.cells[cell as usize].segments.push(segment);

        Ok(segment)
    }

    /// Destroys a segment and all its synapses.
    ///
    /// The remaining segments on the cell keep their relative order.
    pub fn destroy_segment(&mut self, segment: Segment) {
        let synapses = self.segment_data(segment).synapses.clone();
        for synapse in synapses {
            self.destroy_synapse(synapse);
        }

        let cell_segments = &mut self.cells[segment.cell() as usize].segments;
        let pos = cell_segments
            .iter()
            .position(|&s| s == segment)
            .unwrap_or_else(|| panic!("segment {segment:?} missing from cell {}", segment.cell()));
        cell_segments.remove(pos);

        self.segments[segment.flat_idx() as usize] = None;
        self.free_flat_idxs.push(segment.flat_idx());

        trace!(
            target: "htm_connections",
            cell = segment.cell(),
            flat_idx = segment.flat_idx(),
            "destroyed segment"
        );
    }

    /// Gets the segments for a cell, in creation order.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of range.
    #[inline]
    pub fn segments_for_cell(&self, cell: CellIdx) -> &[Segment] {
        &self.cells[cell as usize].segments
    }

    /// Gets the cell that owns a segment.
    #[inline]
    pub fn cell_for_segment(&self, segment: Segment) -> CellIdx {
        self.segment_data(segment).cell
    }

    /// Gets the segment data.
    ///
    /// Identity accessor for diagnostic tools; the handle itself already
    /// carries the cell and ordinal.
    #[inline]
    pub fn data_for_segment(&self, segment: Segment) -> &SegmentData {
        self.segment_data(segment)
    }

    /// Gets the segment at a specific index on a cell.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionsError::IndexOutOfBounds`] if `cell` or `idx` is
    /// out of range.
    pub fn get_segment(&self, cell: CellIdx, idx: usize) -> Result<Segment> {
        self.check_cell(cell)?;
        let segments = &self.cells[cell as usize].segments;
        segments
            .get(idx)
            .copied()
            .ok_or(ConnectionsError::IndexOutOfBounds {
                index: idx,
                size: segments.len(),
            })
    }

    /// Gets the segment currently occupying a flat index.
    ///
    /// Returns `None` for freed or never-allocated slots. A slot can be
    /// reassigned after its segment is destroyed, so callers must not hold on
    /// to flat indices across destruction.
    pub fn segment_for_flat_idx(&self, flat_idx: FlatIdx) -> Option<Segment> {
        match self.segments.get(flat_idx as usize) {
            Some(Some(data)) => Some(Segment::new(data.cell, flat_idx, data.ordinal)),
            _ => None,
        }
    }

    /// Gets the index of a segment on its cell.
    pub fn idx_on_cell_for_segment(&self, segment: Segment) -> usize {
        let cell = self.segment_data(segment).cell;
        self.cells[cell as usize]
            .segments
            .iter()
            .position(|&s| s == segment)
            .unwrap_or_else(|| panic!("segment {segment:?} missing from cell {cell}"))
    }

    /// Iterates over all live segments, by cell then creation order.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.cells.iter().flat_map(|cell| cell.segments.iter().copied())
    }

    /// Returns a key that sorts segments by cell, then by creation order.
    ///
    /// The key is `cell + ordinal / next_segment_ordinal`, so it stays below
    /// `cell + 1` for every segment created so far.
    #[allow(clippy::cast_precision_loss)]
    pub fn segment_position_sort_key(&self, segment: Segment) -> f64 {
        let data = self.segment_data(segment);
        f64::from(data.cell) + data.ordinal as f64 / self.next_segment_ordinal as f64
    }

    /// Compares two segments by cell, then by creation order.
    pub fn compare_segments(&self, a: Segment, b: Segment) -> Ordering {
        let data_a = self.segment_data(a);
        let data_b = self.segment_data(b);

        data_a
            .cell
            .cmp(&data_b.cell)
            .then_with(|| data_a.ordinal.cmp(&data_b.ordinal))
    }

    // ========================================================================
    // Synapse operations
    // ========================================================================

    /// Creates a new synapse on a segment.
    ///
    /// No duplicate check is made and the permanence is stored as given.
    ///
    /// # Arguments
    ///
    /// * `segment` - The segment to create the synapse on
    /// * `presynaptic_cell` - The presynaptic cell to connect from
    /// * `permanence` - The initial permanence value
    pub fn create_synapse(
        &mut self,
        segment: Segment,
        presynaptic_cell: CellIdx,
        permanence: Permanence,
    ) -> Synapse {
        let segment_index = self.segment_data(segment).synapses.len();

        let slot = match self.free_synapse_slots.pop() {
            Some(reuse) => reuse,
            None => {
                self.synapses.push(None);
                self.synapses.len() - 1
            }
        };

        let ordinal = self.next_synapse_ordinal;
        self.next_synapse_ordinal += 1;
        let synapse = Synapse::new(slot, ordinal);

        let bucket = self
            .synapses_for_presynaptic_cell
            .entry(presynaptic_cell)
            .or_default();
        let presynaptic_map_index = bucket.len();
        bucket.push(synapse);

        self.segment_data_mut(segment).synapses.push(synapse);

        self.synapses[slot as usize] = Some(SynapseData {
            presynaptic_cell,
            permanence,
            segment,
            ordinal,
            segment_index,
            presynaptic_map_index,
        });
        self.num_synapses += 1;

        synapse
    }

    /// Destroys a synapse.
    ///
    /// Removes it from its segment and from its presynaptic bucket, dropping
    /// the bucket if it becomes empty.
    pub fn destroy_synapse(&mut self, synapse: Synapse) {
        let synapse_data = self.synapse_data(synapse);
        let segment = synapse_data.segment;
        let presynaptic_cell = synapse_data.presynaptic_cell;
        let segment_index = synapse_data.segment_index;
        let presynaptic_map_index = synapse_data.presynaptic_map_index;

        self.remove_synapse_from_presynaptic_map(presynaptic_cell, presynaptic_map_index);

        // Remove from segment
        let moved = {
            let segment_synapses = &mut self.segment_data_mut(segment).synapses;
            segment_synapses.swap_remove(segment_index);
            segment_synapses.get(segment_index).copied()
        };
        if let Some(moved) = moved {
            self.synapse_data_mut(moved).segment_index = segment_index;
        }

        self.synapses[synapse.slot()] = None;
        self.free_synapse_slots.push(synapse.slot());
        self.num_synapses -= 1;

        trace!(
            target: "htm_connections",
            presynaptic_cell,
            flat_idx = segment.flat_idx(),
            "destroyed synapse"
        );
    }

    /// Updates a synapse's permanence value. No range check is applied.
    pub fn update_synapse_permanence(&mut self, synapse: Synapse, permanence: Permanence) {
        self.synapse_data_mut(synapse).permanence = permanence;
    }

    /// Gets the synapses on a segment, in no particular order.
    #[inline]
    pub fn synapses_for_segment(&self, segment: Segment) -> &[Synapse] {
        &self.segment_data(segment).synapses
    }

    /// Gets the synapses on a segment sorted by creation order.
    pub fn synapses_for_segment_sorted(&self, segment: Segment) -> Vec<Synapse> {
        let mut synapses = self.synapses_for_segment(segment).to_vec();
        synapses.sort_unstable_by_key(Synapse::ordinal);
        synapses
    }

    /// Gets the segment that owns a synapse.
    #[inline]
    pub fn segment_for_synapse(&self, synapse: Synapse) -> Segment {
        self.synapse_data(synapse).segment
    }

    /// Gets the synapse data.
    #[inline]
    pub fn data_for_synapse(&self, synapse: Synapse) -> &SynapseData {
        self.synapse_data(synapse)
    }

    /// Gets the presynaptic cells for a segment.
    pub fn presynaptic_cells_for_segment(&self, segment: Segment) -> Vec<CellIdx> {
        self.synapses_for_segment(segment)
            .iter()
            .map(|&s| self.synapse_data(s).presynaptic_cell)
            .collect()
    }

    /// Gets all synapses from a presynaptic cell. Empty if the cell has none.
    pub fn synapses_for_presynaptic_cell(&self, cell: CellIdx) -> &[Synapse] {
        self.synapses_for_presynaptic_cell
            .get(&cell)
            .map_or(&[], Vec::as_slice)
    }

    // ========================================================================
    // Presynaptic map management
    // ========================================================================

    fn remove_synapse_from_presynaptic_map(&mut self, presynaptic_cell: CellIdx, index: usize) {
        let synapses = self
            .synapses_for_presynaptic_cell
            .get_mut(&presynaptic_cell)
            .unwrap_or_else(|| panic!("missing presynaptic bucket for cell {presynaptic_cell}"));
        synapses.swap_remove(index);
        let moved = synapses.get(index).copied();

        // Drop empty buckets so bucket presence means "has outgoing synapses".
        if synapses.is_empty() {
            self.synapses_for_presynaptic_cell.remove(&presynaptic_cell);
        } else if let Some(moved) = moved {
            self.synapse_data_mut(moved).presynaptic_map_index = index;
        }
    }

    // ========================================================================
    // Activity computation
    // ========================================================================

    /// Computes segment activity given active presynaptic cells.
    ///
    /// # Arguments
    ///
    /// * `active_presynaptic_cells` - The active input cells. Duplicates are
    ///   counted once per occurrence.
    /// * `connected_permanence` - Permanence threshold for a synapse to be
    ///   considered connected
    ///
    /// # Returns
    ///
    /// `(num_active_connected, num_active_potential)`, both indexed by
    /// [`Segment::flat_idx`] and of length [`segment_flat_list_length`].
    /// A synapse is connected when its permanence exceeds
    /// `connected_permanence - EPSILON`.
    ///
    /// [`segment_flat_list_length`]: Self::segment_flat_list_length
    pub fn compute_activity<I>(
        &self,
        active_presynaptic_cells: I,
        connected_permanence: Permanence,
    ) -> (Vec<SynapseCount>, Vec<SynapseCount>)
    where
        I: IntoIterator<Item = CellIdx>,
    {
        let mut num_active_connected = vec![0; self.segments.len()];
        let mut num_active_potential = vec![0; self.segments.len()];

        let threshold = connected_permanence - EPSILON;

        for cell in active_presynaptic_cells {
            let Some(synapses) = self.synapses_for_presynaptic_cell.get(&cell) else {
                continue;
            };

            for &synapse in synapses {
                let synapse_data = self.synapse_data(synapse);
                let flat_idx = synapse_data.segment.flat_idx() as usize;

                num_active_potential[flat_idx] += 1;
                if synapse_data.permanence > threshold {
                    num_active_connected[flat_idx] += 1;
                }
            }
        }

        (num_active_connected, num_active_potential)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Verifies every internal index against the others.
    ///
    /// Intended for tests and debugging; cost is linear in the size of the
    /// graph.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionsError::InternalError`] describing the first
    /// inconsistency found.
    pub fn check_invariants(&self) -> Result<()> {
        let mut live_segments = 0;
        let mut counted_synapses = 0;

        for (cell, cell_data) in (0..).zip(&self.cells) {
            for &segment in &cell_data.segments {
                let data = match self.segments.get(segment.flat_idx() as usize) {
                    Some(Some(data)) if data.ordinal == segment.ordinal() => data,
                    _ => {
                        return Err(violation(format!(
                            "cell {cell} lists segment {segment:?} missing from the flat list"
                        )))
                    }
                };
                if data.cell != cell || segment.cell() != cell {
                    return Err(violation(format!(
                        "segment {segment:?} listed on cell {cell} belongs to cell {}",
                        data.cell
                    )));
                }
                if data.ordinal >= self.next_segment_ordinal {
                    return Err(violation(format!(
                        "segment {segment:?} has ordinal beyond the counter"
                    )));
                }
                live_segments += 1;

                for (idx, &synapse) in data.synapses.iter().enumerate() {
                    self.check_synapse(segment, idx, synapse)?;
                }
                counted_synapses += data.synapses.len();
            }
        }

        if live_segments != self.num_segments() {
            return Err(violation(format!(
                "{live_segments} segments reachable from cells, {} in the flat list",
                self.num_segments()
            )));
        }

        let mut freed = AHashSet::new();
        for &flat_idx in &self.free_flat_idxs {
            if !freed.insert(flat_idx) || !matches!(self.segments.get(flat_idx as usize), Some(None)) {
                return Err(violation(format!("free flat index {flat_idx} is not a free slot")));
            }
        }

        if counted_synapses != self.num_synapses {
            return Err(violation(format!(
                "{counted_synapses} synapses on segments, running total is {}",
                self.num_synapses
            )));
        }

        let mut bucketed_synapses = 0;
        for (&cell, synapses) in &self.synapses_for_presynaptic_cell {
            if synapses.is_empty() {
                return Err(violation(format!("empty presynaptic bucket for cell {cell}")));
            }
            for (idx, &synapse) in synapses.iter().enumerate() {
                match self.synapses.get(synapse.slot()) {
                    Some(Some(data))
                        if data.ordinal == synapse.ordinal()
                            && data.presynaptic_cell == cell
                            && data.presynaptic_map_index == idx => {}
                    _ => {
                        return Err(violation(format!(
                            "presynaptic bucket for cell {cell} holds stray synapse {synapse:?}"
                        )))
                    }
                }
            }
            bucketed_synapses += synapses.len();
        }

        if bucketed_synapses != self.num_synapses {
            return Err(violation(format!(
                "{bucketed_synapses} synapses in presynaptic buckets, running total is {}",
                self.num_synapses
            )));
        }

        Ok(())
    }

    fn check_synapse(&self, segment: Segment, idx: usize, synapse: Synapse) -> Result<()> {
        let data = match self.synapses.get(synapse.slot()) {
            Some(Some(data)) if data.ordinal == synapse.ordinal() => data,
            _ => {
                return Err(violation(format!(
                    "segment {segment:?} holds destroyed synapse {synapse:?}"
                )))
            }
        };
        if data.segment != segment || data.segment_index != idx {
            return Err(violation(format!(
                "synapse {synapse:?} does not point back to segment {segment:?}"
            )));
        }
        if data.ordinal >= self.next_synapse_ordinal {
            return Err(violation(format!(
                "synapse {synapse:?} has ordinal beyond the counter"
            )));
        }

        let in_bucket = self
            .synapses_for_presynaptic_cell(data.presynaptic_cell)
            .get(data.presynaptic_map_index)
            == Some(&synapse);
        if !in_bucket {
            return Err(violation(format!(
                "synapse {synapse:?} missing from bucket for cell {}",
                data.presynaptic_cell
            )));
        }

        Ok(())
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn check_cell(&self, cell: CellIdx) -> Result<()> {
        if (cell as usize) < self.cells.len() {
            Ok(())
        } else {
            Err(ConnectionsError::IndexOutOfBounds {
                index: cell as usize,
                size: self.cells.len(),
            })
        }
    }

    fn segment_data(&self, segment: Segment) -> &SegmentData {
        match self.segments.get(segment.flat_idx() as usize) {
            Some(Some(data)) if data.ordinal == segment.ordinal() => data,
            _ => panic!("use of destroyed segment {segment:?}"),
        }
    }

    fn segment_data_mut(&mut self, segment: Segment) -> &mut SegmentData {
        match self.segments.get_mut(segment.flat_idx() as usize) {
            Some(Some(data)) if data.ordinal == segment.ordinal() => data,
            _ => panic!("use of destroyed segment {segment:?}"),
        }
    }

    fn synapse_data(&self, synapse: Synapse) -> &SynapseData {
        match self.synapses.get(synapse.slot()) {
            Some(Some(data)) if data.ordinal == synapse.ordinal() => data,
            _ => panic!("use of destroyed synapse {synapse:?}"),
        }
    }

    fn synapse_data_mut(&mut self, synapse: Synapse) -> &mut SynapseData {
        match self.synapses.get_mut(synapse.slot()) {
            Some(Some(data)) if data.ordinal == synapse.ordinal() => data,
            _ => panic!("use of destroyed synapse {synapse:?}"),
        }
    }

    /// True if both synapse lists hold the same multiset of
    /// `(owning cell, presynaptic cell)` keys, with permanences that pair up
    /// within `EPSILON`.
    ///
    /// Permanences sharing a key are paired in sorted order, which finds a
    /// pairing whenever one exists and keeps the relation symmetric.
    fn synapses_match(&self, ours: &[Synapse], other: &Self, theirs: &[Synapse]) -> bool {
        if ours.len() != theirs.len() {
            return false;
        }

        let ours = self.permanences_by_key(ours);
        let theirs = other.permanences_by_key(theirs);

        ours.len() == theirs.len()
            && ours.iter().all(|(key, a)| {
                theirs.get(key).is_some_and(|b| {
                    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| permanences_match(x, y))
                })
            })
    }

    fn permanences_by_key(
        &self,
        synapses: &[Synapse],
    ) -> AHashMap<(CellIdx, CellIdx), SmallVec<[Permanence; 4]>> {
        let mut by_key: AHashMap<(CellIdx, CellIdx), SmallVec<[Permanence; 4]>> =
            AHashMap::with_capacity(synapses.len());
        for &synapse in synapses {
            let data = self.synapse_data(synapse);
            by_key
                .entry((data.segment.cell(), data.presynaptic_cell))
                .or_default()
                .push(data.permanence);
        }
        for permanences in by_key.values_mut() {
            permanences.sort_unstable_by(Permanence::total_cmp);
        }
        by_key
    }
}

#[allow(clippy::float_cmp)]
fn permanences_match(a: Permanence, b: Permanence) -> bool {
    a == b || (a - b).abs() < EPSILON
}

fn violation(message: String) -> ConnectionsError {
    warn!(target: "htm_connections", %message, "connections invariant violated");
    ConnectionsError::InternalError(message)
}

/// Equality of logical content.
///
/// Flat indices and ordinals are artifacts of allocation order, so they are
/// ignored: two graphs built by different operation histories compare equal
/// when every cell has the same segments (positionally) carrying the same
/// synapses, and the presynaptic index agrees.
impl PartialEq for Connections {
    fn eq(&self, other: &Self) -> bool {
        if self.cells.len() != other.cells.len() || self.num_synapses != other.num_synapses {
            return false;
        }

        for (cell, other_cell) in self.cells.iter().zip(&other.cells) {
            if cell.segments.len() != other_cell.segments.len() {
                return false;
            }

            for (&segment, &other_segment) in cell.segments.iter().zip(&other_cell.segments) {
                if !self.synapses_match(
                    self.synapses_for_segment(segment),
                    other,
                    other.synapses_for_segment(other_segment),
                ) {
                    return false;
                }
            }
        }

        if self.synapses_for_presynaptic_cell.len() != other.synapses_for_presynaptic_cell.len() {
            return false;
        }

        self.synapses_for_presynaptic_cell
            .iter()
            .all(|(&cell, synapses)| {
                self.synapses_match(synapses, other, other.synapses_for_presynaptic_cell(cell))
            })
    }
}

impl fmt::Display for Connections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Connections(cells: {}, segments: {}, synapses: {}, presynaptic cells: {})",
            self.num_cells(),
            self.num_segments(),
            self.num_synapses(),
            self.synapses_for_presynaptic_cell.len()
        )
    }
}
