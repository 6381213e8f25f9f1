//! Persisted form of a [`Connections`] graph.
//!
//! The proto mirrors the logical content only: per cell, its segments in
//! list order; per segment, its synapses in creation order as
//! `(presynaptic_cell, permanence)` pairs. Flat indices and ordinals are not
//! stored and are reassigned sequentially on read, so a read-back graph is
//! equal to the original under `==` without being identical to it.

use super::Connections;
use crate::error::{ConnectionsError, Result};
use crate::types::{CellIdx, Permanence};

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One synapse: where it comes from and how strong it is.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynapseProto {
    /// Source cell index.
    pub presynaptic_cell: CellIdx,
    /// Permanence at the time of writing.
    pub permanence: Permanence,
}

/// One segment and its synapses, ordered by creation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentProto {
    /// Synapses on the segment.
    pub synapses: Vec<SynapseProto>,
}

/// One cell and its segments, in list order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellProto {
    /// Segments on the cell.
    pub segments: Vec<SegmentProto>,
}

/// A whole connections graph. `cells.len()` is the cell count.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionsProto {
    /// Every cell of the graph, including cells without segments.
    pub cells: Vec<CellProto>,
}

impl Connections {
    /// Writes the graph's logical content to a proto.
    pub fn write(&self) -> ConnectionsProto {
        let cells: Vec<CellProto> = (0..)
            .take(self.num_cells())
            .map(|cell: CellIdx| CellProto {
                segments: self
                    .segments_for_cell(cell)
                    .iter()
                    .map(|&segment| SegmentProto {
                        synapses: self
                            .synapses_for_segment_sorted(segment)
                            .into_iter()
                            .map(|synapse| {
                                let data = self.data_for_synapse(synapse);
                                SynapseProto {
                                    presynaptic_cell: data.presynaptic_cell,
                                    permanence: data.permanence,
                                }
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        debug!(
            target: "htm_connections",
            cells = cells.len(),
            segments = self.num_segments(),
            synapses = self.num_synapses(),
            "wrote connections"
        );

        ConnectionsProto { cells }
    }

    /// Builds a new graph from a proto.
    ///
    /// Segments and synapses are created in proto order, so they receive
    /// sequential flat indices and ordinals exactly as fresh calls to
    /// [`create_segment`](Self::create_segment) and
    /// [`create_synapse`](Self::create_synapse) would assign them.
    ///
    /// Permanences are taken as stored, so every graph produced by
    /// [`write`](Self::write) reads back, whatever values learning left in it.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionsError::InvalidParameter`] if the cell count does
    /// not fit a [`CellIdx`]. No partially built graph is returned.
    pub fn read(proto: &ConnectionsProto) -> Result<Self> {
        let num_cells =
            CellIdx::try_from(proto.cells.len()).map_err(|_| ConnectionsError::InvalidParameter {
                name: "cells",
                message: format!("{} cells exceed the cell index range", proto.cells.len()),
            })?;

        let mut connections = Self::with_cells(num_cells);

        for (cell, cell_proto) in (0..num_cells).zip(&proto.cells) {
            for segment_proto in &cell_proto.segments {
                let segment = connections.create_segment(cell)?;

                for synapse_proto in &segment_proto.synapses {
                    connections.create_synapse(
                        segment,
                        synapse_proto.presynaptic_cell,
                        synapse_proto.permanence,
                    );
                }
            }
        }

        debug!(
            target: "htm_connections",
            cells = num_cells,
            segments = connections.num_segments(),
            synapses = connections.num_synapses(),
            "read connections"
        );

        Ok(connections)
    }
}

impl From<&Connections> for ConnectionsProto {
    fn from(connections: &Connections) -> Self {
        connections.write()
    }
}

impl From<Connections> for ConnectionsProto {
    fn from(connections: Connections) -> Self {
        connections.write()
    }
}

impl TryFrom<ConnectionsProto> for Connections {
    type Error = ConnectionsError;

    fn try_from(proto: ConnectionsProto) -> Result<Self> {
        Self::read(&proto)
    }
}
