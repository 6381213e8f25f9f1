//! HTM connectivity algorithms.
//!
//! - **Connections**: The synaptic connectivity graph and its activity computation
//! - **Proto**: The persisted form of a connections graph

mod connections;
mod proto;

pub use connections::{CellData, Connections, ConnectionsParams, SegmentData, SynapseData};
pub use proto::{CellProto, ConnectionsProto, SegmentProto, SynapseProto};
