//! # htm-connections - Sparse synaptic connectivity for HTM
//!
//! `htm-connections` is the in-memory connectivity graph behind the HTM temporal
//! memory algorithm: cells own dendritic segments, segments own synapses, and
//! synapses are reverse-indexed by their presynaptic cell.
//!
//! ## Overview
//!
//! - **Connections**: Creates, destroys and queries segments and synapses, and
//!   computes per-segment activity for a set of active presynaptic cells
//! - **Segment / Synapse**: Small `Copy` handles naming entities in the graph
//! - **Proto**: A flat-index-free persisted form with a `write` / `read` round trip
//!
//! Segments carry a dense, reusable flat index so that learning algorithms can
//! keep per-segment parallel arrays, and a never-reused ordinal for
//! deterministic tie-breaking.
//!
//! ## Quick Start
//!
//! ```rust
//! use htm_connections::prelude::*;
//!
//! let mut connections = Connections::with_cells(4);
//!
//! let segment = connections.create_segment(2)?;
//! connections.create_synapse(segment, 0, 0.3);
//! connections.create_synapse(segment, 1, 0.9);
//!
//! let (connected, potential) = connections.compute_activity([0, 1], 0.5);
//! assert_eq!(potential[segment.flat_idx() as usize], 2);
//! assert_eq!(connected[segment.flat_idx() as usize], 1);
//! # Ok::<(), htm_connections::ConnectionsError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serde derives on the proto types plus binary and JSON
//!   encodings (see [`serialization`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod algorithms;
pub mod types;

#[cfg(feature = "serde")]
pub mod serialization;

/// Re-export of commonly used types and traits for convenience.
pub mod prelude {
    pub use crate::algorithms::{
        CellData, Connections, ConnectionsParams, ConnectionsProto, SegmentData, SynapseData,
    };
    pub use crate::types::{
        CellIdx, FlatIdx, Ordinal, Permanence, Segment, Synapse, SynapseCount, EPSILON,
    };

    #[cfg(feature = "serde")]
    pub use crate::serialization::Encoding;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library.
pub mod error {
    use thiserror::Error;

    /// Main error type for connections operations.
    #[derive(Error, Debug)]
    pub enum ConnectionsError {
        /// Invalid parameter value.
        #[error("Invalid parameter '{name}': {message}")]
        InvalidParameter {
            /// Name of the invalid parameter.
            name: &'static str,
            /// Description of the error.
            message: String,
        },

        /// Index out of bounds.
        #[error("Index {index} out of bounds (size: {size})")]
        IndexOutOfBounds {
            /// The invalid index.
            index: usize,
            /// The valid size.
            size: usize,
        },

        /// Serialization error.
        #[error("Serialization error: {message}")]
        SerializationError {
            /// Description of the serialization error.
            message: String,
        },

        /// Internal error that should not occur.
        #[error("Internal error: {0}")]
        InternalError(String),
    }

    /// Result type alias using `ConnectionsError`.
    pub type Result<T> = std::result::Result<T, ConnectionsError>;
}

pub use error::{ConnectionsError, Result};
