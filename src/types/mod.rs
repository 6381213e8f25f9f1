//! Core types for the connectivity graph.
//!
//! This module contains the primitive index and permanence aliases, plus the
//! `Segment` and `Synapse` handles that name entities inside a `Connections`.

mod handles;
mod primitives;

pub use handles::*;
pub use primitives::*;
