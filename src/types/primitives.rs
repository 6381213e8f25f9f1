//! Primitive type definitions for the connectivity graph.
//!
//! These aliases keep index widths and the permanence type in one place so the
//! graph, its serialized form and external parallel arrays agree on them.

/// 32-bit unsigned integer.
pub type UInt32 = u32;

/// 64-bit unsigned integer.
pub type UInt64 = u64;

/// 32-bit floating point number.
pub type Real32 = f32;

/// Index type for cells in the connections graph.
pub type CellIdx = UInt32;

/// Dense, reusable identifier of a live segment.
///
/// External algorithms use it to index per-segment parallel arrays; see
/// [`Connections::segment_flat_list_length`](crate::algorithms::Connections::segment_flat_list_length).
pub type FlatIdx = UInt32;

/// Creation-order counter for segments and synapses. Never reused.
pub type Ordinal = UInt64;

/// Per-segment synapse counter used in activity results.
pub type SynapseCount = UInt32;

/// Synapse permanence value.
///
/// Learning rules usually keep it in `0.0..=1.0`, but the graph stores any
/// value it is given.
pub type Permanence = Real32;

/// Tolerance for permanence comparisons.
///
/// A synapse whose permanence equals the connected threshold counts as
/// connected, and permanences closer than this compare equal.
pub const EPSILON: Permanence = 1e-5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_sizes() {
        assert_eq!(core::mem::size_of::<CellIdx>(), 4);
        assert_eq!(core::mem::size_of::<FlatIdx>(), 4);
        assert_eq!(core::mem::size_of::<Ordinal>(), 8);
        assert_eq!(core::mem::size_of::<Permanence>(), 4);
    }

    #[test]
    fn test_epsilon_is_small() {
        assert!(EPSILON > 0.0);
        assert!(EPSILON < 0.001);
    }
}
