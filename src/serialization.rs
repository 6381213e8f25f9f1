//! Byte encodings of the persisted connections form.
//!
//! [`ConnectionsProto`] is the only persisted shape. This module turns it into
//! bytes and back; where those bytes live (files, sockets, a larger model
//! snapshot) is up to the caller.
//!
//! - **Binary** (bincode): compact and bit-exact for every permanence
//! - **JSON** (serde_json): readable, but JSON has no encoding for NaN or
//!   infinity, so protos holding such permanences are refused
//!
//! # Example
//!
//! ```rust
//! use htm_connections::prelude::*;
//!
//! let mut connections = Connections::with_cells(8);
//! let segment = connections.create_segment(3)?;
//! connections.create_synapse(segment, 5, 0.4);
//!
//! let bytes = connections.to_bytes(Encoding::Binary)?;
//! let restored = Connections::from_bytes(&bytes, Encoding::Binary)?;
//! assert_eq!(restored, connections);
//! # Ok::<(), htm_connections::ConnectionsError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use crate::algorithms::{Connections, ConnectionsProto};
use crate::error::{ConnectionsError, Result};

use tracing::debug;

/// Byte encoding of a [`ConnectionsProto`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// bincode.
    #[default]
    Binary,

    /// Compact JSON.
    Json,
}

impl Encoding {
    /// Lower-case name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Encoding::Binary => "binary",
            Encoding::Json => "json",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = ConnectionsError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("binary") || s.eq_ignore_ascii_case("bincode") {
            Ok(Encoding::Binary)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(Encoding::Json)
        } else {
            Err(ConnectionsError::InvalidParameter {
                name: "encoding",
                message: format!("unknown encoding '{s}', expected binary or json"),
            })
        }
    }
}

fn codec_error(encoding: Encoding, action: &str, err: impl fmt::Display) -> ConnectionsError {
    ConnectionsError::SerializationError {
        message: format!("{encoding} {action} failed: {err}"),
    }
}

impl ConnectionsProto {
    /// Encodes the proto.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionsError::SerializationError`] if the encoder fails,
    /// or if `encoding` is JSON and some permanence is not finite.
    pub fn to_bytes(&self, encoding: Encoding) -> Result<Vec<u8>> {
        let bytes = match encoding {
            Encoding::Binary => {
                bincode::serialize(self).map_err(|e| codec_error(encoding, "encoding", e))?
            }
            Encoding::Json => {
                if let Some((cell, permanence)) = self.first_non_finite_permanence() {
                    return Err(codec_error(
                        encoding,
                        "encoding",
                        format_args!("permanence {permanence} on cell {cell} is not representable"),
                    ));
                }
                serde_json::to_vec(self).map_err(|e| codec_error(encoding, "encoding", e))?
            }
        };

        debug!(target: "htm_connections", %encoding, bytes = bytes.len(), "encoded proto");
        Ok(bytes)
    }

    /// Decodes a proto.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionsError::SerializationError`] if `bytes` do not hold
    /// a proto of the expected shape.
    pub fn from_bytes(bytes: &[u8], encoding: Encoding) -> Result<Self> {
        match encoding {
            Encoding::Binary => {
                bincode::deserialize(bytes).map_err(|e| codec_error(encoding, "decoding", e))
            }
            Encoding::Json => {
                serde_json::from_slice(bytes).map_err(|e| codec_error(encoding, "decoding", e))
            }
        }
    }

    fn first_non_finite_permanence(&self) -> Option<(usize, f32)> {
        self.cells.iter().enumerate().find_map(|(cell, cell_proto)| {
            cell_proto
                .segments
                .iter()
                .flat_map(|segment| &segment.synapses)
                .find(|synapse| !synapse.permanence.is_finite())
                .map(|synapse| (cell, synapse.permanence))
        })
    }
}

impl Connections {
    /// Writes the graph and encodes the resulting proto.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsProto::to_bytes`].
    pub fn to_bytes(&self, encoding: Encoding) -> Result<Vec<u8>> {
        self.write().to_bytes(encoding)
    }

    /// Decodes a proto and reads a new graph from it.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsProto::from_bytes`] and [`Connections::read`].
    pub fn from_bytes(bytes: &[u8], encoding: Encoding) -> Result<Self> {
        Self::read(&ConnectionsProto::from_bytes(bytes, encoding)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Connections {
        let mut connections = Connections::with_cells(64);
        let s1 = connections.create_segment(3).unwrap();
        connections.create_synapse(s1, 10, 0.25);
        connections.create_synapse(s1, 11, 0.75);
        let s2 = connections.create_segment(3).unwrap();
        connections.create_synapse(s2, 10, 0.5);
        let scratch = connections.create_segment(40).unwrap();
        connections.create_synapse(scratch, 12, 0.5);
        connections.destroy_segment(scratch);
        connections
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("Binary".parse::<Encoding>().unwrap(), Encoding::Binary);
        assert_eq!("bincode".parse::<Encoding>().unwrap(), Encoding::Binary);
        assert_eq!("JSON".parse::<Encoding>().unwrap(), Encoding::Json);
        assert!(matches!(
            "capnp".parse::<Encoding>(),
            Err(ConnectionsError::InvalidParameter { name: "encoding", .. })
        ));

        for encoding in [Encoding::Binary, Encoding::Json] {
            assert_eq!(encoding.to_string().parse::<Encoding>().unwrap(), encoding);
        }
        assert_eq!(Encoding::default(), Encoding::Binary);
    }

    #[test]
    fn test_binary_round_trip() {
        let connections = sample();

        let bytes = connections.to_bytes(Encoding::Binary).unwrap();
        let restored = Connections::from_bytes(&bytes, Encoding::Binary).unwrap();

        assert_eq!(restored, connections);
        assert_eq!(restored.num_synapses(), 3);
        restored.check_invariants().unwrap();
    }

    #[test]
    fn test_json_carries_logical_content_only() {
        let connections = sample();

        let bytes = connections.to_bytes(Encoding::Json).unwrap();
        let json = std::str::from_utf8(&bytes).unwrap();
        assert!(json.contains("presynaptic_cell"));
        assert!(!json.contains("ordinal"));
        assert!(!json.contains("flat_idx"));

        let restored = Connections::from_bytes(&bytes, Encoding::Json).unwrap();
        assert_eq!(restored, connections);
    }

    #[test]
    fn test_proto_and_graph_encodings_agree() {
        let connections = sample();
        let proto = connections.write();

        assert_eq!(
            proto.to_bytes(Encoding::Binary).unwrap(),
            connections.to_bytes(Encoding::Binary).unwrap()
        );

        let bytes = proto.to_bytes(Encoding::Json).unwrap();
        assert_eq!(ConnectionsProto::from_bytes(&bytes, Encoding::Json).unwrap(), proto);
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let err = Connections::from_bytes(br#"{"cells": [{"segments": "nope"}]}"#, Encoding::Json)
            .unwrap_err();
        assert!(matches!(err, ConnectionsError::SerializationError { .. }));

        let err = Connections::from_bytes(&[1, 2, 3], Encoding::Binary).unwrap_err();
        assert!(matches!(err, ConnectionsError::SerializationError { .. }));
    }

    #[test]
    fn test_infinite_permanence_survives_binary_only() {
        let mut connections = Connections::with_cells(4);
        let segment = connections.create_segment(1).unwrap();
        let synapse = connections.create_synapse(segment, 2, 0.5);
        connections.update_synapse_permanence(synapse, f32::INFINITY);

        let bytes = connections.to_bytes(Encoding::Binary).unwrap();
        let restored = Connections::from_bytes(&bytes, Encoding::Binary).unwrap();
        assert_eq!(restored, connections);

        let err = connections.to_bytes(Encoding::Json).unwrap_err();
        assert!(matches!(err, ConnectionsError::SerializationError { .. }));
        assert!(err.to_string().contains("cell 1"));
    }
}
