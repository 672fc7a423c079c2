//! Error types for mesh validation and object merging.

use std::fmt;

use crate::signature::{AttribKind, Channel};

/// Why two meshes cannot be concatenated, or why a single mesh is malformed.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A channel is populated on one side only.
    ChannelMismatch {
        channel: Channel,
        /// `true` when the channel exists on the target but not on the source.
        present_in_target: bool,
    },

    /// A named custom attribute exists on both sides with different element types.
    AttribKindMismatch {
        name: String,
        expected: AttribKind,
        found: AttribKind,
    },

    /// A populated channel does not have one element per vertex.
    LengthMismatch {
        channel: Channel,
        expected: usize,
        found: usize,
    },

    /// An index points past the end of the vertex arrays.
    IndexOutOfRange { index: u32, vertex_count: usize },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::ChannelMismatch {
                channel,
                present_in_target: true,
            } => write!(f, "{} channel is present in target mesh but missing in source", channel),
            MeshError::ChannelMismatch {
                channel,
                present_in_target: false,
            } => write!(f, "{} channel is present in source mesh but missing in target", channel),
            MeshError::AttribKindMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "attribute '{}' has element type {:?} in target but {:?} in source",
                name, expected, found
            ),
            MeshError::LengthMismatch {
                channel,
                expected,
                found,
            } => write!(
                f,
                "{} channel has {} elements, expected {}",
                channel, found, expected
            ),
            MeshError::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(
                f,
                "index {} out of range for mesh with {} vertices",
                index, vertex_count
            ),
        }
    }
}

impl std::error::Error for MeshError {}

/// Misuse of the checked object merger.
///
/// The batcher never produces these: it only merges sets it has already
/// classified as compatible.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeError {
    /// Nothing to merge.
    NoObjects,

    /// Object at `object` has a different render state than the first object.
    StateMismatch { object: usize },

    /// Object at `object` uses a different shader than the first object.
    ShaderMismatch { object: usize },

    /// Object at `object` has a different texture list than the first object.
    TexturesMismatch { object: usize },

    /// Mesh `mesh` of object `object` cannot be appended to the accumulated mesh.
    IncompatibleMesh {
        object: usize,
        mesh: usize,
        source: MeshError,
    },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::NoObjects => write!(f, "cannot merge an empty set of objects"),
            MergeError::StateMismatch { object } => {
                write!(f, "object {} has a different render state than object 0", object)
            }
            MergeError::ShaderMismatch { object } => {
                write!(f, "object {} has a different shader than object 0", object)
            }
            MergeError::TexturesMismatch { object } => {
                write!(f, "object {} has a different texture list than object 0", object)
            }
            MergeError::IncompatibleMesh {
                object,
                mesh,
                source,
            } => write!(f, "object {} mesh {} is incompatible: {}", object, mesh, source),
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MergeError::IncompatibleMesh { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_channel_mismatch_names_channel() {
        let err = MeshError::ChannelMismatch {
            channel: Channel::Colors,
            present_in_target: false,
        };
        assert!(err.to_string().contains("colors"));
    }

    #[test]
    fn test_incompatible_mesh_exposes_source() {
        let err = MergeError::IncompatibleMesh {
            object: 2,
            mesh: 0,
            source: MeshError::ChannelMismatch {
                channel: Channel::Normals,
                present_in_target: true,
            },
        };
        assert!(err.source().is_some());
        assert!(MergeError::NoObjects.source().is_none());
    }
}
