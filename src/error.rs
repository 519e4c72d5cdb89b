use std::fmt;

use thiserror::Error;

/// Which entity table an out-of-range cross-reference pointed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Buffer,
    BufferView,
    Accessor,
    Mesh,
    Node,
    Scene,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndexKind::Buffer => "buffer",
            IndexKind::BufferView => "buffer view",
            IndexKind::Accessor => "accessor",
            IndexKind::Mesh => "mesh",
            IndexKind::Node => "node",
            IndexKind::Scene => "scene",
        };
        f.write_str(s)
    }
}

/// Everything that can go wrong between opening an asset file and handing
/// draw pairs to the renderer. Load-time errors abort the whole load; no
/// partially populated model ever escapes.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed container: {reason}")]
    MalformedContainer { reason: String },

    #[error("out-of-bounds access in {context}: offset {offset} + len {len} > {available} bytes")]
    OutOfBoundsAccess {
        context: String,
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("unsupported component type {found} for {context}")]
    UnsupportedComponentType { found: u16, context: &'static str },

    #[error("mesh {mesh:?} is missing required attribute {attribute}")]
    MissingRequiredAttribute { mesh: String, attribute: &'static str },

    #[error("mesh {mesh:?}: {attribute} count {found} does not match POSITION count {expected}")]
    AttributeCountMismatch {
        mesh: String,
        attribute: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("mesh {mesh:?}: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("{kind} index {index} out of range (table holds {len})")]
    InvalidIndex {
        kind: IndexKind,
        index: usize,
        len: usize,
    },

    #[error("node {node} is reachable more than once; the node hierarchy must be a forest")]
    CyclicNodeGraph { node: usize },

    #[error("scene index {index} out of range ({scene_count} scenes)")]
    InvalidSceneIndex { index: usize, scene_count: usize },
}

impl From<serde_json::Error> for AssetError {
    fn from(err: serde_json::Error) -> Self {
        AssetError::MalformedContainer {
            reason: err.to_string(),
        }
    }
}

impl AssetError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        AssetError::MalformedContainer {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_index(kind: IndexKind, index: usize, len: usize) -> Self {
        AssetError::InvalidIndex { kind, index, len }
    }
}

pub type Result<T> = std::result::Result<T, AssetError>;
