//! Host-side glTF/GLB asset ingestion: container parsing, typed accessor
//! decoding, mesh/node/scene construction, and world-transform resolution.
//!
//! The crate stops at the point where a renderer takes over: it produces
//! interleaved vertex/index data and `(mesh, world matrix)` draw pairs, and
//! makes no GPU calls. Loading is synchronous and all-or-nothing; every
//! entity is immutable once a [`Model`] is built, except its current-scene
//! selection.

pub mod accessor;
pub mod byte_store;
pub mod error;
pub mod file_formats;
pub mod mesh;
pub mod model;
pub mod scene_tree;

pub use byte_store::ByteStore;
pub use error::{AssetError, IndexKind, Result};
pub use mesh::{MeshEntity, Vertex};
pub use model::Model;
pub use scene_tree::{DrawPair, DrawPairs, NodeEntity, SceneEntity, TransformResolver};
