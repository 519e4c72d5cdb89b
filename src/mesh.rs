//! Mesh construction: accessor decodes for each attribute slot, interleaving
//! into a uniform vertex layout, and index normalization.

use bytemuck::{Pod, Zeroable};
use log::warn;

use crate::accessor;
use crate::byte_store::ByteStore;
use crate::error::{AssetError, IndexKind, Result};
use crate::file_formats::gltf::Document;

const MODE_TRIANGLES: u32 = 4;

/// Interleaved vertex layout handed to the rendering side.
///
/// NORMAL and TEXCOORD_0 channels are zero-filled when the source mesh does
/// not author them, so the layout is uniform across all meshes of a model.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

pub struct MeshEntity {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    primitive_count: usize,
}

impl MeshEntity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_data(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn index_data(&self) -> &[u32] {
        &self.indices
    }

    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }
}

/// Builds one mesh entity from the document's mesh table.
///
/// POSITION is mandatory per primitive. NORMAL/TEXCOORD_0 must match the
/// POSITION count when present. Primitives are concatenated into a single
/// vertex/index pair with indices rebased past the vertices of earlier
/// primitives; every index is validated against its primitive's vertex count.
pub fn build_mesh(doc: &Document, store: &ByteStore, mesh_index: usize) -> Result<MeshEntity> {
    let desc = doc
        .meshes
        .get(mesh_index)
        .ok_or_else(|| AssetError::invalid_index(IndexKind::Mesh, mesh_index, doc.meshes.len()))?;
    let name = desc
        .name
        .clone()
        .unwrap_or_else(|| format!("mesh{mesh_index}"));

    let mut vertices: Vec<Vertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut primitive_count = 0usize;

    for (primitive_index, primitive) in desc.primitives.iter().enumerate() {
        let mode = primitive.mode.unwrap_or(MODE_TRIANGLES);
        if mode != MODE_TRIANGLES {
            warn!("mesh {name:?}: skipping primitive {primitive_index} with non-triangle mode {mode}");
            continue;
        }

        let position_accessor = primitive.attributes.position.ok_or_else(|| {
            AssetError::MissingRequiredAttribute {
                mesh: name.clone(),
                attribute: "POSITION",
            }
        })?;
        let positions = accessor::read_vec3(doc, store, position_accessor)?;

        let normals = match primitive.attributes.normal {
            Some(a) => Some(accessor::read_vec3(doc, store, a)?),
            None => None,
        };
        let uvs = match primitive.attributes.texcoord_0 {
            Some(a) => Some(accessor::read_vec2(doc, store, a)?),
            None => None,
        };

        if let Some(ref normals) = normals {
            if normals.len() != positions.len() {
                return Err(AssetError::AttributeCountMismatch {
                    mesh: name.clone(),
                    attribute: "NORMAL",
                    expected: positions.len(),
                    found: normals.len(),
                });
            }
        }
        if let Some(ref uvs) = uvs {
            if uvs.len() != positions.len() {
                return Err(AssetError::AttributeCountMismatch {
                    mesh: name.clone(),
                    attribute: "TEXCOORD_0",
                    expected: positions.len(),
                    found: uvs.len(),
                });
            }
        }

        let base = vertices.len() as u32;
        for i in 0..positions.len() {
            vertices.push(Vertex {
                position: positions[i],
                normal: normals.as_ref().map_or([0.0; 3], |n| n[i]),
                uv: uvs.as_ref().map_or([0.0; 2], |t| t[i]),
            });
        }

        let primitive_indices = match primitive.indices {
            Some(a) => accessor::read_indices(doc, store, a)?,
            // non-indexed primitive: vertices are consumed in order
            None => (0..positions.len() as u32).collect(),
        };
        for &index in &primitive_indices {
            if index as usize >= positions.len() {
                return Err(AssetError::IndexOutOfRange {
                    mesh: name.clone(),
                    index,
                    vertex_count: positions.len(),
                });
            }
            indices.push(base + index);
        }

        primitive_count += 1;
    }

    Ok(MeshEntity {
        name,
        vertices,
        indices,
        primitive_count,
    })
}
