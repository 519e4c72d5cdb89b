//! Node and scene entities plus the transform resolver.
//!
//! Nodes are stored in one flat table and reference meshes and children by
//! index, so traversal is an explicit stack walk over indices rather than
//! pointer chasing or recursion. A node's local matrix is computed once at
//! construction from its TRS fields and never re-derived; entities are
//! immutable after the model is built.

use glam::{Mat4, Quat, Vec3};

use crate::error::{AssetError, IndexKind, Result};
use crate::file_formats::gltf;
use crate::model::Model;

pub struct NodeEntity {
    name: String,
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    local_matrix: Mat4,
    mesh: Option<usize>,
    children: Vec<usize>,
}

impl NodeEntity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn local_matrix(&self) -> Mat4 {
        self.local_matrix
    }

    pub fn mesh(&self) -> Option<usize> {
        self.mesh
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

/// Builds a node, defaulting each absent TRS field independently and caching
/// the composed local matrix (scale first, then rotation, then translation).
/// An authored `matrix` is taken verbatim when no TRS field is present.
/// Mesh and child references are validated against the table sizes.
pub fn build_node(
    desc: &gltf::Node,
    node_index: usize,
    node_count: usize,
    mesh_count: usize,
) -> Result<NodeEntity> {
    let name = desc
        .name
        .clone()
        .unwrap_or_else(|| format!("node{node_index}"));

    let translation = desc.translation.map_or(Vec3::ZERO, Vec3::from);
    let rotation = desc.rotation.map_or(Quat::IDENTITY, Quat::from_array);
    let scale = desc.scale.map_or(Vec3::ONE, Vec3::from);
    let authored_trs =
        desc.translation.is_some() || desc.rotation.is_some() || desc.scale.is_some();
    let local_matrix = match desc.matrix {
        Some(m) if !authored_trs => Mat4::from_cols_array(&m),
        _ => Mat4::from_scale_rotation_translation(scale, rotation, translation),
    };

    if let Some(mesh) = desc.mesh {
        if mesh >= mesh_count {
            return Err(AssetError::invalid_index(IndexKind::Mesh, mesh, mesh_count));
        }
    }
    let children = desc.children.clone().unwrap_or_default();
    for &child in &children {
        if child >= node_count {
            return Err(AssetError::invalid_index(IndexKind::Node, child, node_count));
        }
    }

    Ok(NodeEntity {
        name,
        translation,
        rotation,
        scale,
        local_matrix,
        mesh: desc.mesh,
        children,
    })
}

pub struct SceneEntity {
    name: String,
    roots: Vec<usize>,
}

impl SceneEntity {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root node indices in source order; draw order follows this order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }
}

pub fn build_scene(desc: &gltf::Scene, scene_index: usize, node_count: usize) -> Result<SceneEntity> {
    let name = desc
        .name
        .clone()
        .unwrap_or_else(|| format!("scene{scene_index}"));
    for &root in &desc.nodes {
        if root >= node_count {
            return Err(AssetError::invalid_index(IndexKind::Node, root, node_count));
        }
    }
    Ok(SceneEntity {
        name,
        roots: desc.nodes.clone(),
    })
}

/// Walks every scene's hierarchy once and fails if any node is reachable
/// twice within a scene. Sharing a node across scenes is fine.
pub fn validate_forest(scenes: &[SceneEntity], nodes: &[NodeEntity]) -> Result<()> {
    for scene in scenes {
        let mut visited = vec![false; nodes.len()];
        let mut stack: Vec<usize> = scene.roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            if visited[index] {
                return Err(AssetError::CyclicNodeGraph { node: index });
            }
            visited[index] = true;
            stack.extend(nodes[index].children.iter().rev());
        }
    }
    Ok(())
}

/// One emitted draw: a mesh table index and the node's world transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawPair {
    pub mesh: usize,
    pub world: Mat4,
}

pub struct TransformResolver;

impl TransformResolver {
    /// Resolves world transforms for one scene, yielding `(mesh, world)`
    /// pairs depth-first in child-list order. Restartable: every call walks
    /// the same immutable entities from scratch.
    pub fn resolve(model: &Model, scene_index: usize) -> Result<DrawPairs<'_>> {
        let scene = model.scenes().get(scene_index).ok_or_else(|| {
            AssetError::InvalidSceneIndex {
                index: scene_index,
                scene_count: model.scenes().len(),
            }
        })?;
        Ok(DrawPairs::new(model.nodes(), scene))
    }
}

pub struct DrawPairs<'a> {
    nodes: &'a [NodeEntity],
    stack: Vec<(usize, Mat4)>,
    visited: Vec<bool>,
}

impl<'a> DrawPairs<'a> {
    pub(crate) fn new(nodes: &'a [NodeEntity], scene: &SceneEntity) -> Self {
        // depth-first in child-list order: seed the stack reversed
        let stack = scene
            .roots
            .iter()
            .rev()
            .map(|&root| (root, Mat4::IDENTITY))
            .collect();
        Self {
            nodes,
            stack,
            visited: vec![false; nodes.len()],
        }
    }
}

impl Iterator for DrawPairs<'_> {
    type Item = Result<DrawPair>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, parent_world)) = self.stack.pop() {
            if self.visited[index] {
                // load validates the forest already; fail fast regardless
                self.stack.clear();
                return Some(Err(AssetError::CyclicNodeGraph { node: index }));
            }
            self.visited[index] = true;

            let node = &self.nodes[index];
            let world = parent_world * node.local_matrix;
            for &child in node.children.iter().rev() {
                self.stack.push((child, world));
            }
            if let Some(mesh) = node.mesh {
                return Some(Ok(DrawPair { mesh, world }));
            }
        }
        None
    }
}
