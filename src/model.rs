//! Model orchestration: one loaded asset file, owning its byte store and all
//! mesh/node/scene entities. Loading either fully succeeds or returns the
//! first error; a failed load never produces a partially built model. The
//! only state that changes after load is the current scene selection.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;

use crate::byte_store::ByteStore;
use crate::error::{AssetError, Result};
use crate::file_formats::glb::Glb;
use crate::file_formats::gltf::Document;
use crate::mesh::{self, MeshEntity};
use crate::scene_tree::{self, DrawPairs, NodeEntity, SceneEntity};

pub struct Model {
    name: String,
    byte_store: ByteStore,
    meshes: Vec<MeshEntity>,
    nodes: Vec<NodeEntity>,
    scenes: Vec<SceneEntity>,
    default_scene: usize,
    current_scene: usize,
}

impl Model {
    /// Loads a model from disk, dispatching on the file extension: `.glb`
    /// for the self-contained binary form, `.gltf` for the text form with
    /// external buffer files next to the document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match path.extension().and_then(|e| e.to_str()) {
            Some("glb") => {
                let file = File::open(path)?;
                let glb = Glb::from_reader(BufReader::new(file))?;
                let doc = Document::from_json(&glb.json)?;
                let store = ByteStore::from_glb(&doc, glb.binary)?;
                Self::from_document(name, &doc, store)
            }
            Some("gltf") => {
                let json = std::fs::read_to_string(path)?;
                let doc = Document::from_json(&json)?;
                let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
                let store = ByteStore::from_external(&doc, base_dir)?;
                Self::from_document(name, &doc, store)
            }
            _ => Err(AssetError::malformed(format!(
                "unrecognized asset extension: {}",
                path.display()
            ))),
        }
    }

    /// Loads the binary form from an in-memory byte slice.
    pub fn from_glb_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let glb = Glb::from_reader(bytes)?;
        let doc = Document::from_json(&glb.json)?;
        let store = ByteStore::from_glb(&doc, glb.binary)?;
        Self::from_document(name.into(), &doc, store)
    }

    /// Builds all entities from an already-parsed document. Construction
    /// order is meshes, then nodes (which reference meshes by index), then
    /// scenes (which reference nodes), then the forest check over the whole
    /// hierarchy.
    pub fn from_document(name: impl Into<String>, doc: &Document, byte_store: ByteStore) -> Result<Self> {
        let name = name.into();
        if doc.scenes.is_empty() {
            return Err(AssetError::malformed("document contains no scenes"));
        }

        let meshes = (0..doc.meshes.len())
            .map(|i| mesh::build_mesh(doc, &byte_store, i))
            .collect::<Result<Vec<_>>>()?;
        let nodes = doc
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| scene_tree::build_node(n, i, doc.nodes.len(), meshes.len()))
            .collect::<Result<Vec<_>>>()?;
        let scenes = doc
            .scenes
            .iter()
            .enumerate()
            .map(|(i, s)| scene_tree::build_scene(s, i, nodes.len()))
            .collect::<Result<Vec<_>>>()?;
        scene_tree::validate_forest(&scenes, &nodes)?;

        let default_scene = doc.scene.unwrap_or(0);
        if default_scene >= scenes.len() {
            return Err(AssetError::InvalidSceneIndex {
                index: default_scene,
                scene_count: scenes.len(),
            });
        }

        info!(
            "loaded {name:?}: {} meshes, {} nodes, {} scenes",
            meshes.len(),
            nodes.len(),
            scenes.len()
        );

        Ok(Self {
            name,
            byte_store,
            meshes,
            nodes,
            scenes,
            default_scene,
            current_scene: default_scene,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn byte_store(&self) -> &ByteStore {
        &self.byte_store
    }

    pub fn meshes(&self) -> &[MeshEntity] {
        &self.meshes
    }

    pub fn nodes(&self) -> &[NodeEntity] {
        &self.nodes
    }

    pub fn scenes(&self) -> &[SceneEntity] {
        &self.scenes
    }

    pub fn default_scene_index(&self) -> usize {
        self.default_scene
    }

    pub fn current_scene_index(&self) -> usize {
        self.current_scene
    }

    /// Switches the current scene. Validates before mutating: a failed call
    /// leaves the selection unchanged.
    pub fn select_scene(&mut self, index: usize) -> Result<()> {
        if index >= self.scenes.len() {
            return Err(AssetError::InvalidSceneIndex {
                index,
                scene_count: self.scenes.len(),
            });
        }
        self.current_scene = index;
        Ok(())
    }

    pub fn current_scene(&self) -> &SceneEntity {
        &self.scenes[self.current_scene]
    }

    /// Resolves the current scene's draw pairs.
    pub fn draw_pairs(&self) -> DrawPairs<'_> {
        DrawPairs::new(&self.nodes, self.current_scene())
    }
}
