//! Builders for synthetic in-memory assets.
#![allow(dead_code)]

use serde_json::{json, Value};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assembles a .glb byte stream from a JSON document and a binary buffer.
pub fn glb_bytes(document: &Value, bin: &[u8]) -> Vec<u8> {
    let mut json = serde_json::to_string(document).unwrap();
    while json.len() % 4 != 0 {
        json.push(' ');
    }
    let mut out = Vec::new();
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    let total = 12 + 8 + json.len() + 8 + bin.len();
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(json.as_bytes());
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(bin);
    out
}

pub struct BinBuilder {
    bytes: Vec<u8>,
}

/// Appends typed regions to a binary buffer, recording `(offset, length)` for
/// buffer-view construction.
impl BinBuilder {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn push_f32(&mut self, values: &[f32]) -> (usize, usize) {
        self.push_bytes(bytemuck::cast_slice(values))
    }

    pub fn push_u16(&mut self, values: &[u16]) -> (usize, usize) {
        self.push_bytes(bytemuck::cast_slice(values))
    }

    pub fn push_u32(&mut self, values: &[u32]) -> (usize, usize) {
        self.push_bytes(bytemuck::cast_slice(values))
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> (usize, usize) {
        // keep every region 4-byte aligned
        while self.bytes.len() % 4 != 0 {
            self.bytes.push(0);
        }
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(bytes);
        (offset, bytes.len())
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// A triangle's worth of positions.
pub const TRIANGLE_POSITIONS: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

/// One mesh (a single indexed triangle), one node carrying it, one scene.
/// The starting point most tests tweak.
pub fn single_triangle_glb() -> Vec<u8> {
    let mut bin = BinBuilder::new();
    let (pos_off, pos_len) = bin.push_f32(&TRIANGLE_POSITIONS);
    let (idx_off, idx_len) = bin.push_u16(&[0, 1, 2]);
    let bin = bin.finish();
    let doc = json!({
        "asset": { "version": "2.0" },
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": pos_off, "byteLength": pos_len },
            { "buffer": 0, "byteOffset": idx_off, "byteLength": idx_len }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3" },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "meshes": [{
            "name": "triangle",
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }]
        }],
        "nodes": [{ "name": "root", "mesh": 0 }],
        "scenes": [{ "name": "main", "nodes": [0] }],
        "scene": 0
    });
    glb_bytes(&doc, &bin)
}

/// The end-to-end scenario from the loader's contract: root carrying mesh 0,
/// one child carrying mesh 1 translated by (1,0,0).
pub fn two_node_glb() -> Vec<u8> {
    let mut bin = BinBuilder::new();
    let (pos_off, pos_len) = bin.push_f32(&TRIANGLE_POSITIONS);
    let (idx_off, idx_len) = bin.push_u16(&[0, 1, 2]);
    let bin = bin.finish();
    let doc = json!({
        "asset": { "version": "2.0" },
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": pos_off, "byteLength": pos_len },
            { "buffer": 0, "byteOffset": idx_off, "byteLength": idx_len }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3" },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "meshes": [
            { "name": "m0", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] },
            { "name": "m1", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }
        ],
        "nodes": [
            { "name": "root", "mesh": 0, "children": [1] },
            { "name": "child", "mesh": 1, "translation": [1.0, 0.0, 0.0] }
        ],
        "scenes": [{ "nodes": [0] }],
        "scene": 0
    });
    glb_bytes(&doc, &bin)
}
