//! Serde types for the JSON part of a glTF 2.0 document, restricted to the
//! sections this crate models: buffers, buffer views, accessors, meshes,
//! nodes and scenes. Unknown fields and unknown top-level sections
//! (materials, animations, ...) deserialize without error and are ignored.

use std::collections::HashMap;

use serde::Deserialize;
use serde_repr::Deserialize_repr;

use crate::error::Result;

#[derive(Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ComponentType {
    SignedByte = 5120,
    UnsignedByte = 5121,
    SignedShort = 5122,
    UnsignedShort = 5123,
    UnsignedInt = 5125,
    Float = 5126,
}

impl ComponentType {
    // size in bytes
    pub fn size(self) -> usize {
        match self {
            ComponentType::SignedByte | ComponentType::UnsignedByte => 1,
            ComponentType::SignedShort | ComponentType::UnsignedShort => 2,
            ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    #[serde(rename = "SCALAR")]
    Scalar,
    #[serde(rename = "VEC2")]
    Vec2,
    #[serde(rename = "VEC3")]
    Vec3,
    #[serde(rename = "VEC4")]
    Vec4,
    #[serde(rename = "MAT2")]
    Mat2,
    #[serde(rename = "MAT3")]
    Mat3,
    #[serde(rename = "MAT4")]
    Mat4,
}

impl ElementType {
    pub fn component_count(self) -> usize {
        match self {
            ElementType::Scalar => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 => 4,
            ElementType::Mat2 => 4,
            ElementType::Mat3 => 9,
            ElementType::Mat4 => 16,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Accessor {
    #[serde(rename = "bufferView")]
    pub buffer_view: usize,
    #[serde(rename = "byteOffset", default)]
    pub byte_offset: usize,
    #[serde(rename = "componentType")]
    pub component_type: ComponentType,
    pub count: usize,
    #[serde(rename = "type")]
    pub element_type: ElementType,
}

impl Accessor {
    /// Tightly packed size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.component_type.size() * self.element_type.component_count()
    }
}

#[derive(Deserialize, Debug)]
pub struct BufferView {
    pub buffer: usize,
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    #[serde(rename = "byteOffset", default)]
    pub byte_offset: usize,
    #[serde(rename = "byteStride")]
    pub byte_stride: Option<usize>,
}

#[derive(Deserialize, Debug)]
pub struct Buffer {
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    pub uri: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PrimitiveAttributes {
    #[serde(rename = "POSITION")]
    pub position: Option<usize>,
    #[serde(rename = "NORMAL")]
    pub normal: Option<usize>,
    #[serde(rename = "TEXCOORD_0")]
    pub texcoord_0: Option<usize>,

    /* The rest of the semantics (TANGENT, COLOR_n, JOINTS_n, WEIGHTS_n, ...)
     * all map to accessor indices; collect them so documents that carry them
     * still parse. */
    #[serde(flatten)]
    pub additional: HashMap<String, usize>,
}

#[derive(Deserialize, Debug)]
pub struct Primitive {
    pub attributes: PrimitiveAttributes,
    pub indices: Option<usize>,
    pub mode: Option<u32>,
}

#[derive(Deserialize, Debug)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Deserialize, Debug)]
pub struct Node {
    pub name: Option<String>,
    pub mesh: Option<usize>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub matrix: Option<[f32; 16]>,
    pub children: Option<Vec<usize>>,
}

#[derive(Deserialize, Debug)]
pub struct Scene {
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<usize>,
}

#[derive(Deserialize, Debug)]
pub struct Asset {
    pub version: String,
    pub generator: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Document {
    pub asset: Asset,
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(rename = "bufferViews", default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(default)]
    pub buffers: Vec<Buffer>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    pub scene: Option<usize>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
