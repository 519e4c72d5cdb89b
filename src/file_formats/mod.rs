pub mod glb;
pub mod gltf;
