//! Raw byte buffers of one loaded asset. Built once at load time, immutable
//! afterwards; every read goes through a bounds-checked slice.

use std::path::Path;

use crate::error::{AssetError, IndexKind, Result};
use crate::file_formats::gltf::Document;

#[derive(Debug, Default)]
pub struct ByteStore {
    buffers: Vec<Vec<u8>>,
}

impl ByteStore {
    pub fn new(buffers: Vec<Vec<u8>>) -> Self {
        Self { buffers }
    }

    /// The GLB binary chunk is buffer 0 and the only buffer the container may
    /// declare. The chunk may be padded, so the declared length is a lower
    /// bound check against the payload. A chunk the document never declares
    /// is dropped, so no view can reach undeclared bytes.
    pub fn from_glb(doc: &Document, binary: Vec<u8>) -> Result<Self> {
        if doc.buffers.len() > 1 {
            return Err(AssetError::malformed(format!(
                "glb container declares {} buffers, expected at most one",
                doc.buffers.len()
            )));
        }
        let buffers = match doc.buffers.first() {
            Some(buffer) => {
                if buffer.uri.is_some() {
                    return Err(AssetError::malformed(
                        "glb buffer 0 must not carry a uri",
                    ));
                }
                if buffer.byte_length > binary.len() {
                    return Err(AssetError::malformed(format!(
                        "glb buffer declares {} bytes but the binary chunk holds {}",
                        buffer.byte_length,
                        binary.len()
                    )));
                }
                vec![binary]
            }
            None => Vec::new(),
        };
        Ok(Self { buffers })
    }

    /// Text-form documents reference external buffer files relative to the
    /// document's directory.
    pub fn from_external(doc: &Document, base_dir: &Path) -> Result<Self> {
        let mut buffers = Vec::with_capacity(doc.buffers.len());
        for (i, buffer) in doc.buffers.iter().enumerate() {
            let uri = buffer.uri.as_ref().ok_or_else(|| {
                AssetError::malformed(format!("buffer {i} has no uri and no binary chunk"))
            })?;
            if uri.starts_with("data:") {
                return Err(AssetError::malformed(format!(
                    "buffer {i}: data uris are not supported"
                )));
            }
            let bytes = std::fs::read(base_dir.join(uri))?;
            if bytes.len() < buffer.byte_length {
                return Err(AssetError::malformed(format!(
                    "buffer {i} file {uri:?} holds {} bytes, declared {}",
                    bytes.len(),
                    buffer.byte_length
                )));
            }
            buffers.push(bytes);
        }
        Ok(Self { buffers })
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer_len(&self, buffer: usize) -> Option<usize> {
        self.buffers.get(buffer).map(|b| b.len())
    }

    pub fn slice(&self, buffer: usize, offset: usize, len: usize) -> Result<&[u8]> {
        let buf = self.buffers.get(buffer).ok_or_else(|| {
            AssetError::invalid_index(IndexKind::Buffer, buffer, self.buffers.len())
        })?;
        let end = offset.checked_add(len).ok_or_else(|| AssetError::OutOfBoundsAccess {
            context: format!("buffer {buffer}"),
            offset,
            len,
            available: buf.len(),
        })?;
        if end > buf.len() {
            return Err(AssetError::OutOfBoundsAccess {
                context: format!("buffer {buffer}"),
                offset,
                len,
                available: buf.len(),
            });
        }
        Ok(&buf[offset..end])
    }
}
