//! Typed decoding of accessor-described binary data.
//!
//! An accessor names a buffer view, a component type, an element type and a
//! count. Decoding resolves that chain against the [`ByteStore`], validates
//! every range before the first read, then applies one read routine per
//! accessor across all elements. Index accessors of any supported width are
//! normalized to `u32` so downstream code never sees the source width.

use crate::byte_store::ByteStore;
use crate::error::{AssetError, IndexKind, Result};
use crate::file_formats::gltf::{ComponentType, Document, ElementType};

/// A resolved, bounds-checked read plan over one accessor's bytes.
pub struct AccessorView<'a> {
    bytes: &'a [u8],
    count: usize,
    element_size: usize,
    stride: usize,
}

impl<'a> AccessorView<'a> {
    pub fn count(&self) -> usize {
        self.count
    }

    fn element(&self, i: usize) -> &'a [u8] {
        let start = i * self.stride;
        &self.bytes[start..start + self.element_size]
    }
}

/// Resolves accessor -> buffer view -> buffer and checks every invariant:
/// the accessor's elements (at the view's stride) must lie inside the view,
/// and the view inside its buffer.
pub fn view<'a>(doc: &Document, store: &'a ByteStore, accessor_index: usize) -> Result<AccessorView<'a>> {
    let accessor = doc
        .accessors
        .get(accessor_index)
        .ok_or_else(|| AssetError::invalid_index(IndexKind::Accessor, accessor_index, doc.accessors.len()))?;
    let buffer_view = doc
        .buffer_views
        .get(accessor.buffer_view)
        .ok_or_else(|| AssetError::invalid_index(IndexKind::BufferView, accessor.buffer_view, doc.buffer_views.len()))?;

    let element_size = accessor.element_size();
    let stride = buffer_view.byte_stride.unwrap_or(element_size);
    if stride < element_size {
        return Err(AssetError::malformed(format!(
            "accessor {accessor_index}: byteStride {stride} smaller than element size {element_size}"
        )));
    }

    let out_of_bounds = |len: usize| AssetError::OutOfBoundsAccess {
        context: format!("accessor {accessor_index} (buffer view {})", accessor.buffer_view),
        offset: accessor.byte_offset,
        len,
        available: buffer_view.byte_length,
    };

    // count, stride and offsets come straight from the document; the span
    // arithmetic must not wrap
    let span = match accessor.count {
        0 => 0,
        n => (n - 1)
            .checked_mul(stride)
            .and_then(|s| s.checked_add(element_size))
            .ok_or_else(|| out_of_bounds(usize::MAX))?,
    };
    let end = accessor
        .byte_offset
        .checked_add(span)
        .ok_or_else(|| out_of_bounds(span))?;
    if end > buffer_view.byte_length {
        return Err(out_of_bounds(span));
    }

    let start = buffer_view
        .byte_offset
        .checked_add(accessor.byte_offset)
        .ok_or_else(|| out_of_bounds(span))?;
    let bytes = store.slice(buffer_view.buffer, start, span)?;
    Ok(AccessorView {
        bytes,
        count: accessor.count,
        element_size,
        stride,
    })
}

/// Decodes a float attribute accessor into fixed-size arrays, e.g. a VEC3
/// accessor into `[f32; 3]`s. The accessor must declare `expected` as its
/// element type and 32-bit float components.
pub fn read_f32<const N: usize>(
    doc: &Document,
    store: &ByteStore,
    accessor_index: usize,
    expected: ElementType,
) -> Result<Vec<[f32; N]>> {
    let accessor = doc
        .accessors
        .get(accessor_index)
        .ok_or_else(|| AssetError::invalid_index(IndexKind::Accessor, accessor_index, doc.accessors.len()))?;
    if accessor.element_type != expected {
        return Err(AssetError::malformed(format!(
            "accessor {accessor_index}: expected {expected:?}, found {:?}",
            accessor.element_type
        )));
    }
    if accessor.component_type != ComponentType::Float {
        return Err(AssetError::UnsupportedComponentType {
            found: accessor.component_type as u16,
            context: "float attribute",
        });
    }

    let view = view(doc, store, accessor_index)?;
    let mut out = Vec::with_capacity(view.count());
    for i in 0..view.count() {
        let element = view.element(i);
        let mut value = [0f32; N];
        for (c, dst) in value.iter_mut().enumerate() {
            *dst = bytemuck::pod_read_unaligned(&element[c * 4..(c + 1) * 4]);
        }
        out.push(value);
    }
    Ok(out)
}

pub fn read_vec3(doc: &Document, store: &ByteStore, accessor_index: usize) -> Result<Vec<[f32; 3]>> {
    read_f32::<3>(doc, store, accessor_index, ElementType::Vec3)
}

pub fn read_vec2(doc: &Document, store: &ByteStore, accessor_index: usize) -> Result<Vec<[f32; 2]>> {
    read_f32::<2>(doc, store, accessor_index, ElementType::Vec2)
}

/// Decodes a scalar index accessor, dispatching once on the component type
/// and widening every element to `u32`.
pub fn read_indices(doc: &Document, store: &ByteStore, accessor_index: usize) -> Result<Vec<u32>> {
    let accessor = doc
        .accessors
        .get(accessor_index)
        .ok_or_else(|| AssetError::invalid_index(IndexKind::Accessor, accessor_index, doc.accessors.len()))?;
    if accessor.element_type != ElementType::Scalar {
        return Err(AssetError::malformed(format!(
            "accessor {accessor_index}: index accessor must be SCALAR, found {:?}",
            accessor.element_type
        )));
    }
    let component_type = accessor.component_type;

    let view = view(doc, store, accessor_index)?;
    let mut out = Vec::with_capacity(view.count());
    match component_type {
        ComponentType::UnsignedByte => {
            for i in 0..view.count() {
                out.push(view.element(i)[0] as u32);
            }
        }
        ComponentType::UnsignedShort => {
            for i in 0..view.count() {
                out.push(bytemuck::pod_read_unaligned::<u16>(view.element(i)) as u32);
            }
        }
        ComponentType::UnsignedInt => {
            for i in 0..view.count() {
                out.push(bytemuck::pod_read_unaligned::<u32>(view.element(i)));
            }
        }
        other => {
            return Err(AssetError::UnsupportedComponentType {
                found: other as u16,
                context: "index accessor",
            })
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_store::ByteStore;
    use crate::error::AssetError;
    use crate::file_formats::gltf::Document;

    fn doc(json: serde_json::Value) -> Document {
        serde_json::from_value(json).unwrap()
    }

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        bytemuck::cast_slice(values).to_vec()
    }

    #[test]
    fn reads_tightly_packed_vec3() {
        let store = ByteStore::new(vec![f32_bytes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 24 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 24 }],
            "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC3" }]
        }));
        let data = read_vec3(&doc, &store, 0).unwrap();
        assert_eq!(data, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn respects_byte_stride() {
        // two vec2 elements padded to 12-byte stride
        let mut bytes = f32_bytes(&[1.0, 2.0, 99.0]);
        bytes.extend(f32_bytes(&[3.0, 4.0, 99.0]));
        let store = ByteStore::new(vec![bytes]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 24 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 24, "byteStride": 12 }],
            "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC2" }]
        }));
        let data = read_vec2(&doc, &store, 0).unwrap();
        assert_eq!(data, vec![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn accessor_byte_offset_within_view() {
        let store = ByteStore::new(vec![f32_bytes(&[0.0, 1.0, 2.0, 3.0])]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 16 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 16 }],
            "accessors": [{ "bufferView": 0, "byteOffset": 8, "componentType": 5126, "count": 1, "type": "VEC2" }]
        }));
        let data = read_vec2(&doc, &store, 0).unwrap();
        assert_eq!(data, vec![[2.0, 3.0]]);
    }

    #[test]
    fn count_exceeding_view_is_out_of_bounds() {
        let store = ByteStore::new(vec![vec![0u8; 24]]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 24 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 24 }],
            "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3" }]
        }));
        assert!(matches!(
            read_vec3(&doc, &store, 0),
            Err(AssetError::OutOfBoundsAccess { .. })
        ));
    }

    #[test]
    fn huge_count_does_not_wrap_the_span() {
        // count * stride wraps a u64; the check must fail, not panic
        let store = ByteStore::new(vec![vec![0u8; 24]]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 24 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 24 }],
            "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 1537228672809129302u64, "type": "VEC3" }]
        }));
        assert!(matches!(
            read_vec3(&doc, &store, 0),
            Err(AssetError::OutOfBoundsAccess { .. })
        ));
    }

    #[test]
    fn huge_byte_offset_does_not_wrap() {
        let store = ByteStore::new(vec![vec![0u8; 24]]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 24 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 24 }],
            "accessors": [{ "bufferView": 0, "byteOffset": 18446744073709551615u64, "componentType": 5126, "count": 1, "type": "VEC3" }]
        }));
        assert!(matches!(
            read_vec3(&doc, &store, 0),
            Err(AssetError::OutOfBoundsAccess { .. })
        ));
    }

    #[test]
    fn view_exceeding_buffer_is_out_of_bounds() {
        let store = ByteStore::new(vec![vec![0u8; 8]]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 16 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 16 }],
            "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC2" }]
        }));
        assert!(matches!(
            read_vec2(&doc, &store, 0),
            Err(AssetError::OutOfBoundsAccess { .. })
        ));
    }

    #[test]
    fn index_widths_normalize_to_u32() {
        let u16_bytes: Vec<u8> = bytemuck::cast_slice(&[0u16, 1, 2]).to_vec();
        let u32_bytes: Vec<u8> = bytemuck::cast_slice(&[0u32, 1, 2]).to_vec();
        let store = ByteStore::new(vec![u16_bytes, u32_bytes]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 6 }, { "byteLength": 12 }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 6 },
                { "buffer": 1, "byteOffset": 0, "byteLength": 12 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5123, "count": 3, "type": "SCALAR" },
                { "bufferView": 1, "componentType": 5125, "count": 3, "type": "SCALAR" }
            ]
        }));
        let narrow = read_indices(&doc, &store, 0).unwrap();
        let wide = read_indices(&doc, &store, 1).unwrap();
        assert_eq!(narrow, wide);
        assert_eq!(narrow, vec![0u32, 1, 2]);
    }

    #[test]
    fn float_indices_are_unsupported() {
        let store = ByteStore::new(vec![f32_bytes(&[0.0, 1.0])]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 8 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 8 }],
            "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR" }]
        }));
        assert!(matches!(
            read_indices(&doc, &store, 0),
            Err(AssetError::UnsupportedComponentType { found: 5126, .. })
        ));
    }

    #[test]
    fn non_float_attribute_is_unsupported() {
        let store = ByteStore::new(vec![vec![0u8; 12]]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 12 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 12 }],
            "accessors": [{ "bufferView": 0, "componentType": 5123, "count": 2, "type": "VEC3" }]
        }));
        assert!(matches!(
            read_vec3(&doc, &store, 0),
            Err(AssetError::UnsupportedComponentType { .. })
        ));
    }

    #[test]
    fn dangling_buffer_view_reference() {
        let store = ByteStore::new(vec![vec![0u8; 4]]);
        let doc = doc(serde_json::json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 4 }],
            "bufferViews": [],
            "accessors": [{ "bufferView": 3, "componentType": 5126, "count": 1, "type": "SCALAR" }]
        }));
        assert!(matches!(
            view(&doc, &store, 0),
            Err(AssetError::InvalidIndex { .. })
        ));
    }
}
