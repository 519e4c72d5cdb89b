//! Binary glTF (.glb) container reader.
//!
//! Layout: a 12-byte header (magic, version, total length), then a JSON chunk
//! and an optional binary chunk, each prefixed with a length and a type tag.
//! All integers are little-endian.

use std::io::Read;

use crate::error::{AssetError, Result};

pub const MAGIC: [u8; 4] = *b"glTF";
pub const VERSION: u32 = 2;

const CHUNK_JSON: [u8; 4] = *b"JSON";
const CHUNK_BIN: [u8; 4] = *b"BIN\0";

/// The two chunks of a .glb file, still undecoded.
#[derive(Debug)]
pub struct Glb {
    pub json: String,
    pub binary: Vec<u8>,
}

fn read_bytes(reader: &mut impl Read, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            AssetError::malformed(format!("truncated {what}"))
        } else {
            AssetError::Io(e)
        }
    })
}

fn read_u32(reader: &mut impl Read, what: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_bytes(reader, &mut buf, what)?;
    Ok(u32::from_le_bytes(buf))
}

/// Reads one `(length, type, payload)` chunk, charging it against the byte
/// budget left under the header's declared total length. Returns `None` on
/// clean EOF at the chunk boundary.
fn read_chunk(reader: &mut impl Read, remaining: &mut u64) -> Result<Option<([u8; 4], Vec<u8>)>> {
    let mut length_buffer = [0u8; 4];
    match reader.read_exact(&mut length_buffer) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(AssetError::Io(e)),
    }
    let chunk_length = u64::from(u32::from_le_bytes(length_buffer));

    let mut chunk_type = [0u8; 4];
    read_bytes(reader, &mut chunk_type, "chunk header")?;

    *remaining = remaining
        .checked_sub(8 + chunk_length)
        .ok_or_else(|| AssetError::malformed("chunk length exceeds declared file length"))?;

    // read through `take` rather than pre-allocating the declared length
    let mut payload = Vec::new();
    reader
        .take(chunk_length)
        .read_to_end(&mut payload)
        .map_err(AssetError::Io)?;
    if payload.len() as u64 != chunk_length {
        return Err(AssetError::malformed("truncated chunk payload"));
    }
    Ok(Some((chunk_type, payload)))
}

impl Glb {
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_bytes(&mut reader, &mut magic, "glb header")?;
        if magic != MAGIC {
            return Err(AssetError::malformed("bad magic, not a glb file"));
        }

        let version = read_u32(&mut reader, "glb header")?;
        if version != VERSION {
            return Err(AssetError::malformed(format!(
                "unsupported glb version {version}"
            )));
        }

        // Total file length; chunks must fit inside it.
        let length = read_u32(&mut reader, "glb header")?;
        let mut remaining = u64::from(length).saturating_sub(12);

        let (chunk_type, json_bytes) = read_chunk(&mut reader, &mut remaining)?
            .ok_or_else(|| AssetError::malformed("missing JSON chunk"))?;
        if chunk_type != CHUNK_JSON {
            return Err(AssetError::malformed("first chunk is not JSON"));
        }
        let json = String::from_utf8(json_bytes)
            .map_err(|_| AssetError::malformed("JSON chunk is not valid utf-8"))?;

        let binary = match read_chunk(&mut reader, &mut remaining)? {
            Some((ty, payload)) if ty == CHUNK_BIN => payload,
            // Unknown chunk types after JSON are permitted by the format and
            // skipped; with no BIN chunk the store holds no buffer.
            _ => Vec::new(),
        };

        Ok(Self { json, binary })
    }
}
