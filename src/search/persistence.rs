//! On-disk artifacts: the vector index file and the metadata snapshot.
//!
//! Index layout (little-endian):
//!
//! ```text
//! magic "FFIX" | version u32 | dims u32 | rows u32 | rows * dims f16
//! ```
//!
//! The metadata snapshot is a JSON array of records in index row order.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use half::f16;

use crate::core::Record;
use crate::error::{FfError, Result};
use crate::search::embeddings::FlatIndex;

const INDEX_MAGIC: &[u8; 4] = b"FFIX";
const INDEX_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Serialize an index to `path`, replacing any existing file.
pub fn write_index(path: &Path, index: &FlatIndex) -> Result<()> {
    let dims = u32::try_from(index.dims())
        .map_err(|_| FfError::Index(format!("dimension {} too large", index.dims())))?;
    let rows = u32::try_from(index.len())
        .map_err(|_| FfError::Index(format!("row count {} too large", index.len())))?;

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(INDEX_MAGIC)?;
    writer.write_all(&INDEX_VERSION.to_le_bytes())?;
    writer.write_all(&dims.to_le_bytes())?;
    writer.write_all(&rows.to_le_bytes())?;
    for row in index.rows() {
        writer.write_all(&encode_row_f16(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read an index written by [`write_index`].
pub fn read_index(path: &Path) -> Result<FlatIndex> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut header = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header)
        .map_err(|err| FfError::Index(format!("{}: truncated header: {err}", path.display())))?;

    if &header[..4] != INDEX_MAGIC {
        return Err(FfError::Index(format!(
            "{}: not an index file",
            path.display()
        )));
    }
    let version = read_u32(&header[4..8]);
    if version != INDEX_VERSION {
        return Err(FfError::Index(format!(
            "{}: unsupported index version {version}",
            path.display()
        )));
    }
    let dims = read_u32(&header[8..12]) as usize;
    let rows = read_u32(&header[12..16]) as usize;
    if dims == 0 {
        return Err(FfError::Index(format!("{}: zero dimension", path.display())));
    }

    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    let expected = rows.saturating_mul(dims).saturating_mul(2);
    if body.len() != expected {
        return Err(FfError::Index(format!(
            "{}: body length mismatch: expected {expected}, got {}",
            path.display(),
            body.len()
        )));
    }

    let mut index = FlatIndex::new(dims);
    for chunk in body.chunks_exact(dims * 2) {
        index.add(&decode_row_f16(chunk, dims)?)?;
    }
    Ok(index)
}

/// Write the metadata snapshot as a JSON array.
pub fn write_metadata(path: &Path, records: &[Record]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn read_metadata(path: &Path) -> Result<Vec<Record>> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|err| FfError::Metadata(format!("{}: {err}", path.display())))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn encode_row_f16(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 2);
    for value in values {
        let bits = f16::from_f32(*value).to_bits();
        out.extend_from_slice(&bits.to_le_bytes());
    }
    out
}

fn decode_row_f16(bytes: &[u8], dims: usize) -> Result<Vec<f32>> {
    let expected = dims.saturating_mul(2);
    if bytes.len() != expected {
        return Err(FfError::Index(format!(
            "row length mismatch: expected {}, got {}",
            expected,
            bytes.len()
        )));
    }

    let mut out = Vec::with_capacity(dims);
    for chunk in bytes.chunks_exact(2) {
        let bits = u16::from_le_bytes([chunk[0], chunk[1]]);
        out.push(f16::from_bits(bits).to_f32());
    }
    Ok(out)
}
