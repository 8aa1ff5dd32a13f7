//! edge_values.bin - lookup manifest plus every edge record
//!
//! Format (little-endian):
//!
//! Header (24 bytes):
//!   magic:           u32 = 0x45564c4b  // "EVLK"
//!   version:         u16 = 1
//!   reserved:        u16 = 0
//!   manifest_len:    u32
//!   edge_count:      u64
//!   words_per_edge:  u32
//!
//! Manifest (manifest_len bytes):
//!   JSON of the encoded value lookup
//!
//! Body (edge_count * words_per_edge words):
//!   u32 record words, edge after edge
//!
//! Footer (16 bytes):
//!   body_crc64:  u64
//!   file_crc64:  u64  // header + manifest + body

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use super::crc::{checksum, Digest};
use crate::edges::EdgeStore;
use crate::error::EvError;
use crate::ev::EncodedValueLookup;

const MAGIC: u32 = 0x45564c4b; // "EVLK"
const VERSION: u16 = 1;
const HEADER_SIZE: usize = 24; // 4 + 2 + 2 + 4 + 8 + 4
const FOOTER_SIZE: usize = 16;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid magic: expected 0x{expected:08x}, got 0x{found:08x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("unsupported version {0}")]
    UnsupportedVersion(u16),

    #[error("size mismatch: expected {expected} bytes, got {actual} bytes")]
    Truncated { expected: u64, actual: u64 },

    #[error("{section} checksum mismatch: stored 0x{stored:016x}, computed 0x{computed:016x}")]
    ChecksumMismatch {
        section: &'static str,
        stored: u64,
        computed: u64,
    },

    #[error("manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("manifest declares {manifest} words per edge, header {header}")]
    LayoutMismatch { manifest: usize, header: usize },

    #[error(transparent)]
    Lookup(#[from] EvError),
}

type Result<T> = std::result::Result<T, FormatError>;

/// Summary returned by [`verify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub edge_count: u64,
    pub words_per_edge: usize,
    pub encoded_values: usize,
    pub bytes: u64,
}

fn too_large(what: &str) -> FormatError {
    FormatError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("{what} does not fit the header field"),
    ))
}

fn encode_header(manifest_len: usize, edge_count: usize, words_per_edge: usize) -> Result<Vec<u8>> {
    let manifest_len = u32::try_from(manifest_len).map_err(|_| too_large("manifest length"))?;
    let words_per_edge = u32::try_from(words_per_edge).map_err(|_| too_large("words per edge"))?;

    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(&MAGIC.to_le_bytes());
    header.extend_from_slice(&VERSION.to_le_bytes());
    header.extend_from_slice(&0u16.to_le_bytes()); // reserved
    header.extend_from_slice(&manifest_len.to_le_bytes());
    header.extend_from_slice(&(edge_count as u64).to_le_bytes());
    header.extend_from_slice(&words_per_edge.to_le_bytes());
    debug_assert_eq!(header.len(), HEADER_SIZE);
    Ok(header)
}

/// Write lookup and records to `path`
pub fn write<P: AsRef<Path>>(path: P, lookup: &EncodedValueLookup, store: &EdgeStore) -> Result<()> {
    if lookup.words_per_edge() != store.words_per_edge() {
        return Err(FormatError::LayoutMismatch {
            manifest: lookup.words_per_edge(),
            header: store.words_per_edge(),
        });
    }

    let manifest = serde_json::to_vec(lookup)?;
    let header = encode_header(manifest.len(), store.len(), store.words_per_edge())?;

    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    let mut body_digest = Digest::new();
    let mut file_digest = Digest::new();
    file_digest.update(&header);
    file_digest.update(&manifest);

    writer.write_all(&header)?;
    writer.write_all(&manifest)?;
    for word in store.as_words() {
        writer.write_all(&word.to_le_bytes())?;
    }
    body_digest.update_words(store.as_words());
    file_digest.update_words(store.as_words());

    writer.write_all(&body_digest.finalize().to_le_bytes())?;
    writer.write_all(&file_digest.finalize().to_le_bytes())?;
    writer.flush()?;

    info!(
        path = %path.as_ref().display(),
        edges = store.len(),
        words_per_edge = store.words_per_edge(),
        "Wrote edge values"
    );
    Ok(())
}

fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn u64_at(buf: &[u8], at: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(b)
}

/// Read a snapshot, checking structure and both checksums
pub fn read<P: AsRef<Path>>(path: P) -> Result<(EncodedValueLookup, EdgeStore)> {
    let data = std::fs::read(path.as_ref())?;
    let actual = data.len() as u64;
    if data.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(FormatError::Truncated {
            expected: (HEADER_SIZE + FOOTER_SIZE) as u64,
            actual,
        });
    }

    let magic = u32_at(&data, 0);
    if magic != MAGIC {
        return Err(FormatError::BadMagic {
            expected: MAGIC,
            found: magic,
        });
    }
    let version = u16_at(&data, 4);
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    let manifest_len = u32_at(&data, 8) as u64;
    let edge_count = u64_at(&data, 12);
    let words_per_edge = u32_at(&data, 20) as u64;

    let body_len = edge_count
        .checked_mul(words_per_edge)
        .and_then(|w| w.checked_mul(4));
    let expected = body_len
        .and_then(|b| b.checked_add(HEADER_SIZE as u64 + FOOTER_SIZE as u64 + manifest_len));
    let (Some(body_len), Some(expected)) = (body_len, expected) else {
        return Err(FormatError::Truncated {
            expected: u64::MAX,
            actual,
        });
    };
    if expected != actual {
        return Err(FormatError::Truncated { expected, actual });
    }

    let manifest_end = HEADER_SIZE + manifest_len as usize;
    let body_end = manifest_end + body_len as usize;
    let body = &data[manifest_end..body_end];

    let stored_body = u64_at(&data, body_end);
    let stored_file = u64_at(&data, body_end + 8);
    let computed_body = checksum(body);
    if computed_body != stored_body {
        return Err(FormatError::ChecksumMismatch {
            section: "body",
            stored: stored_body,
            computed: computed_body,
        });
    }
    let computed_file = checksum(&data[..body_end]);
    if computed_file != stored_file {
        return Err(FormatError::ChecksumMismatch {
            section: "file",
            stored: stored_file,
            computed: computed_file,
        });
    }

    let lookup: EncodedValueLookup = serde_json::from_slice(&data[HEADER_SIZE..manifest_end])?;
    if lookup.words_per_edge() as u64 != words_per_edge {
        return Err(FormatError::LayoutMismatch {
            manifest: lookup.words_per_edge(),
            header: words_per_edge as usize,
        });
    }
    lookup.check_disjoint()?;

    let words: Vec<u32> = body
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let store = EdgeStore::from_words(words_per_edge as usize, edge_count as usize, words).ok_or(
        FormatError::Truncated {
            expected,
            actual,
        },
    )?;
    Ok((lookup, store))
}

/// Verify a snapshot and summarise it
pub fn verify<P: AsRef<Path>>(path: P) -> Result<SnapshotInfo> {
    let bytes = std::fs::metadata(path.as_ref())?.len();
    let (lookup, store) = read(path)?;
    Ok(SnapshotInfo {
        edge_count: store.len() as u64,
        words_per_edge: store.words_per_edge(),
        encoded_values: lookup.len(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = encode_header(100, 7, 3).unwrap();
        assert_eq!(header.len(), HEADER_SIZE);
        assert_eq!(u32_at(&header, 0), MAGIC);
        assert_eq!(u16_at(&header, 4), VERSION);
        assert_eq!(u32_at(&header, 8), 100);
        assert_eq!(u64_at(&header, 12), 7);
        assert_eq!(u32_at(&header, 20), 3);
    }

    #[test]
    fn test_rejects_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge_values.bin");
        std::fs::write(&path, [0u8; 10]).unwrap();
        assert!(matches!(read(&path), Err(FormatError::Truncated { .. })));
    }

    #[test]
    fn test_rejects_foreign_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge_values.bin");
        std::fs::write(&path, [0xffu8; 64]).unwrap();
        assert!(matches!(read(&path), Err(FormatError::BadMagic { .. })));
    }
}
