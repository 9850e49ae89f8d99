//! Segment files: the on-disk unit a commit produces.
//!
//! Layout (little-endian):
//!
//! ```text
//! magic    u32   "SIXS"
//! version  u32
//! checksum u32   CRC32 of the payload
//! length   u64   payload length in bytes
//! payload  [u8]  bincode-encoded SegmentData
//! ```
//!
//! A segment is written under a temporary name, synced, and renamed into
//! place, so readers only ever see complete files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::document::DocId;
use crate::error::{IndexerError, Result};

const SEGMENT_MAGIC: u32 = u32::from_le_bytes(*b"SIXS");
const SEGMENT_VERSION: u32 = 1;
const SEGMENT_PREFIX: &str = "seg_";
const SEGMENT_EXTENSION: &str = "seg";
const TEMP_EXTENSION: &str = "tmp";

/// One analyzed field of a committed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentField {
    /// Field name.
    pub name: String,
    /// Number of terms the field produced.
    pub length: u32,
    /// Distinct terms with their frequencies.
    pub terms: Vec<(String, u32)>,
    /// Original text, when the mapping stores the field.
    pub stored: Option<String>,
}

/// One committed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDocument {
    pub id: DocId,
    pub fields: Vec<SegmentField>,
}

/// Contents of one segment file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentData {
    /// Commit sequence number, starting at 1.
    pub sequence: u64,
    /// Commit time in milliseconds since the Unix epoch.
    pub committed_at_ms: i64,
    /// Documents in commit order.
    pub documents: Vec<SegmentDocument>,
}

/// File name of the segment with the given sequence number.
pub fn segment_file_name(sequence: u64) -> String {
    format!("{SEGMENT_PREFIX}{sequence:06}.{SEGMENT_EXTENSION}")
}

/// Parse a segment sequence number from a file name.
pub fn parse_segment_file_name(name: &str) -> Option<u64> {
    name.strip_prefix(SEGMENT_PREFIX)?
        .strip_suffix(&format!(".{SEGMENT_EXTENSION}"))?
        .parse()
        .ok()
}

/// List the segments in a directory, ordered by sequence number.
pub fn list_segments(dir: &Path) -> Result<Vec<(u64, PathBuf)>> {
    let mut segments = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(sequence) = name.to_str().and_then(parse_segment_file_name) {
            segments.push((sequence, entry.path()));
        }
    }
    segments.sort_unstable_by_key(|(sequence, _)| *sequence);
    Ok(segments)
}

/// Remove leftovers of interrupted segment writes.
pub fn remove_temp_files(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(TEMP_EXTENSION) {
            log::warn!("Removing incomplete segment file {}", path.display());
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Write a segment into `dir`, returning its final path.
pub fn write_segment(dir: &Path, segment: &SegmentData) -> Result<PathBuf> {
    let payload = bincode::serialize(segment)
        .map_err(|e| IndexerError::serialization(format!("Failed to encode segment: {e}")))?;
    let checksum = crc32fast::hash(&payload);

    let final_path = dir.join(segment_file_name(segment.sequence));
    let temp_path = dir.join(format!(
        ".{}.{}.{TEMP_EXTENSION}",
        segment_file_name(segment.sequence),
        uuid::Uuid::new_v4().simple()
    ));

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_u32::<LittleEndian>(SEGMENT_MAGIC)?;
        writer.write_u32::<LittleEndian>(SEGMENT_VERSION)?;
        writer.write_u32::<LittleEndian>(checksum)?;
        writer.write_u64::<LittleEndian>(payload.len() as u64)?;
        writer.write_all(&payload)?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| IndexerError::Io(e.into_error()))?
            .sync_all()?;
    }

    fs::rename(&temp_path, &final_path)?;
    Ok(final_path)
}

/// Read and verify a segment file.
pub fn read_segment(path: &Path) -> Result<SegmentData> {
    let mut reader = BufReader::new(File::open(path)?);

    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != SEGMENT_MAGIC {
        return Err(IndexerError::storage(format!(
            "{} is not a segment file",
            path.display()
        )));
    }
    let version = reader.read_u32::<LittleEndian>()?;
    if version != SEGMENT_VERSION {
        return Err(IndexerError::storage(format!(
            "{} has unsupported segment version {version}",
            path.display()
        )));
    }
    let checksum = reader.read_u32::<LittleEndian>()?;
    let length = reader.read_u64::<LittleEndian>()?;

    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    if payload.len() as u64 != length {
        return Err(IndexerError::storage(format!(
            "{} is truncated: expected {length} payload bytes, found {}",
            path.display(),
            payload.len()
        )));
    }
    if crc32fast::hash(&payload) != checksum {
        return Err(IndexerError::storage(format!(
            "{} failed checksum verification",
            path.display()
        )));
    }

    bincode::deserialize(&payload)
        .map_err(|e| IndexerError::serialization(format!("Failed to decode segment: {e}")))
}
