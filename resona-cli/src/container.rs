//! Framed container carrying raw i16 audio plus a JSON session payload.
//!
//! Layout (fixed 512-byte header, then audio):
//! - bytes 0..4    : magic `"fLaC"`
//! - bytes 4..8    : sample rate, big-endian u32
//! - byte  8       : bit depth (always 16 here)
//! - bytes 16/32/48: ASCII marker fields, 16 bytes each, space-padded
//! - bytes 128..512: JSON-encoded [`SessionInfo`], zero-padded
//! - bytes 512..   : samples as little-endian i16
//!
//! The engine never sees this layer; it consumes and produces raw sample
//! buffers. The session payload exists so a reverse run can regenerate the
//! exact pattern set that was embedded.

use serde::{Deserialize, Serialize};

/// Container magic, shared with the FLAC-ish framing this grew out of.
pub const MAGIC: [u8; 4] = *b"fLaC";

const HEADER_LEN: usize = 512;
const METADATA_OFFSET: usize = 128;
const MARKER_LEN: usize = 16;
const BIT_DEPTH: u8 = 16;

/// (text, offset) marker fields in the header.
const MARKERS: [(&str, usize); 3] = [("SESSION", 16), ("PATTERN", 32), ("SIGNATURE", 48)];

/// Free-form tag record carried opaquely in the metadata payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub signature: Option<String>,
}

/// Everything a reverse run needs to reproduce an embed session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub intensity: f32,
    pub seed: u64,
    pub chunk_size: u32,
    pub sample_rate: u32,
    pub channels: u16,
    pub tags: TagRecord,
}

/// Container decode/encode failures.
#[derive(Debug)]
pub enum ContainerError {
    /// The first four bytes did not match [`MAGIC`].
    BadMagic,
    /// Input shorter than the fixed header, or an odd audio byte count.
    Truncated,
    /// The JSON payload does not fit the metadata region.
    MetadataTooLarge(usize),
    /// The metadata region did not parse as a session payload.
    Metadata(serde_json::Error),
}

impl std::fmt::Display for ContainerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadMagic => write!(f, "bad container magic"),
            Self::Truncated => write!(f, "container truncated"),
            Self::MetadataTooLarge(len) => {
                write!(
                    f,
                    "metadata payload of {len} bytes exceeds {} available",
                    HEADER_LEN - METADATA_OFFSET
                )
            }
            Self::Metadata(e) => write!(f, "metadata payload invalid: {e}"),
        }
    }
}

impl std::error::Error for ContainerError {}

impl From<serde_json::Error> for ContainerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Metadata(e)
    }
}

/// Serialize `samples` plus `info` into container bytes.
pub fn encode(samples: &[i16], info: &SessionInfo) -> Result<Vec<u8>, ContainerError> {
    let payload = serde_json::to_vec(info)?;
    if payload.len() > HEADER_LEN - METADATA_OFFSET {
        return Err(ContainerError::MetadataTooLarge(payload.len()));
    }

    let mut out = vec![0u8; HEADER_LEN + samples.len() * 2];
    out[0..4].copy_from_slice(&MAGIC);
    out[4..8].copy_from_slice(&info.sample_rate.to_be_bytes());
    out[8] = BIT_DEPTH;

    for (text, pos) in MARKERS {
        let field = &mut out[pos..pos + MARKER_LEN];
        field.fill(b' ');
        field[..text.len()].copy_from_slice(text.as_bytes());
    }

    out[METADATA_OFFSET..METADATA_OFFSET + payload.len()].copy_from_slice(&payload);

    for (i, s) in samples.iter().enumerate() {
        let at = HEADER_LEN + i * 2;
        out[at..at + 2].copy_from_slice(&s.to_le_bytes());
    }

    Ok(out)
}

/// Parse container bytes back into samples and session info.
pub fn decode(bytes: &[u8]) -> Result<(Vec<i16>, SessionInfo), ContainerError> {
    if bytes.len() < HEADER_LEN {
        return Err(ContainerError::Truncated);
    }
    if bytes[0..4] != MAGIC {
        return Err(ContainerError::BadMagic);
    }

    let metadata = &bytes[METADATA_OFFSET..HEADER_LEN];
    let end = metadata
        .iter()
        .position(|b| *b == 0)
        .unwrap_or(metadata.len());
    let info: SessionInfo = serde_json::from_slice(&metadata[..end])?;

    let audio = &bytes[HEADER_LEN..];
    if audio.len() % 2 != 0 {
        return Err(ContainerError::Truncated);
    }
    let samples = audio
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();

    Ok((samples, info))
}
