//! Replay storage: `rkyv` + `zstd` compression for a recorded frame list.

use rkyv::rancor::Error;
use zstd::stream::{decode_all, encode_all};

use crate::frame::ReplayFrame;

/// zstd compression level (21 = maximum, best ratio).
pub const COMPRESSION_LEVEL: i32 = 21;

/// Serializes and compresses a recorded frame sequence.
pub fn compress(frames: &[ReplayFrame]) -> std::io::Result<Vec<u8>> {
    let bytes = rkyv::to_bytes::<Error>(frames)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("serialization error: {e}")))?;

    encode_all(&bytes[..], COMPRESSION_LEVEL)
}

/// Decompresses and deserializes a frame sequence produced by [`compress`].
pub fn decompress(compressed: &[u8]) -> std::io::Result<Vec<ReplayFrame>> {
    let bytes = decode_all(compressed)?;

    rkyv::from_bytes::<Vec<ReplayFrame>, Error>(&bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("deserialization error: {e}")))
}
