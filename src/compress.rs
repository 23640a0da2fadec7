//! Compression acceptance policy.
//!
//! Content is stored gzip-compressed only when that pays: tiny inputs are
//! skipped outright and a compressed result is kept only if it shrinks the
//! content by at least 20%. The gzip header carries the file's base name and
//! modification time so external tools inspecting the container see correct
//! metadata.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::{Compression, GzBuilder};

use crate::Result;

/// Content shorter than this is never compressed; container overhead and
/// per-request decompression would dominate any saving.
pub const MIN_COMPRESS_LEN: usize = 1024;

/// Compress `data`, returning the gzip container only when it is worth
/// keeping: at most 80% of the raw length. `None` means store raw.
///
/// Compressor failure is a hard error, not a raw fallback: a build that
/// asked for compression should not silently produce an uncompressed store.
pub(crate) fn gzip_policy(
    data: &[u8],
    level: Compression,
    name: &str,
    modified: SystemTime,
) -> Result<Option<Vec<u8>>> {
    if level == Compression::none() || data.len() < MIN_COMPRESS_LEN {
        return Ok(None);
    }

    let mtime = modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u32::try_from(d.as_secs()).ok())
        .unwrap_or(0);
    let mut encoder = GzBuilder::new()
        .filename(name)
        .mtime(mtime)
        .write(Vec::with_capacity(data.len()), level);
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;

    if 5 * compressed.len() as u64 <= 4 * data.len() as u64 {
        Ok(Some(compressed))
    } else {
        Ok(None)
    }
}

pub(crate) fn crc32(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
