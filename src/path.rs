//! Canonical path handling.
//!
//! Index keys are slash-separated, rooted, and carry no trailing slash
//! (except the root itself). Request paths are cleaned, never rejected.

use crate::{Error, Result};

pub const ROOT: &str = "/";

/// Canonicalize a request path: root it and collapse dot segments.
///
/// `..` never escapes the root. The result has no trailing slash unless it
/// is the root itself, so `/a/` and `/a` clean to the same key.
pub fn clean(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    if segments.is_empty() {
        return ROOT.to_string();
    }
    let mut out = String::with_capacity(path.len());
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

/// Parent directory of a canonical path. The root is its own parent.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => ROOT,
        Some(idx) => &path[..idx],
    }
}

/// Final path segment of a canonical path.
pub fn base_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Validate a creation path. Serving cleans paths instead; this is the
/// strict check for writers, where a bad path is a caller bug.
pub fn validate(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(Error::InvalidPath("must be rooted"));
    }
    if path.len() == 1 {
        return Err(Error::InvalidPath("root is not a file"));
    }
    if path.contains('\0') {
        return Err(Error::InvalidPath("contains NUL"));
    }
    for segment in path[1..].split('/') {
        match segment {
            "" => return Err(Error::InvalidPath("empty segment")),
            "." | ".." => return Err(Error::InvalidPath("dot segment")),
            _ => {}
        }
    }
    Ok(())
}
