//! Loader collaborator: the walkable tree a store is populated from.
//!
//! The store needs exactly three things from a source: list the immediate
//! children of a directory, open a leaf for streaming, and know a leaf's
//! modification time. The tree is walked once per load.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::{Error, Result};

/// One child of a source directory.
pub struct SourceEntry {
    pub name: String,
    pub is_dir: bool,
    pub modified: SystemTime,
}

/// A walkable tree of files to load. Paths are canonical and rooted, the
/// same shape the store indexes under.
pub trait Source {
    /// Immediate children of `dir`, in the order they should be inserted.
    fn read_dir(&self, dir: &str) -> Result<Vec<SourceEntry>>;

    /// Open a leaf for streaming.
    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>>;

    /// MIME type for a leaf, if the source knows one.
    fn mime(&self, _path: &str) -> Option<String> {
        None
    }
}

/// `Source` over a directory on disk. Children are listed in lexical order,
/// so a load produces the depth-first insertion order the index favors.
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> DiskSource {
        DiskSource { root: root.into() }
    }

    fn locate(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Source for DiskSource {
    fn read_dir(&self, dir: &str) -> Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.locate(dir))? {
            let entry = entry?;
            let meta = entry.metadata()?;
            let name = entry
                .file_name()
                .into_string()
                .map_err(|_| Error::InvalidPath("non-utf8 file name"))?;
            entries.push(SourceEntry {
                name,
                is_dir: meta.is_dir(),
                modified: meta.modified()?,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(fs::File::open(self.locate(path))?))
    }

    fn mime(&self, path: &str) -> Option<String> {
        mime_from_extension(path).map(str::to_string)
    }
}

/// Extension lookup for the common static-site types. Anything else is
/// served without a Content-Type; richer detection belongs to the caller.
pub fn mime_from_extension(path: &str) -> Option<&'static str> {
    let (_, ext) = path.rsplit_once('.')?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "css" => "text/css; charset=utf-8",
        "gif" => "image/gif",
        "htm" | "html" => "text/html; charset=utf-8",
        "ico" => "image/x-icon",
        "jpeg" | "jpg" => "image/jpeg",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "txt" => "text/plain; charset=utf-8",
        "wasm" => "application/wasm",
        "webp" => "image/webp",
        "xml" => "text/xml; charset=utf-8",
        _ => return None,
    };
    Some(mime)
}
