//! The object/directory index.
//!
//! A store is built in a single-writer phase (`&mut self` methods) and then
//! served read-only; `&self` methods are safe from any number of threads
//! because nothing mutates. That split is the caller contract from the
//! borrow checker, not a runtime lock.
//!
//! Directories are implicit: they exist because some file path passes
//! through them. Inserting `/a/b/c.txt` guarantees `/`, `/a` and `/a/b` are
//! all present and list their respective child.

use std::collections::HashMap;
use std::io::Read;
use std::time::SystemTime;

use flate2::Compression;
use log::debug;

use crate::compress;
use crate::object::{Metadata, Object, Resolved};
use crate::path;
use crate::reader::{Handle, Mode};
use crate::source::Source;
use crate::{Error, Result};

pub struct Store {
    pub(crate) objects: HashMap<String, Object>,
    pub(crate) dirs: HashMap<String, Vec<String>>,
}

impl Store {
    /// An empty store containing only the root directory.
    pub fn new() -> Store {
        let mut dirs = HashMap::new();
        dirs.insert(path::ROOT.to_string(), Vec::new());
        Store {
            objects: HashMap::new(),
            dirs,
        }
    }

    /// Load every file of a source tree, stored raw.
    pub fn load(source: &dyn Source) -> Result<Store> {
        Self::load_compressed(source, Compression::none())
    }

    /// Load every file of a source tree, gzip-compressing at `level` those
    /// files the acceptance policy keeps.
    pub fn load_compressed(source: &dyn Source, level: Compression) -> Result<Store> {
        let mut store = Store::new();
        store.load_dir(source, path::ROOT, level)?;
        debug!(
            "loaded {} objects in {} directories",
            store.objects.len(),
            store.dirs.len()
        );
        Ok(store)
    }

    fn load_dir(&mut self, source: &dyn Source, dir: &str, level: Compression) -> Result<()> {
        for entry in source.read_dir(dir)? {
            let child = if dir == path::ROOT {
                format!("/{}", entry.name)
            } else {
                format!("{dir}/{}", entry.name)
            };
            if entry.is_dir {
                self.load_dir(source, &child, level)?;
            } else {
                let mut content = source.open(&child)?;
                let mime = source.mime(&child);
                self.create_compressed(&child, mime.as_deref(), entry.modified, &mut content, level)?;
            }
        }
        Ok(())
    }

    /// Create a file stored raw. Overwrites an existing file at the same
    /// path, but never a directory.
    pub fn create(
        &mut self,
        file_path: &str,
        mime: Option<&str>,
        modified: SystemTime,
        content: impl Read,
    ) -> Result<()> {
        self.create_compressed(file_path, mime, modified, content, Compression::none())
    }

    /// Create a file, keeping a gzip representation when the acceptance
    /// policy says it pays. Either the object and all its directory links
    /// are installed, or the store is unchanged.
    pub fn create_compressed(
        &mut self,
        file_path: &str,
        mime: Option<&str>,
        modified: SystemTime,
        mut content: impl Read,
        level: Compression,
    ) -> Result<()> {
        path::validate(file_path)?;
        if self.dirs.contains_key(file_path) {
            return Err(Error::AlreadyExists);
        }

        let mut data = Vec::new();
        content.read_to_end(&mut data)?;
        let checksum = compress::crc32(&data);
        let size = data.len() as u64;
        let name = path::base_name(file_path).to_string();

        let stored = match compress::gzip_policy(&data, level, &name, modified)? {
            Some(container) => container,
            None => data,
        };
        debug!(
            "create {file_path}: {size} bytes, stored {} ({})",
            stored.len(),
            if stored.len() as u64 != size { "gzip" } else { "raw" },
        );

        self.put(
            file_path.to_string(),
            Object {
                name,
                data: stored,
                size,
                modified,
                mime: mime.map(str::to_string),
                checksum: Some(checksum),
            },
            false,
        )
    }

    /// Append an already-encoded object, bypassing the compression policy.
    ///
    /// Intended for build-time code generators that pre-compress content.
    /// `stored` is trusted: if its length differs from `size` it must be a
    /// gzip container decoding to exactly `size` bytes. Calls must arrive
    /// in depth-first tree-walk order; an out-of-order path is rejected
    /// before anything changes.
    pub fn append_prebuilt(
        &mut self,
        file_path: &str,
        mime: Option<&str>,
        modified: SystemTime,
        checksum: Option<u32>,
        size: u64,
        stored: Vec<u8>,
    ) -> Result<()> {
        path::validate(file_path)?;
        if self.dirs.contains_key(file_path) {
            return Err(Error::AlreadyExists);
        }
        self.put(
            file_path.to_string(),
            Object {
                name: path::base_name(file_path).to_string(),
                data: stored,
                size,
                modified,
                mime: mime.map(str::to_string),
                checksum,
            },
            true,
        )
    }

    /// Install an object and link it into every ancestor directory.
    ///
    /// The walk starts at the immediate parent and stops at the first
    /// ancestor that already lists the child; everything above is already
    /// linked. `ordered` switches the duplicate check from a linear scan to
    /// a last-entry comparison, valid only for depth-first insertion order
    /// (which is validated, not trusted).
    fn put(&mut self, file_path: String, object: Object, ordered: bool) -> Result<()> {
        if ordered {
            self.check_order(&file_path)?;
        }
        self.objects.insert(file_path.clone(), object);

        let mut child = file_path;
        loop {
            let dir = path::parent(&child).to_string();
            let list = self.dirs.entry(dir.clone()).or_default();
            let present = if ordered {
                list.last() == Some(&child)
            } else {
                list.iter().any(|entry| entry == &child)
            };
            if present {
                break;
            }
            list.push(child);
            if dir == path::ROOT {
                break;
            }
            child = dir;
        }
        Ok(())
    }

    /// Depth-first order makes every directory's child list lexically
    /// increasing, so a new link is valid iff it sorts at or after the
    /// current last entry — at every ancestor level the walk would touch.
    fn check_order(&self, file_path: &str) -> Result<()> {
        let mut child = file_path;
        loop {
            let dir = path::parent(child);
            if let Some(last) = self.dirs.get(dir).and_then(|list| list.last()) {
                if last.as_str() > child {
                    return Err(Error::OutOfOrder(file_path.to_string()));
                }
                if last == child {
                    break;
                }
            }
            if dir == path::ROOT {
                break;
            }
            child = dir;
        }
        Ok(())
    }

    /// Look up a canonical path.
    pub fn resolve(&self, canonical_path: &str) -> Resolved<'_> {
        if let Some(object) = self.objects.get(canonical_path) {
            return Resolved::File(object);
        }
        if let Some(children) = self.dirs.get(canonical_path) {
            return Resolved::Directory(children);
        }
        Resolved::NotFound
    }

    pub fn get(&self, file_path: &str) -> Option<&Object> {
        self.objects.get(file_path)
    }

    /// Open a file for reading its logical content. Compressed objects are
    /// decompressed on the fly; a directory is not a file.
    pub fn open(&self, file_path: &str) -> Result<Handle<'_>> {
        self.open_with(file_path, Mode::Transparent)
    }

    /// Open a file for reading its stored bytes verbatim (the gzip
    /// container for compressed objects).
    pub fn open_raw(&self, file_path: &str) -> Result<Handle<'_>> {
        self.open_with(file_path, Mode::Raw)
    }

    pub fn open_with(&self, file_path: &str, mode: Mode) -> Result<Handle<'_>> {
        self.objects
            .get(file_path)
            .map(|object| Handle::new(object, mode))
            .ok_or(Error::NotFound)
    }

    pub fn stat(&self, canonical_path: &str) -> Result<Metadata> {
        if let Some(object) = self.objects.get(canonical_path) {
            return Ok(object.metadata());
        }
        if self.dirs.contains_key(canonical_path) {
            return Ok(Metadata::directory(canonical_path));
        }
        Err(Error::NotFound)
    }

    /// Immediate children of a directory, in insertion order.
    pub fn read_dir(&self, dir_path: &str) -> Result<Vec<Metadata>> {
        let children = self.dirs.get(dir_path).ok_or(Error::NotFound)?;
        children.iter().map(|child| self.stat(child)).collect()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
