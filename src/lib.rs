//! Read-biased in-memory static file store.
//!
//! A store holds named files entirely in memory, optionally
//! gzip-compressed, under an implicit directory tree derived from rooted
//! slash-separated paths. It is built once by a single writer (loaded from
//! a [`Source`] tree or appended by a code generator) and then served
//! concurrently without locking: compressed objects go out verbatim to
//! clients that accept gzip and are decompressed on the fly for everyone
//! else, with directory-to-index rewriting and a custom not-found document.

pub mod compress;
pub mod error;
pub mod object;
pub mod path;
pub mod reader;
pub mod serve;
pub mod source;
pub mod store;

pub use error::{Error, Result};
pub use object::{EntryKind, Metadata, Object, Resolved};
pub use reader::{Handle, Mode};
pub use serve::{Body, Response, INDEX_FILE, NOT_FOUND_FILE};
pub use source::{DiskSource, Source, SourceEntry};
pub use store::Store;

/// Re-exported gzip level type used by [`Store::load_compressed`] and
/// [`Store::create_compressed`].
pub use flate2::Compression;
