//! Per-open read cursor over a stored object.
//!
//! Raw objects are served straight from the stored bytes and seek for free.
//! Compressed objects are decompressed on demand: seeking drops the
//! decompression stream and the next read rebuilds it from the start of the
//! container, discarding bytes up to the cursor. That makes every valid seek
//! followed by a correct read, at a cost proportional to the target offset —
//! large forward seeks on compressed objects are expected to be slow.

use std::io::{self, Read, Seek, SeekFrom};

use flate2::read::GzDecoder;

use crate::object::Object;
use crate::{Error, Result};

/// How a handle presents a compressed object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Logical content: compressed objects are decompressed on the fly.
    Transparent,
    /// The stored bytes verbatim, gzip container included.
    Raw,
}

enum Strategy<'a> {
    /// Stored bytes are the content; cheap slice reads, free seeking.
    Direct,
    /// Stored bytes are a gzip container; decoder is built on first read
    /// and invalidated by any seek.
    Gzip { decoder: Option<GzDecoder<&'a [u8]>> },
}

/// Read cursor handed out per open. Owned by a single caller; concurrent
/// requests each get their own handle and share nothing mutable.
pub struct Handle<'a> {
    data: &'a [u8],
    size: u64,
    pos: u64,
    closed: bool,
    strategy: Strategy<'a>,
}

impl<'a> Handle<'a> {
    pub(crate) fn new(object: &'a Object, mode: Mode) -> Handle<'a> {
        let transparent = mode == Mode::Transparent && object.is_compressed();
        let (size, strategy) = if transparent {
            (object.size, Strategy::Gzip { decoder: None })
        } else {
            (object.data.len() as u64, Strategy::Direct)
        };
        Handle {
            data: &object.data,
            size,
            pos: 0,
            closed: false,
            strategy,
        }
    }

    /// Length of the content this handle yields (declared size in
    /// transparent mode, stored length in raw mode).
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Mark the handle closed and release the decompression stream.
    /// Subsequent reads and seeks fail. Dropping the handle is equivalent.
    pub fn close(&mut self) {
        self.closed = true;
        if let Strategy::Gzip { decoder } = &mut self.strategy {
            *decoder = None;
        }
    }

    fn read_inner(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(Error::Closed);
        }
        if self.pos >= self.size {
            return Ok(0);
        }
        match &mut self.strategy {
            Strategy::Direct => {
                let start = self.pos as usize;
                let n = buf.len().min((self.size - self.pos) as usize);
                buf[..n].copy_from_slice(&self.data[start..start + n]);
                self.pos += n as u64;
                Ok(n)
            }
            Strategy::Gzip { decoder } => {
                if decoder.is_none() {
                    let mut fresh = GzDecoder::new(self.data);
                    if self.pos > 0 {
                        let skipped =
                            io::copy(&mut fresh.by_ref().take(self.pos), &mut io::sink())?;
                        if skipped != self.pos {
                            return Err(Error::Io(io::ErrorKind::UnexpectedEof.into()));
                        }
                    }
                    *decoder = Some(fresh);
                }
                let Some(stream) = decoder else {
                    return Ok(0);
                };
                let n = stream.read(buf)?;
                self.pos += n as u64;
                Ok(n)
            }
        }
    }

    fn seek_inner(&mut self, target: SeekFrom) -> Result<u64> {
        if self.closed {
            return Err(Error::Closed);
        }
        let pos = match target {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => checked_offset(self.pos, delta),
            SeekFrom::End(delta) => checked_offset(self.size, delta),
        };
        let pos = pos.ok_or(Error::InvalidSeek)?;
        self.pos = pos;
        // Any position change invalidates the stream; the next read derives
        // a correct one, so a valid seek is never followed by a read error.
        if let Strategy::Gzip { decoder } = &mut self.strategy {
            *decoder = None;
        }
        Ok(pos)
    }
}

fn checked_offset(base: u64, delta: i64) -> Option<u64> {
    if delta >= 0 {
        base.checked_add(delta as u64)
    } else {
        base.checked_sub(delta.unsigned_abs())
    }
}

impl Read for Handle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_inner(buf).map_err(Into::into)
    }
}

impl Seek for Handle<'_> {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        self.seek_inner(target).map_err(Into::into)
    }
}
