//! Content negotiation and serving decisions.
//!
//! This layer resolves a request path to a representation — stored gzip
//! bytes served verbatim to accepting clients, or the logical content — and
//! the headers that describe it. Socket I/O, range slicing and status-line
//! transmission belong to the transport collaborator driving the returned
//! `Response`.

use std::io::{self, Read};

use http::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, ETAG, VARY};
use http::{Method, StatusCode};
use log::debug;

use crate::object::Object;
use crate::path;
use crate::reader::{Handle, Mode};
use crate::store::Store;

/// Directory requests rewrite to this child.
pub const INDEX_FILE: &str = "index.html";

/// Reserved path of the custom not-found document.
pub const NOT_FOUND_FILE: &str = "/404.html";

const NOT_FOUND_TEXT: &[u8] = b"404 page not found\n";

/// What to send for one request. The transport writes the status line and
/// headers, then drains the body.
pub struct Response<'a> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body<'a>,
}

pub enum Body<'a> {
    /// Stream from the store; already positioned at the first byte.
    Reader(Handle<'a>),
    Static(&'static [u8]),
    Empty,
}

impl Body<'_> {
    /// Drain the body into memory. Mostly for tests and small collaborators;
    /// transports should `io::copy` from the reader instead.
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            Body::Reader(mut handle) => {
                let mut bytes = Vec::new();
                handle.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
            Body::Static(bytes) => Ok(bytes.to_vec()),
            Body::Empty => Ok(Vec::new()),
        }
    }
}

impl Store {
    /// Serve a request path with static-file semantics: the path is
    /// canonicalized, directories rewrite to their index document, and
    /// misses fall back to the registered not-found document. Never fails;
    /// every outcome is a `Response`.
    pub fn serve(&self, request_path: &str, accept_encoding: Option<&str>, method: &Method) -> Response<'_> {
        let mut target = path::clean(request_path);
        if self.dirs.contains_key(&target) {
            target = if target == path::ROOT {
                format!("/{INDEX_FILE}")
            } else {
                format!("{target}/{INDEX_FILE}")
            };
        }
        if target != NOT_FOUND_FILE {
            if let Some(object) = self.objects.get(&target) {
                return respond(object, accept_encoding, method, StatusCode::OK, None, true);
            }
        }
        debug!("serve {request_path}: not found");
        self.not_found(accept_encoding, method)
    }

    /// Serve the named file exactly: no canonicalization, no directory
    /// rewrite, no custom not-found document.
    pub fn serve_content(&self, file_path: &str, accept_encoding: Option<&str>, method: &Method) -> Response<'_> {
        match self.objects.get(file_path) {
            Some(object) => respond(object, accept_encoding, method, StatusCode::OK, None, true),
            None => bare_not_found(method),
        }
    }

    fn not_found(&self, accept_encoding: Option<&str>, method: &Method) -> Response<'_> {
        match self.objects.get(NOT_FOUND_FILE) {
            // The document replaces whatever content missed, so its type is
            // forced and it carries no validator: a stale 404 body must
            // never be revalidated as current.
            Some(object) => respond(
                object,
                accept_encoding,
                method,
                StatusCode::NOT_FOUND,
                Some("text/html; charset=utf-8"),
                false,
            ),
            None => bare_not_found(method),
        }
    }
}

fn respond<'a>(
    object: &'a Object,
    accept_encoding: Option<&str>,
    method: &Method,
    status: StatusCode,
    mime_override: Option<&'static str>,
    with_validator: bool,
) -> Response<'a> {
    let compressed = object.is_compressed();
    let send_gzip = compressed && accepts_gzip(accept_encoding);

    let mut headers = HeaderMap::new();
    if compressed {
        // The representation depends on Accept-Encoding even when this
        // request gets the decompressed form.
        headers.insert(VARY, HeaderValue::from_static("Accept-Encoding"));
    }
    if send_gzip {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    }
    if let Some(mime) = mime_override.or(object.mime()) {
        if let Ok(value) = HeaderValue::from_str(mime) {
            headers.insert(CONTENT_TYPE, value);
        }
    }
    if with_validator {
        if let Some(checksum) = object.checksum() {
            if let Ok(value) = HeaderValue::from_str(&validator_tag(checksum, send_gzip)) {
                headers.insert(ETAG, value);
            }
        }
    }
    let length = if send_gzip { object.stored_len() } else { object.size() };
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));

    let body = if method == Method::HEAD {
        Body::Empty
    } else {
        let mode = if send_gzip { Mode::Raw } else { Mode::Transparent };
        Body::Reader(Handle::new(object, mode))
    };
    Response { status, headers, body }
}

fn bare_not_found(method: &Method) -> Response<'static> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(NOT_FOUND_TEXT.len()));
    let body = if method == Method::HEAD {
        Body::Empty
    } else {
        Body::Static(NOT_FOUND_TEXT)
    };
    Response {
        status: StatusCode::NOT_FOUND,
        headers,
        body,
    }
}

/// Weak and strong tags for the same object must never satisfy each other:
/// the gzip bytes and the decompressed bytes are different representations.
fn validator_tag(checksum: u32, weak: bool) -> String {
    if weak {
        format!("W/\"{checksum:08x}\"")
    } else {
        format!("\"{checksum:08x}\"")
    }
}

/// Token scan of an Accept-Encoding value. Parameters (`;q=…`) are ignored,
/// matching conventional static-file-server leniency.
fn accepts_gzip(accept_encoding: Option<&str>) -> bool {
    let Some(value) = accept_encoding else {
        return false;
    };
    value.split(',').any(|token| {
        let name = token.split(';').next().unwrap_or("").trim();
        name.eq_ignore_ascii_case("gzip")
    })
}
