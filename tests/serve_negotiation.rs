use std::time::SystemTime;

use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, ETAG, VARY};
use http::{Method, StatusCode};
use memfs::{Compression, Store};

fn modtime() -> SystemTime {
    SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000)
}

#[test]
fn plain_file_served_without_encoding() {
    let mut store = Store::new();
    store
        .create("/a/b/c.txt", Some("text/plain; charset=utf-8"), modtime(), &b"hello"[..])
        .expect("create");

    for dir in ["/", "/a", "/a/b"] {
        assert!(store.stat(dir).expect(dir).is_dir(), "missing {dir}");
    }

    let response = store.serve("/a/b/c.txt", None, &Method::GET);
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.get(CONTENT_ENCODING).is_none());
    assert!(response.headers.get(VARY).is_none());
    assert_eq!(
        response.headers.get(CONTENT_TYPE).expect("type"),
        "text/plain; charset=utf-8"
    );
    assert_eq!(response.headers.get(CONTENT_LENGTH).expect("length"), "5");
    assert_eq!(response.body.into_bytes().expect("body"), b"hello");
}

#[test]
fn negotiation_symmetry_on_compressed_object() {
    let data = vec![b'z'; 10_000];
    let mut store = Store::new();
    store
        .create_compressed("/big.txt", None, modtime(), data.as_slice(), Compression::best())
        .expect("create");

    let stored_len = store.get("/big.txt").expect("object").stored_len();
    assert!(stored_len < 8_000);

    // Acceptance: stored gzip bytes verbatim, weak validator.
    let response = store.serve("/big.txt", Some("gzip, deflate"), &Method::GET);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get(CONTENT_ENCODING).expect("encoding"), "gzip");
    assert_eq!(response.headers.get(VARY).expect("vary"), "Accept-Encoding");
    let etag = response.headers.get(ETAG).expect("etag").to_str().expect("ascii");
    assert!(etag.starts_with("W/\""), "weak tag, got {etag}");
    assert_eq!(
        response.headers.get(CONTENT_LENGTH).expect("length").to_str().expect("ascii"),
        stored_len.to_string()
    );
    let body = response.body.into_bytes().expect("body");
    assert_eq!(body.len() as u64, stored_len);
    assert_eq!(&body[..2], &[0x1f, 0x8b]);

    // No acceptance: original bytes, strong validator, still Vary.
    let response = store.serve("/big.txt", Some("br"), &Method::GET);
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.get(CONTENT_ENCODING).is_none());
    assert_eq!(response.headers.get(VARY).expect("vary"), "Accept-Encoding");
    let strong = response.headers.get(ETAG).expect("etag").to_str().expect("ascii");
    assert!(strong.starts_with('"'), "strong tag, got {strong}");
    assert_ne!(etag, strong);
    assert_eq!(strong, &etag[2..], "same checksum under both tags");
    assert_eq!(response.body.into_bytes().expect("body"), data);
}

#[test]
fn directory_rewrites_to_index() {
    let mut store = Store::new();
    store
        .create("/a/index.html", Some("text/html; charset=utf-8"), modtime(), &b"<html>a</html>"[..])
        .expect("create");
    store
        .create("/index.html", Some("text/html; charset=utf-8"), modtime(), &b"<html>home</html>"[..])
        .expect("create");

    for request in ["/a", "/a/", "/a/../a"] {
        let response = store.serve(request, None, &Method::GET);
        assert_eq!(response.status, StatusCode::OK, "{request}");
        assert_eq!(
            response.body.into_bytes().expect("body"),
            b"<html>a</html>",
            "{request}"
        );
    }

    let response = store.serve("/", None, &Method::GET);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.into_bytes().expect("body"), b"<html>home</html>");
}

#[test]
fn missing_path_uses_not_found_document() {
    let mut store = Store::new();
    store
        .create("/404.html", None, modtime(), &b"<html>gone</html>"[..])
        .expect("create");

    let response = store.serve("/missing", None, &Method::GET);
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers.get(CONTENT_TYPE).expect("type"),
        "text/html; charset=utf-8"
    );
    assert!(response.headers.get(ETAG).is_none(), "404 body carries no validator");
    assert_eq!(response.body.into_bytes().expect("body"), b"<html>gone</html>");

    let response = store.serve("/missing", None, &Method::HEAD);
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.into_bytes().expect("body").is_empty());
}

#[test]
fn not_found_document_is_reserved() {
    let mut store = Store::new();
    store
        .create("/404.html", None, modtime(), &b"<html>gone</html>"[..])
        .expect("create");

    // Requesting the document directly still yields a not-found status.
    let response = store.serve("/404.html", None, &Method::GET);
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body.into_bytes().expect("body"), b"<html>gone</html>");
}

#[test]
fn bare_not_found_without_document() {
    let store = Store::new();
    let response = store.serve("/missing", None, &Method::GET);
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body.into_bytes().expect("body"), b"404 page not found\n");

    let response = store.serve("/missing", None, &Method::HEAD);
    assert!(response.body.into_bytes().expect("body").is_empty());
}

#[test]
fn serve_content_is_exact() {
    let mut store = Store::new();
    store
        .create("/a/f.txt", None, modtime(), &b"exact"[..])
        .expect("create");
    store
        .create("/404.html", None, modtime(), &b"<html>gone</html>"[..])
        .expect("create");

    let response = store.serve_content("/a/f.txt", None, &Method::GET);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.into_bytes().expect("body"), b"exact");

    // No rewrite and no custom 404 document on this path.
    let response = store.serve_content("/a", None, &Method::GET);
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body.into_bytes().expect("body"), b"404 page not found\n");

    // The reserved document is an ordinary file here.
    let response = store.serve_content("/404.html", None, &Method::GET);
    assert_eq!(response.status, StatusCode::OK);
}

#[test]
fn create_over_directory_leaves_store_intact() {
    let mut store = Store::new();
    store
        .create("/a/f.txt", None, modtime(), &b"x"[..])
        .expect("create");

    let err = store.create("/a", None, modtime(), &b"y"[..]).unwrap_err();
    assert!(matches!(err, memfs::Error::AlreadyExists));
    assert_eq!(store.len(), 1);
    assert!(store.stat("/a").expect("stat").is_dir());
}
