use std::io::{Read, Seek, SeekFrom};
use std::time::SystemTime;

use memfs::{Compression, Store};

fn content(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31) % 256) as u8).collect()
}

fn modtime() -> SystemTime {
    SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000)
}

#[test]
fn raw_object_round_trip() {
    let data = content(16 * 1024);
    let mut store = Store::new();
    store
        .create("/data.bin", None, modtime(), data.as_slice())
        .expect("create");

    let object = store.get("/data.bin").expect("object");
    assert!(!object.is_compressed());
    assert_eq!(object.stored_len(), data.len() as u64);

    let mut out = Vec::new();
    store
        .open("/data.bin")
        .expect("open")
        .read_to_end(&mut out)
        .expect("read");
    assert_eq!(out, data);
}

#[test]
fn compressed_object_round_trip() {
    let data = content(16 * 1024);
    let mut store = Store::new();
    store
        .create_compressed("/data.bin", None, modtime(), data.as_slice(), Compression::best())
        .expect("create");

    let object = store.get("/data.bin").expect("object");
    assert!(object.is_compressed());
    assert_eq!(object.size(), data.len() as u64);
    assert!(5 * object.stored_len() <= 4 * object.size());

    let mut out = Vec::new();
    store
        .open("/data.bin")
        .expect("open")
        .read_to_end(&mut out)
        .expect("read");
    assert_eq!(out, data);

    // Raw handle yields the stored gzip container verbatim.
    let mut container = Vec::new();
    store
        .open_raw("/data.bin")
        .expect("open raw")
        .read_to_end(&mut container)
        .expect("read");
    assert_eq!(container.len() as u64, object.stored_len());
    assert_eq!(&container[..2], &[0x1f, 0x8b]);
}

#[test]
fn seek_matches_discarded_prefix() {
    let data = content(16 * 1024);
    let mut store = Store::new();
    store
        .create_compressed("/data.bin", None, modtime(), data.as_slice(), Compression::best())
        .expect("create");

    for k in [0u64, 1, 1023, 1024, 8191, data.len() as u64] {
        let mut seeked = store.open("/data.bin").expect("open");
        seeked.seek(SeekFrom::Start(k)).expect("seek");
        let mut from_seek = Vec::new();
        seeked.read_to_end(&mut from_seek).expect("read");

        let mut sequential = store.open("/data.bin").expect("open");
        let mut all = Vec::new();
        sequential.read_to_end(&mut all).expect("read");

        assert_eq!(from_seek, &all[k as usize..], "offset {k}");
    }
}

#[test]
fn tiny_content_skips_compression() {
    let mut store = Store::new();
    store
        .create_compressed("/small.txt", None, modtime(), &b"hello"[..], Compression::best())
        .expect("create");

    let object = store.get("/small.txt").expect("object");
    assert!(!object.is_compressed());
    assert_eq!(&object.checksum(), &Some(crc32fast::hash(b"hello")));
}

#[test]
fn incompressible_content_stored_raw() {
    let mut state = 0x243f6a8885a308d3u64;
    let data: Vec<u8> = (0..8192)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect();

    let mut store = Store::new();
    store
        .create_compressed("/noise.bin", None, modtime(), data.as_slice(), Compression::best())
        .expect("create");

    let object = store.get("/noise.bin").expect("object");
    assert!(!object.is_compressed());

    let mut out = Vec::new();
    store
        .open("/noise.bin")
        .expect("open")
        .read_to_end(&mut out)
        .expect("read");
    assert_eq!(out, data);
}
