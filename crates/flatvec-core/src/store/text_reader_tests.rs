//! Tests for `TextVectorStoreReader`.

use super::{CloseableVectorStore, ObjectVectorPair, TextVectorStoreReader, VectorStore, VectorStoreWriter};
use crate::header::StoreHeader;
use crate::vector::{Vector, VectorType};

fn writer() -> VectorStoreWriter {
    VectorStoreWriter::new().without_disk_guard()
}

#[test]
fn test_text_roundtrip_and_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.txt");
    let header = StoreHeader::new(VectorType::Real, 2).unwrap();
    let pairs = vec![
        ObjectVectorPair::new("doc-1", Vector::Real(vec![0.25, -1.0])),
        ObjectVectorPair::new("doc-2", Vector::Real(vec![3.5, 0.0])),
    ];
    writer().write_text(&path, &header, &pairs).unwrap();

    let reader = TextVectorStoreReader::open(&path).unwrap();
    assert_eq!(reader.header(), &header);
    let read: Vec<ObjectVectorPair> = reader.enumerate().collect::<Result<_, _>>().unwrap();
    assert_eq!(read, pairs);
    assert_eq!(reader.lookup("doc-2").unwrap(), Some(Vector::Real(vec![3.5, 0.0])));
    assert!(reader.lookup("doc-3").unwrap().is_none());
}

#[test]
fn test_delimiter_in_identifier_is_escaped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.txt");
    let header = StoreHeader::new(VectorType::Real, 1).unwrap();
    let pairs = vec![ObjectVectorPair::new("a|b", Vector::Real(vec![1.0]))];
    writer().write_text(&path, &header, &pairs).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().nth(1), Some("a;b|1"));

    let reader = TextVectorStoreReader::open(&path).unwrap();
    // Escaping is lossy: the stored form comes back
    let first = reader.enumerate().next().unwrap().unwrap();
    assert_eq!(first.identifier, "a;b");
    // ... but a lookup by the original identifier still finds it
    assert_eq!(reader.lookup("a|b").unwrap(), Some(Vector::Real(vec![1.0])));
    assert!(reader.contains("a;b").unwrap());
}

#[test]
fn test_blank_and_crlf_lines_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.txt");
    std::fs::write(
        &path,
        "-vectortype real -dimension 2\r\nx|1 2\r\n\r\ny|3 4\r\n",
    )
    .unwrap();

    let reader = TextVectorStoreReader::open(&path).unwrap();
    assert_eq!(reader.count().unwrap(), 2);
    assert_eq!(reader.lookup("y").unwrap(), Some(Vector::Real(vec![3.0, 4.0])));
}

#[test]
fn test_line_without_delimiter_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.txt");
    std::fs::write(&path, "-vectortype real -dimension 1\nnodelimiter\n").unwrap();

    let reader = TextVectorStoreReader::open(&path).unwrap();
    let results: Vec<_> = reader.enumerate().collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[test]
fn test_open_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = TextVectorStoreReader::open(dir.path().join("absent.txt")).unwrap_err();
    assert_eq!(missing.code(), "FLATVEC-001");

    let empty = dir.path().join("empty.txt");
    std::fs::write(&empty, "").unwrap();
    assert_eq!(
        TextVectorStoreReader::open(&empty).unwrap_err().code(),
        "FLATVEC-002"
    );
}

#[test]
fn test_close_blocks_reads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.txt");
    std::fs::write(&path, "-vectortype real -dimension 1\nx|1\n").unwrap();
    let reader = TextVectorStoreReader::open(&path).unwrap();

    reader.close();
    reader.close();

    assert!(reader.is_closed());
    assert_eq!(reader.lookup("x").unwrap_err().code(), "FLATVEC-006");
    assert!(reader.count().is_err());
}
