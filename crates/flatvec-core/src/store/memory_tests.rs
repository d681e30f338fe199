//! Tests for `InMemoryVectorStore`.

use super::{InMemoryVectorStore, ObjectVectorPair, VectorStore};
use crate::header::StoreHeader;
use crate::vector::{Vector, VectorType};

fn header() -> StoreHeader {
    StoreHeader::new(VectorType::Real, 2).unwrap()
}

#[test]
fn test_insert_preserves_order() {
    let mut store = InMemoryVectorStore::new(header());
    store.insert("zebra", Vector::Real(vec![1.0, 0.0])).unwrap();
    store.insert("apple", Vector::Real(vec![0.0, 1.0])).unwrap();

    let ids: Vec<String> = store
        .enumerate()
        .map(|p| p.unwrap().identifier)
        .collect();
    assert_eq!(ids, vec!["zebra", "apple"]);
}

#[test]
fn test_insert_replaces_and_returns_previous() {
    let mut store = InMemoryVectorStore::new(header());
    assert!(store.insert("a", Vector::Real(vec![1.0, 1.0])).unwrap().is_none());
    let previous = store.insert("a", Vector::Real(vec![2.0, 2.0])).unwrap();

    assert_eq!(previous, Some(Vector::Real(vec![1.0, 1.0])));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("a"), Some(&Vector::Real(vec![2.0, 2.0])));
}

#[test]
fn test_insert_rejects_wrong_shape() {
    let mut store = InMemoryVectorStore::new(header());
    let err = store
        .insert("a", Vector::Real(vec![1.0; 3]))
        .expect_err("dimension");
    assert_eq!(err.code(), "FLATVEC-007");
    assert!(store.is_empty());
}

#[test]
fn test_remove_keeps_remaining_order() {
    let mut store = InMemoryVectorStore::new(header());
    for id in ["a", "b", "c"] {
        store.insert(id, Vector::Real(vec![0.0, 0.0])).unwrap();
    }
    assert!(store.remove("b").is_some());
    assert!(store.remove("b").is_none());

    let ids: Vec<String> = store.enumerate().map(|p| p.unwrap().identifier).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_load_from_pairs() {
    let pairs = vec![
        ObjectVectorPair::new("x", Vector::Real(vec![1.0, 2.0])),
        ObjectVectorPair::new("y", Vector::Real(vec![3.0, 4.0])),
        ObjectVectorPair::new("x", Vector::Real(vec![5.0, 6.0])),
    ];
    let store = InMemoryVectorStore::load(header(), &pairs).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("x"), Some(&Vector::Real(vec![5.0, 6.0])));
}

#[test]
fn test_enumerate_is_restartable() {
    let mut store = InMemoryVectorStore::new(header());
    store.insert("only", Vector::Real(vec![0.5, 0.5])).unwrap();

    assert_eq!(store.enumerate().count(), 1);
    assert_eq!(store.enumerate().count(), 1);
}
