mod common;

use common::TestStore;
use sliver_core::error::Error;
use sliver_core::expr::{Expression, Slice, SliceElem};
use sliver_core::hash::hash_bytes;
use sliver_store::hash::hash_path;
use sliver_store::store::Store;

fn sample_term() -> Expression {
    let id = hash_bytes(b"elem");
    Expression::Slice(Slice {
        roots: vec![id],
        elems: vec![SliceElem {
            path: "/s/elem".to_string(),
            id,
            refs: vec![],
        }],
    })
}

#[tokio::test]
async fn write_term_round_trips() {
    let ts = TestStore::new().await;
    let term = sample_term();
    let (id, path) = ts.store.write_term(&term, "").await.unwrap();
    assert_eq!(id, term.id());
    assert!(path.starts_with(&ts.store.config().store_dir));

    let (read_back, read_path) = ts.store.term_from_id(&id).await.unwrap();
    assert_eq!(read_back, term);
    assert_eq!(read_path, path);

    // rewriting is idempotent
    let (id2, path2) = ts.store.write_term(&term, "").await.unwrap();
    assert_eq!((id2, path2), (id, path));
}

#[tokio::test]
async fn corrupt_term_is_bad_term() {
    let ts = TestStore::new().await;
    let (id, path) = ts.store.write_term(&sample_term(), "").await.unwrap();
    std::fs::write(&path, "scribbles").unwrap();
    let err = ts.store.term_from_id(&id).await.unwrap_err();
    assert!(matches!(err, Error::BadTerm { .. }));
}

#[tokio::test]
async fn unknown_id_is_a_store_error() {
    let ts = TestStore::new().await;
    let err = ts
        .store
        .term_from_id(&hash_bytes(b"nowhere"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(_)));
}

#[tokio::test]
async fn expand_copies_directory_trees() {
    let ts = TestStore::new().await;
    let src = ts.seed_path("tree");
    std::fs::create_dir(&src).unwrap();
    std::fs::create_dir(format!("{src}/bin")).unwrap();
    std::fs::write(format!("{src}/bin/tool"), "#!/bin/sh\n").unwrap();
    std::os::unix::fs::symlink("bin/tool", format!("{src}/run")).unwrap();
    let id = hash_path(&src).await.unwrap();
    ts.store.register_path(&src, &id).await.unwrap();

    let target = ts.store_path("tree");
    ts.store.expand_id(&id, &target).await.unwrap();
    assert_eq!(hash_path(&target).await.unwrap(), id);
    assert_eq!(ts.store.path_id(&target).await.unwrap(), Some(id));

    // expanding again is a no-op
    ts.store.expand_id(&id, &target).await.unwrap();
}

#[tokio::test]
async fn expand_unknown_id_fails() {
    let ts = TestStore::new().await;
    let err = ts
        .store
        .expand_id(&hash_bytes(b"missing"), &ts.store_path("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(_)));
}

#[tokio::test]
async fn delete_removes_path_and_mapping() {
    let ts = TestStore::new().await;
    let (id, path) = ts.store.write_term(&sample_term(), "").await.unwrap();
    assert!(Store::path_exists(&path));

    ts.store.delete_path(&path).await.unwrap();
    assert!(!Store::path_exists(&path));
    assert_eq!(ts.store.path_id(&path).await.unwrap(), None);
    assert!(ts.store.term_from_id(&id).await.is_err());
}

#[tokio::test]
async fn successor_index_round_trips() {
    let ts = TestStore::new().await;
    let a = hash_bytes(b"a");
    let b = hash_bytes(b"b");
    let c = hash_bytes(b"c");

    assert_eq!(ts.store.query_successor(&a).await.unwrap(), None);
    ts.store.register_successor(&a, &b).await.unwrap();
    assert_eq!(ts.store.query_successor(&a).await.unwrap(), Some(b));

    // re-registering replaces the edge
    ts.store.register_successor(&a, &c).await.unwrap();
    assert_eq!(ts.store.query_successor(&a).await.unwrap(), Some(c));
}
