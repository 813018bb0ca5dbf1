//! Form Data Tests
//!
//! Covers:
//! - File-backed parts streamed from disk
//! - Derived name/filename fields
//! - Text field helpers

use bytes::Bytes;
use mimeparts::http::{DispositionType, HeaderSet};
use mimeparts::multipart::{BodyPart, FormDataPart, Multipart, StrictMultipart};
use mimeparts::{ErrorKind, MultipartError};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_from_path_streams_file() {
    let mut file = NamedTempFile::new().unwrap();
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    file.write_all(&content).unwrap();
    file.flush().unwrap();

    let part = FormDataPart::from_path("upload", file.path(), 1024)
        .await
        .unwrap();
    assert_eq!(part.name(), "upload");
    assert_eq!(part.entity().content_length(), Some(10_000));
    let expected_name = file.path().file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(part.filename(), Some(expected_name.as_str()));

    let strict = Multipart::form_data(vec![part])
        .to_strict(Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(strict.parts()[0].entity(), &Bytes::from(content));
}

#[tokio::test]
async fn test_from_path_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.bin");
    let err = FormDataPart::from_path("f", &missing, 1024).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    match err {
        MultipartError::FileRead { path, .. } => assert!(path.ends_with("does-not-exist.bin")),
        other => panic!("Expected FileRead, got {other:?}"),
    }
}

#[tokio::test]
async fn test_from_path_zero_chunk_size() {
    let file = NamedTempFile::new().unwrap();
    let err = FormDataPart::from_path("f", file.path(), 0).await.unwrap_err();
    assert!(matches!(err, MultipartError::InvalidConfig(_)));
}

#[test]
fn test_derived_fields_stay_consistent() {
    let headers = HeaderSet::from_pairs([(
        "Content-Disposition",
        "form-data; name=\"a\"; filename=\"b.txt\"",
    )])
    .unwrap();
    let part = FormDataPart::<Bytes>::from_raw(headers, Bytes::new()).unwrap();

    assert_eq!(part.name(), "a");
    assert_eq!(part.filename(), Some("b.txt"));
    let cd = part.content_disposition().unwrap().unwrap();
    assert_eq!(cd.disposition_type(), &DispositionType::FormData);
    assert_eq!(cd.name(), Some("a"));
    assert_eq!(cd.filename(), Some("b.txt"));
    assert_eq!(part.disposition_type().unwrap(), Some(DispositionType::FormData));
}

#[test]
fn test_form_data_fields() {
    let form = StrictMultipart::form_data_fields([("k1", "v1"), ("k2", "v2")]);
    let entity = form.to_entity("f").unwrap();
    let body = String::from_utf8(entity.into_bytes().to_vec()).unwrap();
    assert!(body.contains("name=\"k1\""));
    assert!(body.contains("v2"));
    assert!(body.ends_with("--f--"));
}

#[tokio::test]
async fn test_duplicate_names_allowed() {
    let strict = Multipart::form_data(vec![
        FormDataPart::new("same", "1"),
        FormDataPart::new("same", "2"),
    ])
    .to_strict(Duration::from_secs(1))
    .await
    .unwrap();
    assert_eq!(strict.len(), 2);
}
