//! Materialization Tests
//!
//! Covers:
//! - Per-part timeout isolation and the reported part index
//! - Order preservation and zero-part bodies
//! - Error propagation from the part sequence and from entity streams
//! - Release of open streams when materialization fails

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use mimeparts::base::state::ConsumptionState;
use mimeparts::http::{BodyPartEntity, HeaderSet, MediaType};
use mimeparts::multipart::{
    BodyPart, FormDataMultipart, FormDataPart, GeneralPart, MaterializeConfig, Multipart,
};
use mimeparts::{ErrorKind, MultipartError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Sets its flag when dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// `total` bytes in `chunk`-sized pieces, one piece every `interval`.
fn paced(
    total: usize,
    chunk: usize,
    interval: Duration,
) -> impl Stream<Item = Result<Bytes, MultipartError>> + Send + 'static {
    stream::unfold(0usize, move |sent| async move {
        if sent >= total {
            return None;
        }
        tokio::time::sleep(interval).await;
        let n = chunk.min(total - sent);
        Some((Ok(Bytes::from(vec![b'x'; n])), sent + n))
    })
}

fn field(name: &str, entity: BodyPartEntity) -> FormDataPart {
    FormDataPart::new(name, entity)
}

#[tokio::test(start_paused = true)]
async fn test_slow_part_times_out_with_its_index() {
    // 10 B, then 5 MB at 1 MB/s, then 10 B; 500 ms per part.
    let parts = vec![
        field("first", BodyPartEntity::strict(vec![b'a'; 10])),
        field(
            "large",
            BodyPartEntity::streamed(
                paced(5_000_000, 100_000, Duration::from_millis(100)),
                Some(5_000_000),
            ),
        ),
        field("last", BodyPartEntity::strict(vec![b'z'; 10])),
    ];
    let started = tokio::time::Instant::now();
    let err = Multipart::form_data(parts)
        .to_strict(Duration::from_millis(500))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    match err {
        MultipartError::PartTimeout {
            index,
            timeout,
            elapsed,
        } => {
            assert_eq!(index, 1);
            assert_eq!(timeout, Duration::from_millis(500));
            assert!(elapsed >= Duration::from_millis(500));
            assert!(elapsed < Duration::from_millis(600));
        }
        other => panic!("Expected PartTimeout, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_millis(600));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_per_part_not_global() {
    // Three parts of 300 ms each: 900 ms in total, each within 500 ms.
    let parts = (0..3)
        .map(|i| {
            field(
                &format!("p{i}"),
                BodyPartEntity::streamed(paced(30, 10, Duration::from_millis(100)), Some(30)),
            )
        })
        .collect();
    let started = tokio::time::Instant::now();
    let strict = Multipart::form_data(parts)
        .to_strict(Duration::from_millis(500))
        .await
        .unwrap();

    assert_eq!(strict.len(), 3);
    assert!(strict.iter().all(|p| p.entity().len() == 30));
    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[tokio::test(start_paused = true)]
async fn test_waiting_for_next_part_is_not_timed() {
    let delayed = stream::iter(0..2).then(|i| async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(field(&format!("late{i}"), BodyPartEntity::strict("x")))
    });
    let strict = Multipart::new(MediaType::form_data(), delayed)
        .to_strict(Duration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(strict.len(), 2);
}

#[tokio::test]
async fn test_zero_parts() {
    let strict = Multipart::form_data(vec![])
        .to_strict(Duration::from_millis(500))
        .await
        .unwrap();
    assert!(strict.is_empty());
    assert!(strict.media_type().is_form_data());
}

#[tokio::test(start_paused = true)]
async fn test_order_preserved() {
    // Later parts finish faster; output order must still follow input order.
    let parts = (0..5u64)
        .map(|i| {
            let delay = Duration::from_millis(50 * (5 - i));
            let body = stream::once(async move {
                tokio::time::sleep(delay).await;
                Ok(Bytes::from(format!("body-{i}")))
            });
            field(&format!("f{i}"), BodyPartEntity::streamed(body, None))
        })
        .collect();
    let strict = Multipart::form_data(parts)
        .to_strict(Duration::from_secs(1))
        .await
        .unwrap();

    let names: Vec<_> = strict.iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["f0", "f1", "f2", "f3", "f4"]);
    let bodies: Vec<_> = strict.iter().map(|p| p.entity().clone()).collect();
    assert_eq!(bodies[3], Bytes::from("body-3"));
}

#[tokio::test]
async fn test_entity_error_fails_whole_operation() {
    let broken = stream::iter(vec![
        Ok(Bytes::from_static(b"partial")),
        Err(MultipartError::io("connection reset")),
    ]);
    let parts = vec![
        field("ok", BodyPartEntity::strict("fine")),
        field("broken", BodyPartEntity::streamed(broken, None)),
    ];
    let err = Multipart::form_data(parts)
        .to_strict(Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(err, MultipartError::io("connection reset"));
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[tokio::test]
async fn test_part_sequence_error_fails_whole_operation() {
    let parts: Vec<Result<FormDataPart, MultipartError>> = vec![
        Ok(field("ok", BodyPartEntity::strict("fine"))),
        Err(MultipartError::Framing("truncated body".into())),
        Ok(field("never", BodyPartEntity::strict("reached"))),
    ];
    let err = Multipart::new(MediaType::form_data(), stream::iter(parts))
        .to_strict(Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(err, MultipartError::Framing("truncated body".into()));
}

#[tokio::test(start_paused = true)]
async fn test_open_streams_released_on_timeout() {
    let slow_dropped = Arc::new(AtomicBool::new(false));
    let pending_dropped = Arc::new(AtomicBool::new(false));

    let slow_guard = DropFlag(slow_dropped.clone());
    let slow = paced(1_000, 10, Duration::from_millis(100)).map(move |chunk| {
        let _keep = &slow_guard;
        chunk
    });

    let pending_guard = DropFlag(pending_dropped.clone());
    let pending = stream::once(async move {
        let _keep = pending_guard;
        Ok(Bytes::from_static(b"never read"))
    });

    let parts = vec![
        field("slow", BodyPartEntity::streamed(slow, None)),
        field("pending", BodyPartEntity::streamed(pending, None)),
    ];
    let err = Multipart::form_data(parts)
        .to_strict(Duration::from_millis(250))
        .await
        .unwrap_err();

    assert_eq!(err.part_index(), Some(0));
    assert!(slow_dropped.load(Ordering::SeqCst));
    assert!(pending_dropped.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_open_streams_released_on_cancellation() {
    let slow_dropped = Arc::new(AtomicBool::new(false));
    let pending_dropped = Arc::new(AtomicBool::new(false));

    let slow_guard = DropFlag(slow_dropped.clone());
    let slow = paced(1_000, 10, Duration::from_millis(100)).map(move |chunk| {
        let _keep = &slow_guard;
        chunk
    });

    let pending_guard = DropFlag(pending_dropped.clone());
    let pending = stream::once(async move {
        let _keep = pending_guard;
        Ok(Bytes::from_static(b"never read"))
    });

    let parts = vec![
        field("slow", BodyPartEntity::streamed(slow, None)),
        field("pending", BodyPartEntity::streamed(pending, None)),
    ];
    // The caller gives up long before the per-part deadline.
    let outcome = tokio::time::timeout(
        Duration::from_millis(250),
        Multipart::form_data(parts).to_strict(Duration::from_secs(60)),
    )
    .await;

    assert!(outcome.is_err());
    assert!(slow_dropped.load(Ordering::SeqCst));
    assert!(pending_dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_strict_parts_ignore_timeout() {
    let parts = vec![
        field("a", BodyPartEntity::strict("1")),
        field("b", BodyPartEntity::strict("2")),
    ];
    let strict = Multipart::form_data(parts)
        .to_strict(Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(strict.len(), 2);
}

#[tokio::test]
async fn test_length_mismatch_is_not_fatal() {
    let body = stream::iter(vec![Ok(Bytes::from_static(b"short"))]);
    let parts = vec![field("a", BodyPartEntity::streamed(body, Some(1000)))];
    let strict = Multipart::form_data(parts)
        .to_strict(Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(strict.parts()[0].entity(), &Bytes::from_static(b"short"));
}

#[tokio::test]
async fn test_derivation_failure_is_protocol_error() {
    let raw = vec![
        Ok((
            HeaderSet::from_pairs([("Content-Disposition", "form-data; name=\"a\"")]).unwrap(),
            BodyPartEntity::strict("1"),
        )),
        Ok((
            HeaderSet::from_pairs([("Content-Disposition", "form-data; filename=\"x\"")]).unwrap(),
            BodyPartEntity::strict("2"),
        )),
    ];
    let multipart: FormDataMultipart =
        Multipart::from_raw_parts(MediaType::form_data(), stream::iter(raw));
    let err = multipart
        .to_strict(Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(err, MultipartError::MissingFormDataName);
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn test_consumed_sequence_is_usage_error() {
    let mut multipart = Multipart::form_data(vec![field("a", BodyPartEntity::strict("1"))]);
    while let Some(part) = multipart.parts().next_part().await.unwrap() {
        assert_eq!(part.name(), "a");
    }
    assert_eq!(multipart.parts().state(), ConsumptionState::Exhausted);

    let err = multipart
        .to_strict(Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(err, MultipartError::PartsConsumed);
    assert_eq!(err.kind(), ErrorKind::Usage);
}

#[tokio::test]
async fn test_partially_read_part_resumes() {
    let body = stream::iter(vec![
        Ok(Bytes::from_static(b"one-")),
        Ok(Bytes::from_static(b"two-")),
        Ok(Bytes::from_static(b"three")),
    ]);
    let mut entity = match BodyPartEntity::streamed(body, None) {
        BodyPartEntity::Streamed(s) => s,
        BodyPartEntity::Strict(_) => unreachable!(),
    };
    let first = entity.next().await.unwrap().unwrap();
    assert_eq!(first, Bytes::from_static(b"one-"));

    let part: GeneralPart = GeneralPart::new(HeaderSet::new(), BodyPartEntity::Streamed(entity));
    let strict = part.to_strict(Duration::from_secs(1)).await.unwrap();
    assert_eq!(strict.entity(), &Bytes::from_static(b"two-three"));
}

#[tokio::test]
async fn test_http_body_source() {
    let body = http_body_util::Full::new(Bytes::from_static(b"from a request body"));
    let parts = vec![field("body", BodyPartEntity::from_body(body))];
    let strict = Multipart::form_data(parts)
        .to_strict_with(&MaterializeConfig::new().preallocate_limit(4))
        .await
        .unwrap();
    assert_eq!(
        strict.parts()[0].entity(),
        &Bytes::from_static(b"from a request body")
    );
}

#[tokio::test]
async fn test_strict_accessors_are_idempotent() {
    let parts = vec![
        field("a", BodyPartEntity::strict("1")),
        field("b", BodyPartEntity::strict("2")),
    ];
    let strict = Multipart::form_data(parts)
        .to_strict(Duration::from_secs(1))
        .await
        .unwrap();
    let first: Vec<_> = strict.parts().to_vec();
    let second: Vec<_> = strict.parts().to_vec();
    assert_eq!(first, second);

    let again = strict
        .to_streamed()
        .to_strict(Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(again, strict);
}
