//! Streaming-to-strict conversion.
//!
//! Parts are consumed strictly in order. Each part's entity is buffered
//! under its own deadline, started when that part's accumulation starts;
//! waiting for the next part to arrive is not timed. The first error ends
//! the run, and everything accumulated so far (including the still-open
//! part and entity streams) is dropped before the error is returned.

use crate::base::error::MultipartError;
use crate::http::entity::{BodyPartEntity, StreamedEntity};
use crate::multipart::bodypart::StreamedPart;
use crate::multipart::config::MaterializeConfig;
use crate::multipart::streaming::Multipart;
use crate::multipart::strict::StrictMultipart;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::Instant;

/// Buffer an entity within `config.timeout()`.
///
/// A strict entity is returned as is, without a deadline. A declared length
/// that differs from what was read is logged, never enforced.
pub async fn materialize_entity(
    entity: BodyPartEntity,
    config: &MaterializeConfig,
) -> Result<Bytes, MultipartError> {
    let streamed = match entity {
        BodyPartEntity::Strict(data) => return Ok(data),
        BodyPartEntity::Streamed(streamed) => streamed,
    };

    let timeout = config.timeout();
    let declared = streamed.declared_length();
    let capacity = declared.map_or(0, |len| {
        usize::try_from(len)
            .unwrap_or(usize::MAX)
            .min(config.preallocate_limit)
    });

    let started = Instant::now();
    let data = match tokio::time::timeout(timeout, accumulate(streamed, capacity)).await {
        Ok(result) => result?,
        Err(_) => {
            let elapsed = started.elapsed();
            tracing::debug!(?timeout, ?elapsed, "entity not read within timeout");
            return Err(MultipartError::EntityTimeout { timeout, elapsed });
        }
    };

    if let Some(declared) = declared {
        if declared != data.len() as u64 {
            tracing::warn!(
                declared,
                actual = data.len(),
                "entity length differs from declared length"
            );
        }
    }
    Ok(data)
}

async fn accumulate(mut entity: StreamedEntity, capacity: usize) -> Result<Bytes, MultipartError> {
    let mut buf = BytesMut::with_capacity(capacity);
    while let Some(chunk) = entity.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

/// Buffer a single part's entity.
pub async fn part_to_strict<P: StreamedPart>(
    part: P,
    timeout: Duration,
) -> Result<P::Strict, MultipartError> {
    let config = MaterializeConfig::new().part_timeout(timeout);
    let (shell, entity) = part.split();
    let data = materialize_entity(entity, &config).await?;
    Ok(P::join(shell, data))
}

impl<P: StreamedPart> Multipart<P> {
    /// Buffer every part, giving each part's entity `timeout` to complete.
    ///
    /// Fails with [`MultipartError::PartTimeout`] naming the first part that
    /// did not finish in time, or with the first error of the part sequence
    /// or of an entity stream.
    pub async fn to_strict(
        self,
        timeout: Duration,
    ) -> Result<StrictMultipart<P::Strict>, MultipartError> {
        self.to_strict_with(&MaterializeConfig::new().part_timeout(timeout))
            .await
    }

    pub async fn to_strict_with(
        self,
        config: &MaterializeConfig,
    ) -> Result<StrictMultipart<P::Strict>, MultipartError> {
        let (media_type, mut parts) = self.into_inner();
        let mut strict = Vec::new();

        while let Some(part) = parts.next().await {
            let index = strict.len();
            let part = part.inspect_err(|e| {
                tracing::debug!(index, error = %e, "part sequence failed");
            })?;

            let (shell, entity) = part.split();
            tracing::trace!(index, declared = ?entity.content_length(), "materializing part");
            let data = materialize_entity(entity, config)
                .await
                .map_err(|e| e.at_part(index))?;
            tracing::trace!(index, bytes = data.len(), "part materialized");

            strict.push(P::join(shell, data));
        }

        tracing::debug!(media_type = %media_type, parts = strict.len(), "multipart materialized");
        Ok(StrictMultipart::new(media_type, strict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunked(chunks: Vec<&'static str>, declared: Option<u64>) -> BodyPartEntity {
        BodyPartEntity::streamed(
            stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c.as_bytes())))),
            declared,
        )
    }

    #[tokio::test]
    async fn test_accumulates_chunks() {
        let data = materialize_entity(chunked(vec!["ab", "c", "", "de"], Some(5)), &MaterializeConfig::new())
            .await
            .unwrap();
        assert_eq!(&data[..], b"abcde");
    }

    #[tokio::test]
    async fn test_length_mismatch_is_not_an_error() {
        let data = materialize_entity(chunked(vec!["abc"], Some(10)), &MaterializeConfig::new())
            .await
            .unwrap();
        assert_eq!(data.len(), 3);
    }

    #[tokio::test]
    async fn test_strict_entity_skips_deadline() {
        let config = MaterializeConfig::new().part_timeout(Duration::ZERO);
        let data = materialize_entity(BodyPartEntity::strict("ready"), &config)
            .await
            .unwrap();
        assert_eq!(&data[..], b"ready");
    }

    #[tokio::test(start_paused = true)]
    async fn test_entity_timeout() {
        let slow = stream::unfold(0u8, |n| async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Some((Ok(Bytes::from_static(b"x")), n.wrapping_add(1)))
        });
        let config = MaterializeConfig::new().part_timeout(Duration::from_millis(250));
        let err = materialize_entity(BodyPartEntity::streamed(slow, None), &config)
            .await
            .unwrap_err();
        match err {
            MultipartError::EntityTimeout { timeout, elapsed } => {
                assert_eq!(timeout, Duration::from_millis(250));
                assert!(elapsed >= timeout);
            }
            other => panic!("Expected EntityTimeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_consumed_entity_is_usage_error() {
        let mut entity = match chunked(vec!["a"], None) {
            BodyPartEntity::Streamed(s) => s,
            BodyPartEntity::Strict(_) => unreachable!(),
        };
        while entity.next().await.is_some_and(|c| c.is_ok()) {}
        let err = materialize_entity(BodyPartEntity::Streamed(entity), &MaterializeConfig::new())
            .await
            .unwrap_err();
        assert_eq!(err, MultipartError::EntityConsumed);
    }
}
