//! Body part payloads: fully buffered bytes or a single-use byte stream.

use crate::base::context::BodyResultExt;
use crate::base::error::MultipartError;
use crate::base::state::ConsumptionState;
use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use http_body_util::BodyExt;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Boxed chunk stream feeding a streamed entity.
pub type ByteStream = BoxStream<'static, Result<Bytes, MultipartError>>;

/// A single-use byte stream with an advisory length.
///
/// Reading resumes where the previous read stopped. Once the end of the
/// stream (or an error) was observed, further reads yield
/// [`MultipartError::EntityConsumed`].
pub struct StreamedEntity {
    inner: ByteStream,
    declared_length: Option<u64>,
    state: ConsumptionState,
}

impl StreamedEntity {
    pub fn new<S>(stream: S, declared_length: Option<u64>) -> Self
    where
        S: Stream<Item = Result<Bytes, MultipartError>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
            declared_length,
            state: ConsumptionState::NotStarted,
        }
    }

    /// Length announced by the producer. Informational only.
    pub fn declared_length(&self) -> Option<u64> {
        self.declared_length
    }

    pub fn state(&self) -> ConsumptionState {
        self.state
    }
}

impl Stream for StreamedEntity {
    type Item = Result<Bytes, MultipartError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.state == ConsumptionState::Exhausted {
            return Poll::Ready(Some(Err(MultipartError::EntityConsumed)));
        }
        match self.inner.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                self.state = ConsumptionState::InProgress;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                self.state = ConsumptionState::Exhausted;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                self.state = ConsumptionState::Exhausted;
                Poll::Ready(None)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for StreamedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamedEntity")
            .field("declared_length", &self.declared_length)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Payload of a body part.
#[derive(Debug)]
pub enum BodyPartEntity {
    /// Fully buffered; its length is exact.
    Strict(Bytes),
    /// Lazy and single-use.
    Streamed(StreamedEntity),
}

impl Default for BodyPartEntity {
    fn default() -> Self {
        BodyPartEntity::Strict(Bytes::new())
    }
}

impl From<Bytes> for BodyPartEntity {
    fn from(b: Bytes) -> Self {
        BodyPartEntity::Strict(b)
    }
}

impl From<String> for BodyPartEntity {
    fn from(s: String) -> Self {
        BodyPartEntity::Strict(Bytes::from(s))
    }
}

impl From<&'static str> for BodyPartEntity {
    fn from(s: &'static str) -> Self {
        BodyPartEntity::Strict(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Vec<u8>> for BodyPartEntity {
    fn from(v: Vec<u8>) -> Self {
        BodyPartEntity::Strict(Bytes::from(v))
    }
}

impl From<StreamedEntity> for BodyPartEntity {
    fn from(s: StreamedEntity) -> Self {
        BodyPartEntity::Streamed(s)
    }
}

impl BodyPartEntity {
    pub fn strict(data: impl Into<Bytes>) -> Self {
        BodyPartEntity::Strict(data.into())
    }

    pub fn streamed<S>(stream: S, declared_length: Option<u64>) -> Self
    where
        S: Stream<Item = Result<Bytes, MultipartError>> + Send + 'static,
    {
        BodyPartEntity::Streamed(StreamedEntity::new(stream, declared_length))
    }

    /// Wrap any `http_body::Body`, e.g. a request body, as a streamed entity.
    /// Trailers are dropped; an exact size hint becomes the declared length.
    pub fn from_body<B>(body: B) -> Self
    where
        B: http_body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let declared_length = body.size_hint().exact();
        let stream = body.into_data_stream().map(|chunk| chunk.body_context());
        Self::streamed(stream, declared_length)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, BodyPartEntity::Strict(_))
    }

    /// Exact length for strict entities, declared length for streamed ones.
    pub fn content_length(&self) -> Option<u64> {
        match self {
            BodyPartEntity::Strict(b) => Some(b.len() as u64),
            BodyPartEntity::Streamed(s) => s.declared_length(),
        }
    }

    pub fn as_strict(&self) -> Option<&Bytes> {
        match self {
            BodyPartEntity::Strict(b) => Some(b),
            BodyPartEntity::Streamed(_) => None,
        }
    }

    /// Chunk stream of this payload. A strict entity yields one chunk
    /// (or none when empty).
    pub fn into_stream(self) -> ByteStream {
        match self {
            BodyPartEntity::Strict(b) if b.is_empty() => stream::empty().boxed(),
            BodyPartEntity::Strict(b) => stream::once(async move { Ok(b) }).boxed(),
            BodyPartEntity::Streamed(s) => s.boxed(),
        }
    }
}
