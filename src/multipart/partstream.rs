use crate::base::error::MultipartError;
use crate::base::state::ConsumptionState;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Single-use, ordered sequence of body parts.
///
/// Yields parts in emission order. After the end (or an error) has been
/// observed, every further read yields [`MultipartError::PartsConsumed`].
pub struct PartStream<P> {
    inner: BoxStream<'static, Result<P, MultipartError>>,
    state: ConsumptionState,
}

impl<P: Send + 'static> PartStream<P> {
    pub fn new<S>(parts: S) -> Self
    where
        S: Stream<Item = Result<P, MultipartError>> + Send + 'static,
    {
        Self {
            inner: parts.boxed(),
            state: ConsumptionState::NotStarted,
        }
    }

    /// A stream over parts that are already available.
    pub fn from_parts(parts: Vec<P>) -> Self {
        Self::new(stream::iter(parts.into_iter().map(Ok)))
    }

    pub fn empty() -> Self {
        Self::new(stream::empty())
    }
}

impl<P> PartStream<P> {
    pub fn state(&self) -> ConsumptionState {
        self.state
    }

    /// Pull the next part. `Ok(None)` marks the end of the sequence.
    pub async fn next_part(&mut self) -> Result<Option<P>, MultipartError> {
        self.next().await.transpose()
    }
}

impl<P> Stream for PartStream<P> {
    type Item = Result<P, MultipartError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.state == ConsumptionState::Exhausted {
            return Poll::Ready(Some(Err(MultipartError::PartsConsumed)));
        }
        let polled = self.inner.poll_next_unpin(cx);
        match &polled {
            Poll::Pending => {}
            Poll::Ready(Some(Ok(_))) => self.state = ConsumptionState::InProgress,
            Poll::Ready(Some(Err(_))) | Poll::Ready(None) => {
                self.state = ConsumptionState::Exhausted
            }
        }
        polled
    }
}

impl<P> fmt::Debug for PartStream<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartStream")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
