//! Streaming delta contracts and in-memory stream utilities.
//!
//! ```rust
//! use rprovider::{BoxedDeltaStream, TextDelta, VecDeltaStream};
//!
//! let stream = VecDeltaStream::new(vec![Ok(TextDelta::new("hello"))]);
//! let _boxed: BoxedDeltaStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::ProviderError;

/// One incremental fragment of model output. The text may be empty at the
/// protocol level; consumers drop empty fragments before forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    pub text: String,
}

impl TextDelta {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Upstream delta stream contract.
///
/// Invariants for consumers:
/// - Deltas are emitted in the order the provider generated them.
/// - An `Err` item is a mid-stream failure; nothing follows it.
/// - The stream ends (`None`) when the provider signals completion and must not
///   yield additional items afterwards.
pub trait DeltaStream: Stream<Item = Result<TextDelta, ProviderError>> + Send {}

impl<T> DeltaStream for T where T: Stream<Item = Result<TextDelta, ProviderError>> + Send {}

pub type BoxedDeltaStream<'a> = Pin<Box<dyn DeltaStream + 'a>>;

/// Scripted stream that replays a fixed list of items.
#[derive(Debug)]
pub struct VecDeltaStream {
    items: VecDeque<Result<TextDelta, ProviderError>>,
}

impl VecDeltaStream {
    pub fn new(items: Vec<Result<TextDelta, ProviderError>>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|text| Ok(TextDelta::new(text))).collect())
    }
}

impl Stream for VecDeltaStream {
    type Item = Result<TextDelta, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<TextDelta, ProviderError>>> {
        Poll::Ready(self.items.pop_front())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.items.len(), Some(self.items.len()))
    }
}
