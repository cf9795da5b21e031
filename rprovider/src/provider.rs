use rcommon::BoxFuture;

use crate::{BoxedDeltaStream, ProviderError, StreamRequest};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

/// Opens streaming chat completions against an upstream model API.
///
/// A failed future means the call could not be established at all. Once the
/// stream is returned, failures arrive as `Err` items inside it.
pub trait ModelProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn stream<'a>(
        &'a self,
        request: StreamRequest,
    ) -> ProviderFuture<'a, Result<BoxedDeltaStream<'a>, ProviderError>>;
}
