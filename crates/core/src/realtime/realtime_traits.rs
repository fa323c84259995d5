use std::sync::Arc;

use async_trait::async_trait;

use super::errors::RealtimeError;
use super::realtime_model::{ChangePayload, TableSpec};

/// Receives everything a transport has to say about one channel.
pub trait ChannelListener: Send + Sync {
    fn on_change(&self, payload: &ChangePayload);

    /// Called when the channel fails after it was opened.
    fn on_channel_error(&self, error: RealtimeError);
}

/// An open channel. Owned by exactly one subscription.
pub trait ChannelHandle: Send {
    fn name(&self) -> &str;

    /// Stops delivery and frees transport resources. Idempotent.
    fn release(&mut self);
}

/// A change-notification backend.
///
/// Implementations resolve `open_channel` only once the backend has
/// confirmed the subscription; any other outcome is an error.
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    async fn open_channel(
        &self,
        name: &str,
        spec: &TableSpec,
        listener: Arc<dyn ChannelListener>,
    ) -> Result<Box<dyn ChannelHandle>, RealtimeError>;
}
