use thiserror::Error;

use super::realtime_model::ChangeEvent;

pub type RealtimeResult<T> = Result<T, RealtimeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RealtimeError {
    /// The transport did not confirm the subscription.
    #[error("Failed to subscribe to {topic}: {reason}")]
    SubscribeFailed { topic: String, reason: String },

    /// The transport reported a problem on an open channel.
    #[error("Channel {channel} error: {reason}")]
    ChannelError { channel: String, reason: String },

    #[error("Invalid row filter '{0}'")]
    InvalidFilter(String),

    #[error("{event} handler failed: {message}")]
    HandlerFailed { event: ChangeEvent, message: String },

    #[error("{event} handler panicked: {message}")]
    HandlerPanicked { event: ChangeEvent, message: String },

    #[error("Connection closed")]
    ConnectionClosed,
}
