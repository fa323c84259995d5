use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use uuid::Uuid;

use super::errors::RealtimeError;
use super::handlers::ChangeHandlers;
use super::realtime_model::{ChangePayload, TableSpec};
use super::realtime_traits::{ChannelHandle, ChannelListener, RealtimeTransport};

/// Opens one uniquely named channel for `spec` and routes its changes to
/// `handlers`.
///
/// Never fails: if the transport refuses the channel, `on_error` is called
/// and the returned subscription is inactive.
pub async fn subscribe(
    transport: &dyn RealtimeTransport,
    spec: TableSpec,
    handlers: ChangeHandlers,
) -> Subscription {
    let name = format!("{}:{}", spec.topic(), Uuid::new_v4());
    let closed = Arc::new(AtomicBool::new(false));
    let listener: Arc<dyn ChannelListener> = Arc::new(ClosingListener {
        handlers: handlers.clone(),
        closed: Arc::clone(&closed),
    });

    let handle = match transport.open_channel(&name, &spec, listener).await {
        Ok(handle) => {
            info!("Subscribed to {} ({})", spec.topic(), spec.event);
            Some(handle)
        }
        Err(e) => {
            let err = match e {
                RealtimeError::SubscribeFailed { .. } => e,
                other => RealtimeError::SubscribeFailed {
                    topic: spec.topic(),
                    reason: other.to_string(),
                },
            };
            handlers.report(err);
            None
        }
    };

    Subscription {
        name,
        spec,
        handle: Mutex::new(handle),
        closed,
    }
}

/// Forwards to the handlers and remembers when the transport closed the
/// channel underneath the subscription.
struct ClosingListener {
    handlers: ChangeHandlers,
    closed: Arc<AtomicBool>,
}

impl ChannelListener for ClosingListener {
    fn on_change(&self, payload: &ChangePayload) {
        self.handlers.on_change(payload);
    }

    fn on_channel_error(&self, err: RealtimeError) {
        if matches!(
            err,
            RealtimeError::ConnectionClosed | RealtimeError::ChannelError { .. }
        ) {
            self.closed.store(true, Ordering::SeqCst);
        }
        self.handlers.report(err);
    }
}

/// A live (or failed) subscription. Dropping it unsubscribes.
pub struct Subscription {
    name: String,
    spec: TableSpec,
    handle: Mutex<Option<Box<dyn ChannelHandle>>>,
    closed: Arc<AtomicBool>,
}

impl Subscription {
    pub fn channel_name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    /// `false` once released, if the open failed, or after the transport
    /// closed the channel.
    pub fn is_active(&self) -> bool {
        self.lock().is_some() && !self.is_closed()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Releases the channel. Returns `false` if it was already released,
    /// never opened, or closed by the transport.
    pub fn unsubscribe(&self) -> bool {
        let Some(mut handle) = self.lock().take() else {
            return false;
        };
        handle.release();
        if self.is_closed() {
            debug!("Dropped handle of closed channel {}", handle.name());
            return false;
        }
        debug!("Released channel {}", handle.name());
        true
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn ChannelHandle>>> {
        self.handle.lock().unwrap_or_else(|poisoned| {
            warn!("Subscription lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
