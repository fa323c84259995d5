//! Process-local transport: changes are published in-process and delivered
//! to every open channel whose spec matches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use log::{debug, warn};

use super::errors::RealtimeError;
use super::realtime_model::{ChangePayload, TableSpec};
use super::realtime_traits::{ChannelHandle, ChannelListener, RealtimeTransport};

struct OpenChannel {
    name: String,
    spec: TableSpec,
    listener: Arc<dyn ChannelListener>,
}

#[derive(Default)]
struct Registry {
    channels: HashMap<u64, OpenChannel>,
    fail_next_open: Option<String>,
}

#[derive(Default)]
struct Shared {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
    released: AtomicUsize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|poisoned| {
            warn!("In-memory transport lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTransport {
    shared: Arc<Shared>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` to every matching channel and returns how many
    /// received it.
    pub fn publish(&self, payload: &ChangePayload) -> usize {
        // Listeners may subscribe or unsubscribe, so never call them locked
        let listeners: Vec<Arc<dyn ChannelListener>> = self
            .shared
            .lock()
            .channels
            .values()
            .filter(|channel| channel.spec.matches(payload))
            .map(|channel| Arc::clone(&channel.listener))
            .collect();

        for listener in &listeners {
            listener.on_change(payload);
        }
        listeners.len()
    }

    /// Simulates the backend dropping the connection: every open channel
    /// gets [`RealtimeError::ConnectionClosed`] and is closed.
    pub fn disconnect(&self) {
        let closed: Vec<OpenChannel> = self
            .shared
            .lock()
            .channels
            .drain()
            .map(|(_, channel)| channel)
            .collect();
        for channel in closed {
            debug!("Closing channel {}", channel.name);
            channel.listener.on_channel_error(RealtimeError::ConnectionClosed);
        }
    }

    /// Makes the next `open_channel` call fail with `reason`.
    pub fn fail_next_open(&self, reason: impl Into<String>) {
        self.shared.lock().fail_next_open = Some(reason.into());
    }

    pub fn active_channels(&self) -> usize {
        self.shared.lock().channels.len()
    }

    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .shared
            .lock()
            .channels
            .values()
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Number of open channels released through their handle. Handles of
    /// channels closed by [`disconnect`](Self::disconnect) do not count.
    pub fn released_count(&self) -> usize {
        self.shared.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RealtimeTransport for InMemoryTransport {
    async fn open_channel(
        &self,
        name: &str,
        spec: &TableSpec,
        listener: Arc<dyn ChannelListener>,
    ) -> Result<Box<dyn ChannelHandle>, RealtimeError> {
        let mut registry = self.shared.lock();

        if let Some(reason) = registry.fail_next_open.take() {
            return Err(RealtimeError::SubscribeFailed {
                topic: spec.topic(),
                reason,
            });
        }

        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        registry.channels.insert(
            id,
            OpenChannel {
                name: name.to_string(),
                spec: spec.clone(),
                listener,
            },
        );

        Ok(Box::new(InMemoryChannel {
            id,
            name: name.to_string(),
            shared: Arc::downgrade(&self.shared),
            released: false,
        }))
    }
}

struct InMemoryChannel {
    id: u64,
    name: String,
    shared: Weak<Shared>,
    released: bool,
}

impl ChannelHandle for InMemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) {
        if std::mem::replace(&mut self.released, true) {
            return;
        }
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        // Already gone after a disconnect
        if shared.lock().channels.remove(&self.id).is_some() {
            shared.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for InMemoryChannel {
    fn drop(&mut self) {
        self.release();
    }
}
