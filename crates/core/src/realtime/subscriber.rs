use std::sync::Arc;

use log::debug;

use super::handlers::ChangeHandlers;
use super::realtime_model::TableSpec;
use super::realtime_traits::RealtimeTransport;
use super::subscription::{subscribe, Subscription};

/// Keeps one subscription in sync with a spec that can change over time,
/// e.g. the neighborhood a feed is showing.
pub struct RealtimeSubscriber {
    transport: Arc<dyn RealtimeTransport>,
    handlers: ChangeHandlers,
    current: Option<Subscription>,
}

impl RealtimeSubscriber {
    pub fn new(transport: Arc<dyn RealtimeTransport>, handlers: ChangeHandlers) -> Self {
        Self {
            transport,
            handlers,
            current: None,
        }
    }

    pub fn spec(&self) -> Option<&TableSpec> {
        self.current.as_ref().map(Subscription::spec)
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(Subscription::is_active)
    }

    /// Switches to `spec`. The old channel is released before the new one is
    /// opened; `None` just unsubscribes. An unchanged spec is left alone
    /// while its channel is live and reopened once the transport closed it.
    pub async fn update_spec(&mut self, spec: Option<TableSpec>) {
        if self.spec() == spec.as_ref() && (spec.is_none() || self.is_active()) {
            return;
        }

        if let Some(old) = self.current.take() {
            debug!("Leaving {}", old.channel_name());
            old.unsubscribe();
        }

        if let Some(spec) = spec {
            self.current =
                Some(subscribe(self.transport.as_ref(), spec, self.handlers.clone()).await);
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(old) = self.current.take() {
            old.unsubscribe();
        }
    }
}
