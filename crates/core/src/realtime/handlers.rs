//! Typed insert/update/delete callbacks and their error isolation.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error, warn};

use super::errors::RealtimeError;
use super::realtime_model::{ChangeEvent, ChangePayload};
use super::realtime_traits::ChannelListener;

pub type ChangeCallback = Arc<dyn Fn(&ChangePayload) -> anyhow::Result<()> + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(RealtimeError) + Send + Sync>;

/// Callbacks for one subscription. Every slot is optional.
///
/// A callback that returns `Err` or panics never takes the subscription down;
/// the failure is handed to `on_error` instead.
#[derive(Clone, Default)]
pub struct ChangeHandlers {
    on_insert: Option<ChangeCallback>,
    on_update: Option<ChangeCallback>,
    on_delete: Option<ChangeCallback>,
    on_error: Option<ErrorCallback>,
}

impl fmt::Debug for ChangeHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeHandlers")
            .field("on_insert", &self.on_insert.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl ChangeHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_insert<F>(mut self, f: F) -> Self
    where
        F: Fn(&ChangePayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_insert = Some(Arc::new(f));
        self
    }

    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&ChangePayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(f));
        self
    }

    pub fn on_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&ChangePayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_delete = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(RealtimeError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    fn callback_for(&self, event: ChangeEvent) -> Option<&ChangeCallback> {
        match event {
            ChangeEvent::Insert => self.on_insert.as_ref(),
            ChangeEvent::Update => self.on_update.as_ref(),
            ChangeEvent::Delete => self.on_delete.as_ref(),
        }
    }

    /// Routes `payload` to the callback for its event type.
    pub fn dispatch(&self, payload: &ChangePayload) {
        let event = payload.event_type;
        let Some(callback) = self.callback_for(event) else {
            debug!("No {} handler for {}", event, payload.table);
            return;
        };

        match catch_unwind(AssertUnwindSafe(|| callback(payload))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.report(RealtimeError::HandlerFailed {
                event,
                message: format!("{:#}", e),
            }),
            Err(panic) => self.report(RealtimeError::HandlerPanicked {
                event,
                message: panic_message(panic.as_ref()),
            }),
        }
    }

    /// Hands `err` to `on_error`, or logs it when there is none.
    pub fn report(&self, err: RealtimeError) {
        warn!("Realtime error: {}", err);
        let Some(on_error) = &self.on_error else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| on_error(err))).is_err() {
            error!("Realtime on_error handler panicked");
        }
    }
}

impl ChannelListener for ChangeHandlers {
    fn on_change(&self, payload: &ChangePayload) {
        self.dispatch(payload);
    }

    fn on_channel_error(&self, error: RealtimeError) {
        self.report(error);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
