//! Realtime subscription adapter.
//!
//! Presents typed insert/update/delete callbacks over a channel-based
//! change-notification transport. Each [`Subscription`] owns exactly one
//! channel and releases it exactly once, on [`Subscription::unsubscribe`] or
//! on drop. There is no automatic reconnect; transports report channel
//! failures through `on_error`.

mod errors;
mod handlers;
mod in_memory_transport;
mod realtime_model;
mod realtime_traits;
mod row_filter;
mod subscriber;
mod subscription;

pub use errors::{RealtimeError, RealtimeResult};
pub use handlers::{ChangeCallback, ChangeHandlers, ErrorCallback};
pub use in_memory_transport::InMemoryTransport;
pub use realtime_model::{ChangeEvent, ChangePayload, EventFilter, TableSpec, DEFAULT_SCHEMA};
pub use realtime_traits::{ChannelHandle, ChannelListener, RealtimeTransport};
pub use row_filter::{FilterOp, RowFilter};
pub use subscriber::RealtimeSubscriber;
pub use subscription::{subscribe, Subscription};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(log: &Log) -> ChangeHandlers {
        let (i, u, d, e) = (log.clone(), log.clone(), log.clone(), log.clone());
        ChangeHandlers::new()
            .on_insert(move |p| {
                i.lock().unwrap().push(format!("insert {}", p.table));
                Ok(())
            })
            .on_update(move |p| {
                u.lock().unwrap().push(format!("update {}", p.table));
                Ok(())
            })
            .on_delete(move |p| {
                d.lock().unwrap().push(format!("delete {}", p.table));
                Ok(())
            })
            .on_error(move |err| e.lock().unwrap().push(format!("error {}", err)))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_insert_subscription_only_fires_on_insert() {
        let transport = InMemoryTransport::new();
        let log: Log = Arc::default();
        let spec = TableSpec::new("posts").with_event(ChangeEvent::Insert);

        let _sub = subscribe(&transport, spec, recording(&log)).await;

        assert_eq!(transport.publish(&ChangePayload::insert("posts", json!({"id": 1}))), 1);
        assert_eq!(
            transport.publish(&ChangePayload::update("posts", json!({}), json!({}))),
            0
        );
        assert_eq!(transport.publish(&ChangePayload::delete("posts", json!({}))), 0);

        assert_eq!(entries(&log), vec!["insert posts"]);
    }

    #[tokio::test]
    async fn test_channel_name_is_unique_per_subscription() {
        let transport = InMemoryTransport::new();
        let a = subscribe(&transport, TableSpec::new("posts"), ChangeHandlers::new()).await;
        let b = subscribe(&transport, TableSpec::new("posts"), ChangeHandlers::new()).await;

        assert!(a.channel_name().starts_with("realtime:public:posts:"));
        assert_ne!(a.channel_name(), b.channel_name());
        assert_eq!(transport.active_channels(), 2);
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_exactly_once() {
        let transport = InMemoryTransport::new();
        let sub = subscribe(&transport, TableSpec::new("posts"), ChangeHandlers::new()).await;
        assert!(sub.is_active());

        assert!(sub.unsubscribe());
        assert!(!sub.unsubscribe());
        drop(sub);

        assert_eq!(transport.active_channels(), 0);
        assert_eq!(transport.released_count(), 1);
    }

    #[tokio::test]
    async fn test_drop_releases_channel() {
        let transport = InMemoryTransport::new();
        {
            let _sub = subscribe(&transport, TableSpec::new("posts"), ChangeHandlers::new()).await;
            assert_eq!(transport.active_channels(), 1);
        }
        assert_eq!(transport.active_channels(), 0);
        assert_eq!(transport.released_count(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_reports_and_is_inactive() {
        let transport = InMemoryTransport::new();
        transport.fail_next_open("CHANNEL_ERROR");
        let log: Log = Arc::default();

        let sub = subscribe(&transport, TableSpec::new("posts"), recording(&log)).await;

        assert!(!sub.is_active());
        assert_eq!(
            entries(&log),
            vec!["error Failed to subscribe to realtime:public:posts: CHANNEL_ERROR"]
        );
        assert!(!sub.unsubscribe());
        assert_eq!(transport.released_count(), 0);
    }

    #[tokio::test]
    async fn test_disconnect_reports_connection_closed() {
        let transport = InMemoryTransport::new();
        let log: Log = Arc::default();
        let sub = subscribe(&transport, TableSpec::new("posts"), recording(&log)).await;

        transport.disconnect();

        assert_eq!(entries(&log), vec!["error Connection closed"]);
        assert_eq!(transport.active_channels(), 0);
        assert!(!sub.is_active());
        assert!(!sub.unsubscribe());
        assert_eq!(transport.released_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_reopens_same_spec_after_disconnect() {
        let transport = Arc::new(InMemoryTransport::new());
        let log: Log = Arc::default();
        let mut subscriber = RealtimeSubscriber::new(transport.clone(), recording(&log));
        let spec = TableSpec::new("posts");

        subscriber.update_spec(Some(spec.clone())).await;
        let closed_name = transport.channel_names();
        transport.disconnect();
        assert_eq!(transport.active_channels(), 0);
        assert!(!subscriber.is_active());

        subscriber.update_spec(Some(spec)).await;
        assert!(subscriber.is_active());
        assert_eq!(transport.active_channels(), 1);
        assert_ne!(transport.channel_names(), closed_name);

        transport.publish(&ChangePayload::insert("posts", json!({"id": 1})));
        assert_eq!(entries(&log), vec!["error Connection closed", "insert posts"]);

        // Only the reopened channel was live to release
        subscriber.unsubscribe();
        assert_eq!(transport.active_channels(), 0);
        assert_eq!(transport.released_count(), 1);
    }

    #[tokio::test]
    async fn test_subscriber_switches_channels() {
        let transport = Arc::new(InMemoryTransport::new());
        let log: Log = Arc::default();
        let mut subscriber = RealtimeSubscriber::new(transport.clone(), recording(&log));

        let north = TableSpec::new("posts")
            .with_filter_expr("neighborhood_id=eq.1")
            .unwrap();
        let south = TableSpec::new("posts")
            .with_filter_expr("neighborhood_id=eq.2")
            .unwrap();

        subscriber.update_spec(Some(north.clone())).await;
        let first_name = transport.channel_names();
        subscriber.update_spec(Some(north)).await;
        assert_eq!(transport.channel_names(), first_name);
        assert_eq!(transport.released_count(), 0);

        subscriber.update_spec(Some(south)).await;
        assert_eq!(transport.active_channels(), 1);
        assert_eq!(transport.released_count(), 1);

        transport.publish(&ChangePayload::insert("posts", json!({"neighborhood_id": 1})));
        transport.publish(&ChangePayload::insert("posts", json!({"neighborhood_id": 2})));
        assert_eq!(entries(&log), vec!["insert posts"]);

        subscriber.update_spec(None).await;
        assert!(!subscriber.is_active());
        assert_eq!(transport.active_channels(), 0);
    }
}
