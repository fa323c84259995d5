//! Change notifications and the table specs that select them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{RealtimeError, RealtimeResult};
use super::row_filter::RowFilter;

pub const DEFAULT_SCHEMA: &str = "public";

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeEvent {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeEvent::Insert => write!(f, "INSERT"),
            ChangeEvent::Update => write!(f, "UPDATE"),
            ChangeEvent::Delete => write!(f, "DELETE"),
        }
    }
}

/// Which change kinds a subscription wants. `*` on the wire means all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventFilter {
    #[default]
    All,
    Only(ChangeEvent),
}

impl EventFilter {
    pub fn accepts(&self, event: ChangeEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Only(only) => *only == event,
        }
    }
}

impl From<ChangeEvent> for EventFilter {
    fn from(event: ChangeEvent) -> Self {
        EventFilter::Only(event)
    }
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventFilter::All => write!(f, "*"),
            EventFilter::Only(event) => event.fmt(f),
        }
    }
}

impl FromStr for EventFilter {
    type Err = RealtimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "*" => Ok(EventFilter::All),
            "INSERT" => Ok(EventFilter::Only(ChangeEvent::Insert)),
            "UPDATE" => Ok(EventFilter::Only(ChangeEvent::Update)),
            "DELETE" => Ok(EventFilter::Only(ChangeEvent::Delete)),
            other => Err(RealtimeError::InvalidFilter(format!("event {}", other))),
        }
    }
}

impl Serialize for EventFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// What to listen to: one table, optionally narrowed by event and row filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    #[serde(default = "default_schema")]
    pub schema: String,
    pub table: String,
    #[serde(default)]
    pub event: EventFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<RowFilter>,
}

impl TableSpec {
    /// All changes on `public.{table}`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: default_schema(),
            table: table.into(),
            event: EventFilter::All,
            filter: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_event(mut self, event: impl Into<EventFilter>) -> Self {
        self.event = event.into();
        self
    }

    pub fn with_filter(mut self, filter: RowFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Parses and attaches a `column=op.value` row filter.
    pub fn with_filter_expr(self, expr: &str) -> RealtimeResult<Self> {
        Ok(self.with_filter(expr.parse()?))
    }

    /// `realtime:{schema}:{table}`
    pub fn topic(&self) -> String {
        format!("realtime:{}:{}", self.schema, self.table)
    }

    pub fn matches(&self, payload: &ChangePayload) -> bool {
        payload.schema == self.schema
            && payload.table == self.table
            && self.event.accepts(payload.event_type)
            && self
                .filter
                .as_ref()
                .map_or(true, |filter| filter.matches(payload))
    }
}

/// One change notification as delivered to handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePayload {
    pub event_type: ChangeEvent,
    #[serde(default = "default_schema")]
    pub schema: String,
    pub table: String,
    /// Row after the change (INSERT/UPDATE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
    /// Row before the change (UPDATE/DELETE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<Value>,
    pub commit_timestamp: DateTime<Utc>,
}

impl ChangePayload {
    fn build(event_type: ChangeEvent, table: &str, new: Option<Value>, old: Option<Value>) -> Self {
        Self {
            event_type,
            schema: default_schema(),
            table: table.to_string(),
            new,
            old,
            commit_timestamp: Utc::now(),
        }
    }

    pub fn insert(table: &str, record: Value) -> Self {
        Self::build(ChangeEvent::Insert, table, Some(record), None)
    }

    pub fn update(table: &str, old: Value, new: Value) -> Self {
        Self::build(ChangeEvent::Update, table, Some(new), Some(old))
    }

    pub fn delete(table: &str, old: Value) -> Self {
        Self::build(ChangeEvent::Delete, table, None, Some(old))
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// The row the change is about: `new` if present, else `old`.
    pub fn record(&self) -> Option<&Value> {
        self.new.as_ref().or(self.old.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_wire_format() {
        let payload: ChangePayload = serde_json::from_value(json!({
            "eventType": "INSERT",
            "table": "posts",
            "new": {"id": 1},
            "commitTimestamp": "2024-05-01T12:00:00Z",
        }))
        .unwrap();

        assert_eq!(payload.event_type, ChangeEvent::Insert);
        assert_eq!(payload.schema, "public");
        assert_eq!(payload.record(), Some(&json!({"id": 1})));
    }

    #[test]
    fn test_event_filter_parsing() {
        assert_eq!("*".parse::<EventFilter>().unwrap(), EventFilter::All);
        assert_eq!(
            "delete".parse::<EventFilter>().unwrap(),
            EventFilter::Only(ChangeEvent::Delete)
        );
        assert!("TRUNCATE".parse::<EventFilter>().is_err());
        assert_eq!(EventFilter::Only(ChangeEvent::Update).to_string(), "UPDATE");
    }

    #[test]
    fn test_spec_matching() {
        let spec = TableSpec::new("posts").with_event(ChangeEvent::Insert);

        assert_eq!(spec.topic(), "realtime:public:posts");
        assert!(spec.matches(&ChangePayload::insert("posts", json!({"id": 1}))));
        assert!(!spec.matches(&ChangePayload::delete("posts", json!({"id": 1}))));
        assert!(!spec.matches(&ChangePayload::insert("comments", json!({"id": 1}))));
        assert!(!spec.matches(
            &ChangePayload::insert("posts", json!({"id": 1})).with_schema("private")
        ));
    }

    #[test]
    fn test_spec_with_row_filter() {
        let spec = TableSpec::new("posts")
            .with_filter_expr("neighborhood_id=eq.42")
            .unwrap();

        assert!(spec.matches(&ChangePayload::insert(
            "posts",
            json!({"neighborhood_id": 42})
        )));
        assert!(!spec.matches(&ChangePayload::insert(
            "posts",
            json!({"neighborhood_id": 7})
        )));
    }
}
