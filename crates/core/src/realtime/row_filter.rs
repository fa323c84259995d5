//! Row-level filters in PostgREST notation: `column=op.value`.
//!
//! Supported operators are `eq`, `neq`, `gt`, `gte`, `lt`, `lte` and
//! `in.(a,b,c)`. Operands are compared numerically when both sides parse as
//! numbers, otherwise as text.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::RealtimeError;
use super::realtime_model::ChangePayload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    Eq(String),
    Neq(String),
    Gt(String),
    Gte(String),
    Lt(String),
    Lte(String),
    In(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub op: FilterOp,
}

impl RowFilter {
    pub fn new(column: impl Into<String>, op: FilterOp) -> Self {
        Self {
            column: column.into(),
            op,
        }
    }

    /// Evaluates against the payload's `new` row, or `old` for deletes.
    /// A missing row or column never matches.
    pub fn matches(&self, payload: &ChangePayload) -> bool {
        payload
            .record()
            .and_then(|record| record.get(&self.column))
            .is_some_and(|value| self.matches_value(value))
    }

    pub fn matches_value(&self, value: &Value) -> bool {
        let field = as_text(value);
        match &self.op {
            FilterOp::Eq(operand) => compare(&field, operand) == Ordering::Equal,
            FilterOp::Neq(operand) => compare(&field, operand) != Ordering::Equal,
            FilterOp::Gt(operand) => compare(&field, operand) == Ordering::Greater,
            FilterOp::Gte(operand) => compare(&field, operand) != Ordering::Less,
            FilterOp::Lt(operand) => compare(&field, operand) == Ordering::Less,
            FilterOp::Lte(operand) => compare(&field, operand) != Ordering::Greater,
            FilterOp::In(operands) => operands
                .iter()
                .any(|operand| compare(&field, operand) == Ordering::Equal),
        }
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(field: &str, operand: &str) -> Ordering {
    match (field.parse::<f64>(), operand.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Less),
        _ => field.cmp(operand),
    }
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

impl FromStr for RowFilter {
    type Err = RealtimeError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let invalid = || RealtimeError::InvalidFilter(expr.to_string());

        let (column, rest) = expr.split_once('=').ok_or_else(invalid)?;
        let column = column.trim();
        if column.is_empty() {
            return Err(invalid());
        }

        let (op, operand) = rest.trim().split_once('.').ok_or_else(invalid)?;
        let scalar = || unquote(operand).to_string();
        let op = match op {
            "eq" => FilterOp::Eq(scalar()),
            "neq" => FilterOp::Neq(scalar()),
            "gt" => FilterOp::Gt(scalar()),
            "gte" => FilterOp::Gte(scalar()),
            "lt" => FilterOp::Lt(scalar()),
            "lte" => FilterOp::Lte(scalar()),
            "in" => {
                let list = operand
                    .trim()
                    .strip_prefix('(')
                    .and_then(|s| s.strip_suffix(')'))
                    .ok_or_else(invalid)?;
                let items: Vec<String> = list
                    .split(',')
                    .map(unquote)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if items.is_empty() {
                    return Err(invalid());
                }
                FilterOp::In(items)
            }
            _ => return Err(invalid()),
        };

        Ok(Self::new(column, op))
    }
}

impl fmt::Display for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            FilterOp::Eq(v) => write!(f, "{}=eq.{}", self.column, v),
            FilterOp::Neq(v) => write!(f, "{}=neq.{}", self.column, v),
            FilterOp::Gt(v) => write!(f, "{}=gt.{}", self.column, v),
            FilterOp::Gte(v) => write!(f, "{}=gte.{}", self.column, v),
            FilterOp::Lt(v) => write!(f, "{}=lt.{}", self.column, v),
            FilterOp::Lte(v) => write!(f, "{}=lte.{}", self.column, v),
            FilterOp::In(values) => write!(f, "{}=in.({})", self.column, values.join(",")),
        }
    }
}

impl Serialize for RowFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RowFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(expr: &str) -> RowFilter {
        expr.parse().unwrap()
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!(
            filter("author_id=eq.abc-123"),
            RowFilter::new("author_id", FilterOp::Eq("abc-123".to_string()))
        );
        assert_eq!(
            filter("score=gte.1.5"),
            RowFilter::new("score", FilterOp::Gte("1.5".to_string()))
        );
        assert_eq!(
            filter("status=in.(open, \"in review\")"),
            RowFilter::new(
                "status",
                FilterOp::In(vec!["open".to_string(), "in review".to_string()])
            )
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for expr in ["", "id", "=eq.1", "id=like.%a%", "id=eq", "id=in.1,2", "id=in.()"] {
            assert!(
                matches!(expr.parse::<RowFilter>(), Err(RealtimeError::InvalidFilter(_))),
                "{} should be rejected",
                expr
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        for expr in ["id=eq.5", "n=neq.x", "id=in.(1,2,3)", "t=lt.2024-01-01"] {
            assert_eq!(filter(expr).to_string(), expr);
        }
    }

    #[test]
    fn test_numeric_and_text_comparison() {
        assert!(filter("n=eq.42").matches_value(&json!(42)));
        assert!(filter("n=eq.42").matches_value(&json!(42.0)));
        assert!(filter("n=gt.9").matches_value(&json!(10)));
        assert!(!filter("n=lt.9").matches_value(&json!(10)));
        assert!(filter("n=lte.10").matches_value(&json!("10")));
        assert!(filter("s=neq.draft").matches_value(&json!("published")));
        assert!(filter("b=eq.true").matches_value(&json!(true)));
        assert!(filter("id=in.(1,2,3)").matches_value(&json!(2)));
        assert!(!filter("id=in.(1,2,3)").matches_value(&json!(4)));
    }

    #[test]
    fn test_matches_uses_old_row_for_deletes() {
        let f = filter("neighborhood_id=eq.7");
        assert!(f.matches(&ChangePayload::delete("posts", json!({"neighborhood_id": 7}))));
        assert!(!f.matches(&ChangePayload::insert("posts", json!({"other": 7}))));
    }
}
