//! Comparison and coercion helpers shared by the listing engines.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use super::schema::FieldKind;
use super::snapshot::Record;

/// Current instant in the on-disk timestamp format (`2024-05-01T08:00:00.000Z`).
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Order two field values by their natural type order.
///
/// Numbers compare numerically, strings lexicographically (chronologically
/// for [`FieldKind::Timestamp`] when both parse), booleans `false < true`.
/// Missing values and mismatched types compare equal, so a stable sort
/// leaves them in insertion order.
#[must_use]
pub fn compare_values(a: Option<&Value>, b: Option<&Value>, kind: Option<FieldKind>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Some(Value::String(x)), Some(Value::String(y))) => {
            if kind == Some(FieldKind::Timestamp) {
                if let (Some(x), Some(y)) = (parse_timestamp(x), parse_timestamp(y)) {
                    return x.cmp(&y);
                }
            }
            x.cmp(y)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Render a scalar the way query strings spell it; `None` for
/// null, arrays and objects.
#[must_use]
pub fn to_query_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Resolve a dotted field path (`author.name`) inside a record.
#[must_use]
pub fn lookup_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = record.get(first)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
