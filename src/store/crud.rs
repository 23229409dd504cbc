//! Query-by-example listing for the generic collection routes.

use regex::RegexBuilder;
use serde_json::Value;
use std::cmp::Ordering;

use super::schema::field_kind;
use super::snapshot::Record;
use super::values::{compare_values, lookup_path, to_query_string};

/// Result of a listing: the selected page plus the pre-slice total.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOutcome {
    pub items: Vec<Record>,
    pub total: usize,
}

const DEFAULT_PAGE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Ne,
    Gte,
    Lte,
    Like,
}

fn split_operator(key: &str) -> (&str, Operator) {
    for (suffix, op) in [
        ("_ne", Operator::Ne),
        ("_gte", Operator::Gte),
        ("_lte", Operator::Lte),
        ("_like", Operator::Like),
    ] {
        if let Some(field) = key.strip_suffix(suffix) {
            if !field.is_empty() {
                return (field, op);
            }
        }
    }
    (key, Operator::Eq)
}

fn is_reserved(key: &str) -> bool {
    key.starts_with('_') || key == "q"
}

fn last<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_usize(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
}

fn matches_full_text(record: &Record, needle: &str) -> bool {
    record.fields().any(|(_, v)| match v {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        _ => false,
    })
}

/// List `records` of `collection` filtered, sorted and sliced by `query`.
///
/// Supported parameters:
///
/// - `field=value`: stringified equality; repeated keys are OR-ed
/// - `field_ne`, `field_gte`, `field_lte`, `field_like` (case-insensitive regex)
/// - `q`: case-insensitive full-text over string and number fields
/// - `_sort`, `_order`: comma-separated keys and directions
/// - `_start`, `_end`, `_limit`, or `_page` with `_limit` (default 10)
///
/// Field names may be dotted paths into nested objects.
///
/// # Errors
///
/// Returns the regex error when a `_like` pattern does not compile.
pub fn list_records(
    collection: &str,
    records: &[Record],
    query: &[(String, String)],
) -> Result<ListOutcome, regex::Error> {
    let mut selected: Vec<&Record> = records.iter().collect();

    if let Some(q) = last(query, "q").filter(|q| !q.is_empty()) {
        let needle = q.to_lowercase();
        selected.retain(|r| matches_full_text(r, &needle));
    }

    // Group conditions per (field, operator) so repeated keys OR together
    let mut groups: Vec<((&str, Operator), Vec<&str>)> = Vec::new();
    for (key, value) in query.iter().filter(|(k, _)| !is_reserved(k)) {
        let cond = split_operator(key);
        match groups.iter_mut().find(|(c, _)| *c == cond) {
            Some((_, values)) => values.push(value),
            None => groups.push((cond, vec![value.as_str()])),
        }
    }

    for ((field, op), values) in groups {
        let kind = field_kind(collection, field);
        match op {
            Operator::Eq => selected.retain(|r| {
                lookup_path(r, field)
                    .and_then(to_query_string)
                    .is_some_and(|s| values.iter().any(|v| *v == s))
            }),
            Operator::Ne => selected.retain(|r| {
                lookup_path(r, field)
                    .and_then(to_query_string)
                    .is_none_or(|s| values.iter().all(|v| *v != s))
            }),
            Operator::Like => {
                let patterns = values
                    .iter()
                    .map(|v| RegexBuilder::new(v).case_insensitive(true).build())
                    .collect::<Result<Vec<_>, _>>()?;
                selected.retain(|r| {
                    lookup_path(r, field)
                        .and_then(to_query_string)
                        .is_some_and(|s| patterns.iter().any(|p| p.is_match(&s)))
                });
            }
            Operator::Gte | Operator::Lte => {
                let wanted = if op == Operator::Gte {
                    [Ordering::Greater, Ordering::Equal]
                } else {
                    [Ordering::Less, Ordering::Equal]
                };
                selected.retain(|r| {
                    let Some(actual) = lookup_path(r, field) else {
                        return false;
                    };
                    values.iter().all(|v| {
                        let bound = coerce_bound(actual, v);
                        wanted.contains(&compare_values(Some(actual), Some(&bound), kind))
                    })
                });
            }
        }
    }

    if let Some(sort) = last(query, "_sort").filter(|s| !s.is_empty()) {
        let keys: Vec<&str> = sort.split(',').map(str::trim).collect();
        let orders: Vec<&str> = last(query, "_order")
            .map(|o| o.split(',').map(str::trim).collect())
            .unwrap_or_default();
        selected.sort_by(|a, b| {
            for (idx, key) in keys.iter().enumerate() {
                let kind = field_kind(collection, key);
                let mut ord = compare_values(lookup_path(a, key), lookup_path(b, key), kind);
                if orders.get(idx).is_some_and(|o| o.eq_ignore_ascii_case("desc")) {
                    ord = ord.reverse();
                }
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }

    let total = selected.len();
    let (start, end) = slice_bounds(query, total);
    let items = selected
        .into_iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .cloned()
        .collect();

    Ok(ListOutcome { items, total })
}

/// Coerce a query bound to the JSON type of the value it is compared with.
fn coerce_bound(actual: &Value, raw: &str) -> Value {
    match actual {
        Value::Number(_) => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Value::Bool(_) => raw
            .parse::<bool>()
            .map(Value::Bool)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

fn slice_bounds(query: &[(String, String)], total: usize) -> (usize, usize) {
    let limit = parse_usize(last(query, "_limit"));
    if let Some(page) = parse_usize(last(query, "_page")) {
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_PAGE_LIMIT);
        let start = page.max(1).saturating_sub(1).saturating_mul(limit);
        return (start.min(total), start.saturating_add(limit).min(total));
    }
    let start = parse_usize(last(query, "_start")).unwrap_or(0).min(total);
    let end = match (parse_usize(last(query, "_end")), limit) {
        (Some(end), _) => end,
        (None, Some(limit)) => start.saturating_add(limit),
        (None, None) => total,
    };
    (start, end.min(total).max(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Record> {
        [
            json!({ "id": 1, "title": "alpha", "views": 10, "author": { "name": "ana" } }),
            json!({ "id": 2, "title": "Beta", "views": 25, "author": { "name": "bo" } }),
            json!({ "id": 3, "title": "gamma", "views": 5, "author": { "name": "ana" } }),
            json!({ "id": 4, "title": "delta", "views": 40 }),
        ]
        .into_iter()
        .filter_map(Record::from_value)
        .collect()
    }

    fn q(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ids(outcome: &ListOutcome) -> Vec<i64> {
        outcome
            .items
            .iter()
            .filter_map(|r| r.id_value().and_then(Value::as_i64))
            .collect()
    }

    #[test]
    fn test_no_query_returns_everything() {
        let out = list_records("posts", &records(), &[]).unwrap();
        assert_eq!(out.total, 4);
        assert_eq!(ids(&out), [1, 2, 3, 4]);
    }

    #[test]
    fn test_equality_repeated_keys_or() {
        let out = list_records("posts", &records(), &q(&[("id", "1"), ("id", "3")])).unwrap();
        assert_eq!(ids(&out), [1, 3]);
        let out = list_records("posts", &records(), &q(&[("author.name", "ana")])).unwrap();
        assert_eq!(ids(&out), [1, 3]);
    }

    #[test]
    fn test_operators() {
        let out = list_records("posts", &records(), &q(&[("views_gte", "10"), ("views_lte", "25")])).unwrap();
        assert_eq!(ids(&out), [1, 2]);
        let out = list_records("posts", &records(), &q(&[("id_ne", "2")])).unwrap();
        assert_eq!(ids(&out), [1, 3, 4]);
        let out = list_records("posts", &records(), &q(&[("title_like", "^b")])).unwrap();
        assert_eq!(ids(&out), [2]);
        assert!(list_records("posts", &records(), &q(&[("title_like", "(")])).is_err());
    }

    #[test]
    fn test_full_text() {
        let out = list_records("posts", &records(), &q(&[("q", "TA")])).unwrap();
        assert_eq!(ids(&out), [2, 4]);
    }

    #[test]
    fn test_sort_and_slice() {
        let out = list_records("posts", &records(), &q(&[("_sort", "views"), ("_order", "desc")])).unwrap();
        assert_eq!(ids(&out), [4, 2, 1, 3]);

        let out = list_records(
            "posts",
            &records(),
            &q(&[("_sort", "views"), ("_page", "2"), ("_limit", "3")]),
        )
        .unwrap();
        assert_eq!(out.total, 4);
        assert_eq!(ids(&out), [4]);

        let out = list_records("posts", &records(), &q(&[("_start", "1"), ("_end", "3")])).unwrap();
        assert_eq!(ids(&out), [2, 3]);
        let out = list_records("posts", &records(), &q(&[("_limit", "2")])).unwrap();
        assert_eq!(ids(&out), [1, 2]);
        let out = list_records("posts", &records(), &q(&[("_start", "9")])).unwrap();
        assert!(out.items.is_empty());
    }
}
