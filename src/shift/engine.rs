use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

use super::filters::FilterRegistry;
use super::query::{ShiftQuery, SortDirection};
use crate::store::schema::{field_kind, SHIFT_DAILY, SHIFT_SEARCH_FIELD};
use crate::store::values::{compare_values, parse_timestamp};
use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: usize,
    pub per_page: usize,
    pub total_page: usize,
    pub total_data: usize,
}

/// One page of a shift listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftPage {
    pub results: Vec<Record>,
    pub meta: PageMeta,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Every `shift_daily` record must carry a string `shift_code` for search to work
    #[error("record {id} has no string '{field}' to search")]
    MissingSearchField { id: String, field: &'static str },
}

/// Filter, search, sort and paginate `shift_daily` records.
pub struct ShiftQueryEngine {
    filters: FilterRegistry,
}

impl Default for ShiftQueryEngine {
    fn default() -> Self {
        Self::new(FilterRegistry::shift_daily())
    }
}

impl ShiftQueryEngine {
    #[must_use]
    pub fn new(filters: FilterRegistry) -> Self {
        Self { filters }
    }

    /// Run `query` over `records`.
    ///
    /// `total_data` counts records surviving filters and search, before
    /// pagination. Pages past the end are empty, not errors.
    ///
    /// # Errors
    ///
    /// [`QueryError::MissingSearchField`] when a search is requested and a
    /// record still in play has no string `shift_code`.
    pub fn run(&self, records: &[Record], query: &ShiftQuery) -> Result<ShiftPage, QueryError> {
        let mut data: Vec<&Record> = records.iter().collect();

        for (field, raw) in &query.filters {
            data.retain(|r| self.filters.matches(r, field, raw));
        }

        if let Some(term) = &query.search {
            let needle = term.to_lowercase();
            let mut kept = Vec::with_capacity(data.len());
            for record in data {
                let Some(code) = record.get(SHIFT_SEARCH_FIELD).and_then(Value::as_str) else {
                    return Err(QueryError::MissingSearchField {
                        id: record.id().unwrap_or("<none>").to_string(),
                        field: SHIFT_SEARCH_FIELD,
                    });
                };
                if code.to_lowercase().contains(&needle) {
                    kept.push(record);
                }
            }
            data = kept;
        }

        match &query.order {
            Some(order) => {
                let kind = field_kind(SHIFT_DAILY, &order.column);
                data.sort_by(|a, b| {
                    let ord = compare_values(a.get(&order.column), b.get(&order.column), kind);
                    match order.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                });
            }
            None => data.sort_by(|a, b| newest_first(a, b)),
        }

        let total_data = data.len();
        let start = query.page.saturating_sub(1).saturating_mul(query.limit);
        let results: Vec<Record> = data
            .into_iter()
            .skip(start)
            .take(query.limit)
            .cloned()
            .collect();

        debug!(
            filters = query.filters.len(),
            search = query.search.is_some(),
            total_data = total_data,
            returned = results.len(),
            "Shift query evaluated"
        );

        Ok(ShiftPage {
            results,
            meta: PageMeta {
                current_page: query.page,
                per_page: query.limit,
                total_page: total_data.div_ceil(query.limit),
                total_data,
            },
        })
    }
}

/// Descending by `created_at` as an instant; records whose timestamp is
/// missing or unparseable sort after all dated ones.
fn newest_first(a: &Record, b: &Record) -> Ordering {
    let ta = a.created_at().and_then(parse_timestamp);
    let tb = b.created_at().and_then(parse_timestamp);
    match (ta, tb) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
