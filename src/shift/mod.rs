//! # Shift Module
//!
//! Listing engine for the `shift_daily` collection.
//!
//! A listing request is parsed into a [`ShiftQuery`] and evaluated by a
//! [`ShiftQueryEngine`] in four steps:
//!
//! 1. **Filter**: every `filter_<field>` parameter narrows the working set.
//!    Predicates come from a [`FilterRegistry`]; `day_type`,
//!    `flexible_shift` and `status` map `true`/`false` onto their stored
//!    labels, other fields use strict equality.
//! 2. **Search**: `search` keeps records whose `shift_code` contains the
//!    term, case-insensitively.
//! 3. **Sort**: `order_column` + `order`, or newest `created_at` first.
//! 4. **Paginate**: `_page` / `_limit`, with `meta` describing the full
//!    filtered set.
//!
//! ```rust
//! use shiftdesk::shift::{ShiftQuery, ShiftQueryEngine};
//! use shiftdesk::store::Record;
//! use serde_json::json;
//!
//! let records: Vec<Record> = [
//!     json!({ "id": "a", "shift_code": "MORNING", "day_type": "Working Day" }),
//!     json!({ "id": "b", "shift_code": "NIGHT", "day_type": "OFF" }),
//! ]
//! .into_iter()
//! .filter_map(Record::from_value)
//! .collect();
//!
//! let params = vec![("filter_day_type".to_string(), "true".to_string())];
//! let page = ShiftQueryEngine::default()
//!     .run(&records, &ShiftQuery::from_params(&params))
//!     .unwrap();
//! assert_eq!(page.meta.total_data, 1);
//! ```

mod engine;
mod filters;
mod query;

pub use engine::{PageMeta, QueryError, ShiftPage, ShiftQueryEngine};
pub use filters::{flag, strict_equality, FilterPredicate, FilterRegistry};
pub use query::{OrderBy, ShiftQuery, SortDirection, DEFAULT_LIMIT, DEFAULT_PAGE, FILTER_PREFIX};
