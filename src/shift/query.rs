use crate::server::QueryVec;

/// Query-parameter prefix marking a per-field filter (`filter_status=true`).
pub const FILTER_PREFIX: &str = "filter_";

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `"desc"` sorts descending; every other value ascending.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

/// Request-scoped listing query for `shift_daily`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftQuery {
    pub page: usize,
    pub limit: usize,
    /// `(field, raw value)` pairs in request order, prefix stripped
    pub filters: Vec<(String, String)>,
    pub search: Option<String>,
    /// `None` selects the default newest-first ordering
    pub order: Option<OrderBy>,
}

impl Default for ShiftQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            filters: Vec::new(),
            search: None,
            order: None,
        }
    }
}

fn last<'a>(params: &'a QueryVec, key: &str) -> Option<&'a str> {
    params
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Leading-digit integer or `default`.
///
/// Parsing stops at the first non-digit, so `"2abc"` is 2 and `"5.9"` is 5.
/// Absent, digitless, negative and zero values fall back.
fn positive_or(raw: Option<&str>, default: usize) -> usize {
    raw.map(|s| {
        let s = s.trim_start();
        let s = s.strip_prefix('+').unwrap_or(s);
        let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        &s[..end]
    })
    .and_then(|digits| digits.parse::<usize>().ok())
    .filter(|n| *n > 0)
    .unwrap_or(default)
}

impl ShiftQuery {
    /// Build the query from decoded query-string pairs.
    ///
    /// `order_column` alone sorts ascending; an explicitly empty `order`
    /// disables column ordering. An empty `search` is ignored.
    #[must_use]
    pub fn from_params(params: &QueryVec) -> Self {
        let filters = params
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(FILTER_PREFIX)
                    .map(|field| (field.to_string(), v.clone()))
            })
            .collect();

        let search = last(params, "search")
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let order_value = last(params, "order");
        let order = last(params, "order_column")
            .filter(|c| !c.is_empty() && order_value != Some(""))
            .map(|column| OrderBy {
                column: column.to_string(),
                direction: SortDirection::parse(order_value),
            });

        Self {
            page: positive_or(last(params, "_page"), DEFAULT_PAGE),
            limit: positive_or(last(params, "_limit"), DEFAULT_LIMIT),
            filters,
            search,
            order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryVec {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ShiftQuery::from_params(&QueryVec::new()), ShiftQuery::default());
    }

    #[test]
    fn test_pagination_fallbacks() {
        let q = ShiftQuery::from_params(&params(&[("_page", "abc"), ("_limit", "0")]));
        assert_eq!((q.page, q.limit), (1, 10));
        let q = ShiftQuery::from_params(&params(&[("_page", "3"), ("_limit", "25")]));
        assert_eq!((q.page, q.limit), (3, 25));
        let q = ShiftQuery::from_params(&params(&[("_page", "-2")]));
        assert_eq!(q.page, 1);
    }

    #[test]
    fn test_pagination_reads_leading_digits() {
        let q = ShiftQuery::from_params(&params(&[("_page", "2abc"), ("_limit", "5.9")]));
        assert_eq!((q.page, q.limit), (2, 5));
        let q = ShiftQuery::from_params(&params(&[("_page", " +4"), ("_limit", "x5")]));
        assert_eq!((q.page, q.limit), (4, 10));
    }

    #[test]
    fn test_filters_strip_prefix_in_order() {
        let q = ShiftQuery::from_params(&params(&[
            ("filter_status", "true"),
            ("search", "mor"),
            ("filter_shift_code", "NIGHT"),
            ("status", "ignored"),
        ]));
        assert_eq!(
            q.filters,
            vec![
                ("status".to_string(), "true".to_string()),
                ("shift_code".to_string(), "NIGHT".to_string())
            ]
        );
        assert_eq!(q.search.as_deref(), Some("mor"));
    }

    #[test]
    fn test_ordering_rules() {
        let q = ShiftQuery::from_params(&params(&[("order_column", "shift_code"), ("order", "desc")]));
        assert_eq!(
            q.order,
            Some(OrderBy {
                column: "shift_code".into(),
                direction: SortDirection::Desc
            })
        );

        let q = ShiftQuery::from_params(&params(&[("order_column", "shift_code")]));
        assert_eq!(q.order.map(|o| o.direction), Some(SortDirection::Asc));

        let q = ShiftQuery::from_params(&params(&[("order_column", "shift_code"), ("order", "")]));
        assert!(q.order.is_none());

        let q = ShiftQuery::from_params(&params(&[("order_column", ""), ("order", "asc")]));
        assert!(q.order.is_none());
    }

    #[test]
    fn test_empty_search_ignored() {
        let q = ShiftQuery::from_params(&params(&[("search", "")]));
        assert!(q.search.is_none());
    }
}
