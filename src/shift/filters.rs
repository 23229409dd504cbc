use serde_json::Value;
use std::collections::HashMap;

use crate::store::Record;

/// Predicate deciding whether `record` passes a filter on `field` with the raw query value.
pub type FilterPredicate = Box<dyn Fn(&Record, &str, &str) -> bool + Send + Sync>;

/// Named filter predicates with a default for every field not registered.
pub struct FilterRegistry {
    rules: HashMap<&'static str, FilterPredicate>,
    fallback: FilterPredicate,
}

impl FilterRegistry {
    /// Registry with only the strict-equality fallback.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: Box::new(strict_equality),
        }
    }

    /// The `shift_daily` rules: three yes/no style fields mapped onto
    /// their stored labels, strict equality for everything else.
    #[must_use]
    pub fn shift_daily() -> Self {
        let mut registry = Self::empty();
        registry.register("day_type", flag("Working Day", "OFF"));
        registry.register("flexible_shift", flag("Yes", "No"));
        registry.register("status", flag("Active", "Inactive"));
        registry
    }

    pub fn register(&mut self, field: &'static str, predicate: FilterPredicate) {
        self.rules.insert(field, predicate);
    }

    #[must_use]
    pub fn predicate_for(&self, field: &str) -> &FilterPredicate {
        self.rules.get(field).unwrap_or(&self.fallback)
    }

    /// Whether `record` passes the filter `field=raw`.
    #[must_use]
    pub fn matches(&self, record: &Record, field: &str, raw: &str) -> bool {
        (self.predicate_for(field))(record, field, raw)
    }
}

/// `"true"` keeps records whose field is `when_true`, `"false"` keeps
/// `when_false`; any other value keeps nothing.
#[must_use]
pub fn flag(when_true: &'static str, when_false: &'static str) -> FilterPredicate {
    Box::new(move |record: &Record, field: &str, raw: &str| {
        let expected = match raw {
            "true" => when_true,
            "false" => when_false,
            _ => return false,
        };
        record.get(field).and_then(Value::as_str) == Some(expected)
    })
}

/// Literal `"true"`/`"false"` compare as booleans, anything else as a string.
/// No cross-type coercion: `"5"` never matches the number `5`.
#[must_use]
pub fn strict_equality(record: &Record, field: &str, raw: &str) -> bool {
    let expected = match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    };
    record.get(field) == Some(&expected)
}
