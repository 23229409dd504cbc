use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::{CREATED_AT_FIELD, ID_FIELD};
use super::StoreError;

/// One document of a collection.
///
/// Records stay loosely typed: `id` and `created_at` have typed accessors,
/// every other field is reached through [`Record::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from an arbitrary JSON value; `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    /// Raw `id` value, whatever its JSON type.
    #[must_use]
    pub fn id_value(&self) -> Option<&Value> {
        self.0.get(ID_FIELD)
    }

    /// `id` when it is a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id_value().and_then(Value::as_str)
    }

    /// `created_at` when it is a string.
    #[must_use]
    pub fn created_at(&self) -> Option<&str> {
        self.0.get(CREATED_AT_FIELD).and_then(Value::as_str)
    }

    /// Whether the stringified `id` equals `id`, the way path parameters are compared.
    #[must_use]
    pub fn id_matches(&self, id: &str) -> bool {
        match self.id_value() {
            Some(Value::String(s)) => s == id,
            Some(Value::Number(n)) => n.to_string() == id,
            _ => false,
        }
    }

    /// Shallow-merge `patch` over this record.
    pub fn merge(&mut self, patch: &Record) {
        for (k, v) in &patch.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// A top-level entry of the backing document.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    /// Array of records, addressable by id
    Collection(Vec<Record>),
    /// Object value addressed as a whole
    Singular(Record),
    /// Any other JSON value; listed as-is, never mutated
    Other(Value),
}

impl Resource {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                if items.iter().all(Value::is_object) {
                    Resource::Collection(items.into_iter().filter_map(Record::from_value).collect())
                } else {
                    Resource::Other(Value::Array(items))
                }
            }
            Value::Object(map) => Resource::Singular(Record::new(map)),
            other => Resource::Other(other),
        }
    }

    /// The resource as it appears in the backing file.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Resource::Collection(records) => {
                Value::Array(records.iter().cloned().map(Record::into_value).collect())
            }
            Resource::Singular(record) => record.clone().into_value(),
            Resource::Other(v) => v.clone(),
        }
    }
}

/// Immutable view of every resource in the backing file at one point in time.
///
/// A new snapshot is built for every mutation and every reload; readers keep
/// the `Arc<Snapshot>` they loaded for the whole request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    resources: Vec<(String, Resource)>,
}

impl Snapshot {
    /// Parse the backing file contents. The root must be a JSON object.
    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        let root: Value = serde_json::from_str(raw)?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self, StoreError> {
        let Value::Object(map) = root else {
            return Err(StoreError::RootNotObject);
        };
        let resources = map
            .into_iter()
            .map(|(name, value)| (name, Resource::from_value(value)))
            .collect();
        Ok(Self { resources })
    }

    /// Serialize back to the on-disk form (two-space indented JSON).
    pub fn to_json_string(&self) -> Result<String, StoreError> {
        let mut root = Map::new();
        for (name, resource) in &self.resources {
            root.insert(name.clone(), resource.to_value());
        }
        Ok(serde_json::to_string_pretty(&Value::Object(root))?)
    }

    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub(crate) fn resource_mut(&mut self, name: &str) -> Option<&mut Resource> {
        self.resources
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    /// Records of a collection.
    pub fn collection(&self, name: &str) -> Result<&[Record], StoreError> {
        match self.resource(name) {
            Some(Resource::Collection(records)) => Ok(records),
            Some(_) => Err(StoreError::NotACollection(name.to_string())),
            None => Err(StoreError::UnknownCollection(name.to_string())),
        }
    }

    pub(crate) fn collection_mut(&mut self, name: &str) -> Result<&mut Vec<Record>, StoreError> {
        match self.resource_mut(name) {
            Some(Resource::Collection(records)) => Ok(records),
            Some(_) => Err(StoreError::NotACollection(name.to_string())),
            None => Err(StoreError::UnknownCollection(name.to_string())),
        }
    }

    /// Record of `collection` whose `id` is the string `id` (strict match).
    #[must_use]
    pub fn find_by_id(&self, collection: &str, id: &str) -> Option<&Record> {
        self.collection(collection)
            .ok()?
            .iter()
            .find(|r| r.id() == Some(id))
    }

    /// Names of all top-level resources in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mixed_resources() {
        let snap = Snapshot::from_value(json!({
            "shift_daily": [{ "id": "a", "shift_code": "MORNING" }],
            "profile": { "name": "ops" },
            "tags": ["x", "y"]
        }))
        .unwrap();
        assert_eq!(snap.collection("shift_daily").unwrap().len(), 1);
        assert!(matches!(snap.resource("profile"), Some(Resource::Singular(_))));
        assert!(matches!(snap.resource("tags"), Some(Resource::Other(_))));
        assert!(matches!(
            snap.collection("profile"),
            Err(StoreError::NotACollection(_))
        ));
        assert!(matches!(
            snap.collection("missing"),
            Err(StoreError::UnknownCollection(_))
        ));
        assert_eq!(snap.names().collect::<Vec<_>>(), ["shift_daily", "profile", "tags"]);
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            Snapshot::from_json_str("[1, 2]"),
            Err(StoreError::RootNotObject)
        ));
        assert!(matches!(
            Snapshot::from_json_str("{ not json"),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn test_find_by_id_is_strict() {
        let snap = Snapshot::from_value(json!({
            "shift_daily": [{ "id": 7 }, { "id": "7" }, { "id": "8", "created_at": "2024-01-01T00:00:00.000Z" }]
        }))
        .unwrap();
        let found = snap.find_by_id("shift_daily", "7").unwrap();
        assert_eq!(found.id_value(), Some(&json!("7")));
        assert_eq!(
            snap.find_by_id("shift_daily", "8").unwrap().created_at(),
            Some("2024-01-01T00:00:00.000Z")
        );
        assert!(snap.find_by_id("shift_daily", "9").is_none());
    }

    #[test]
    fn test_id_matches_stringifies_numbers() {
        let rec = Record::from_value(json!({ "id": 12 })).unwrap();
        assert!(rec.id_matches("12"));
        assert!(!rec.id_matches("13"));
    }

    #[test]
    fn test_serialization_keeps_file_order() {
        let raw = r#"{"b":[{"id":"1"}],"a":{"x":1}}"#;
        let snap = Snapshot::from_json_str(raw).unwrap();
        let out = snap.to_json_string().unwrap();
        assert!(out.find("\"b\"").unwrap() < out.find("\"a\"").unwrap());
    }
}
