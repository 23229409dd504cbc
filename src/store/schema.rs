//! Static schema declarations for the collections the service knows about.
//!
//! The backing file may hold any number of collections; only the ones
//! declared here get typed treatment (timestamp-aware sorting, the search
//! field for shift listings). Undeclared collections and undeclared fields
//! fall back to plain JSON value semantics.

/// Kind of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Bool,
    /// ISO-8601 string compared as an instant rather than as text
    Timestamp,
}

/// A declared field of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Declaration of one collection.
#[derive(Debug, Clone, Copy)]
pub struct CollectionSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl CollectionSchema {
    /// Kind of `field`, if declared.
    #[must_use]
    pub fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.kind)
    }
}

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";

pub const SHIFT_DAILY: &str = "shift_daily";
pub const FIND_ALL_MENU: &str = "find_all_menu";

/// Field `search` matches against in shift listings.
pub const SHIFT_SEARCH_FIELD: &str = "shift_code";

const SHIFT_DAILY_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: ID_FIELD, kind: FieldKind::String },
    FieldSpec { name: "shift_code", kind: FieldKind::String },
    FieldSpec { name: "day_type", kind: FieldKind::String },
    FieldSpec { name: "flexible_shift", kind: FieldKind::String },
    FieldSpec { name: "status", kind: FieldKind::String },
    FieldSpec { name: CREATED_AT_FIELD, kind: FieldKind::Timestamp },
];

const FIND_ALL_MENU_FIELDS: &[FieldSpec] = &[FieldSpec { name: ID_FIELD, kind: FieldKind::String }];

/// Every collection with a static declaration.
pub const SCHEMAS: &[CollectionSchema] = &[
    CollectionSchema {
        name: SHIFT_DAILY,
        fields: SHIFT_DAILY_FIELDS,
    },
    CollectionSchema {
        name: FIND_ALL_MENU,
        fields: FIND_ALL_MENU_FIELDS,
    },
];

/// Look up the declaration for `collection`.
#[must_use]
pub fn schema_for(collection: &str) -> Option<&'static CollectionSchema> {
    SCHEMAS.iter().find(|s| s.name == collection)
}

/// Kind of `field` in `collection`, `None` when either is undeclared.
#[must_use]
pub fn field_kind(collection: &str, field: &str) -> Option<FieldKind> {
    schema_for(collection).and_then(|s| s.field_kind(field))
}
