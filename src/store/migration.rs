//! Load-time repair of records written in older layouts.
//!
//! Early versions stored a single `tag` string per record. It is converted to
//! the `tags` list when the record is read; the session saves the repaired
//! list on open so the conversion happens once. Text
//! fields that are missing or not strings get the normalizer's fallback text
//! (`NULL`, `UNDEFINED`) so a loaded record never lacks a name or code.

use serde_json::{Map, Value};

use crate::TextNormalizer;
use crate::tags::tags_from_value;

const TEXT_FIELDS: [&str; 2] = ["name", "partNumber"];

/// Repairs one stored record in place. Returns true if anything changed.
pub(super) fn repair_record(value: &mut Value) -> bool {
    let Value::Object(fields) = value else {
        return false;
    };

    let mut changed = migrate_tag_field(fields);

    for field in TEXT_FIELDS {
        if !matches!(fields.get(field), Some(Value::String(_))) {
            let text = TextNormalizer::normalize_value(fields.get(field));
            fields.insert(field.to_string(), Value::String(text));
            changed = true;
        }
    }

    if let Some(Value::Number(n)) = fields.get("id") {
        let id = n.to_string();
        fields.insert("id".to_string(), Value::String(id));
        changed = true;
    }

    changed
}

fn migrate_tag_field(fields: &mut Map<String, Value>) -> bool {
    let Some(legacy) = fields.remove("tag") else {
        return false;
    };

    if !matches!(fields.get("tags"), Some(Value::Array(_))) {
        let tags = tags_from_value(Some(&legacy));
        fields.insert(
            "tags".to_string(),
            Value::Array(tags.into_iter().map(Value::String).collect()),
        );
    }
    true
}
