//! JSON rendering of decoded values for inspection

use serde_json::{Map, Number};

use crate::types::TypeRegistry;
use crate::value::Value;

/// Key holding a record's type name
pub const TYPE_KEY: &str = "$type";
/// Key holding a record's map entries
pub const ENTRIES_KEY: &str = "$entries";
/// Key holding a record's collection items
pub const ITEMS_KEY: &str = "$items";

/// Render `value` as JSON
///
/// Records become objects carrying their portable type name under `"$type"`
/// plus their entries and items when present. Non-finite reals render as
/// `null`; chars render as one-character strings.
pub fn to_json<R: TypeRegistry + ?Sized>(value: &Value, registry: &R) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::Int(v) => serde_json::Value::Number(Number::from(*v)),
        Value::F32(v) => real(f64::from(*v)),
        Value::F64(v) => real(*v),
        Value::Char(unit) => {
            serde_json::Value::String(String::from_utf16_lossy(std::slice::from_ref(unit)))
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(array) => serde_json::Value::Array(
            array.items.iter().map(|item| to_json(item, registry)).collect(),
        ),
        Value::Generic(object) => serde_json::Value::Object(
            object
                .iter()
                .map(|(k, v)| (k.to_owned(), to_json(v, registry)))
                .collect(),
        ),
        Value::Record(record) => {
            let mut out = Map::new();
            let type_name = registry
                .name_of(record.handle())
                .unwrap_or(record.type_name());
            out.insert(TYPE_KEY.to_owned(), type_name.into());
            for (name, field) in record.fields() {
                out.insert(name.to_owned(), to_json(field, registry));
            }
            if !record.entries().is_empty() {
                let entries = record
                    .entries()
                    .iter()
                    .map(|(k, v)| (k.to_owned(), to_json(v, registry)))
                    .collect();
                out.insert(ENTRIES_KEY.to_owned(), serde_json::Value::Object(entries));
            }
            if !record.items().is_empty() {
                let items = record
                    .items()
                    .iter()
                    .map(|item| to_json(item, registry))
                    .collect();
                out.insert(ITEMS_KEY.to_owned(), serde_json::Value::Array(items));
            }
            serde_json::Value::Object(out)
        }
    }
}

fn real(v: f64) -> serde_json::Value {
    Number::from_f64(v).map_or(serde_json::Value::Null, serde_json::Value::Number)
}
