//! Runtime row decoder: checks fetched JSON against a dataset schema

use serde_json::Value as Json;

use super::{DatasetSchema, ValueType};
use crate::error::SchemaViolation;
use crate::row::{Row, Value};

impl DatasetSchema {
    /// Decode a response body into rows.
    ///
    /// The body must be an array of objects whose keys are exactly the
    /// declared column names, each value of the declared type.
    pub fn decode_rows(&self, body: Json) -> Result<Vec<Row>, SchemaViolation> {
        let elements = match body {
            Json::Array(elements) => elements,
            other => {
                return Err(SchemaViolation::NotAnArray {
                    found: json_kind(&other),
                })
            }
        };

        elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| self.decode_row(index, element))
            .collect()
    }

    /// Decode a single array element; `index` is only used for error reporting
    pub fn decode_row(&self, index: usize, element: Json) -> Result<Row, SchemaViolation> {
        let mut object = match element {
            Json::Object(object) => object,
            other => {
                return Err(SchemaViolation::NotAnObject {
                    row: index,
                    found: json_kind(&other),
                })
            }
        };

        let mut row = Row::with_capacity(self.columns.len());
        for column in &self.columns {
            let raw = object
                .remove(&column.name)
                .ok_or_else(|| SchemaViolation::MissingColumn {
                    row: index,
                    column: column.name.clone(),
                })?;

            let found = json_kind(&raw);
            let value = match (column.value_type, raw) {
                (ValueType::String, Json::String(s)) => Some(Value::String(s)),
                (ValueType::Number, Json::Number(n)) => n.as_f64().map(Value::Number),
                _ => None,
            }
            .ok_or_else(|| SchemaViolation::TypeMismatch {
                row: index,
                column: column.name.clone(),
                expected: column.value_type,
                found,
            })?;
            row.insert(column.name.clone(), value);
        }

        // Everything declared has been taken out; leftovers are undeclared
        if let Some(extra) = object.keys().next() {
            return Err(SchemaViolation::UnexpectedColumn {
                row: index,
                column: extra.clone(),
            });
        }

        Ok(row)
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
