//! Declarative dataset schema
//!
//! The serialized layout matches the JSON the dashboard configuration uses:
//! `{"id", "route", "dataset_schema": {"columns": [{"name", "valueType"}]}}`.

use std::fmt;

use serde::{Deserialize, Serialize};

mod decode;

/// The type of the values in a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column schema: the name of the column and the type of its values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "valueType")]
    pub value_type: ValueType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }

    /// A column holding strings
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::String)
    }

    /// A column holding numbers
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Number)
    }
}

/// Ordered list of columns describing every row of a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub columns: Vec<ColumnSchema>,
}

impl DatasetSchema {
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// First column name that appears more than once, if any
    pub fn duplicate_column(&self) -> Option<&str> {
        let mut seen = ahash::AHashSet::with_capacity(self.columns.len());
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .find(|name| !seen.insert(*name))
    }
}

/// Kind of dataset served by the backend. Only tabular datasets exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    #[default]
    Tabular,
}

/// Metadata about a dataset: its id, the route it is served at and its schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub id: String,
    pub route: String,
    #[serde(rename = "type", default)]
    pub kind: DatasetKind,
    pub dataset_schema: DatasetSchema,
}

impl DatasetMetadata {
    pub fn new(id: impl Into<String>, route: impl Into<String>, dataset_schema: DatasetSchema) -> Self {
        Self {
            id: id.into(),
            route: route.into(),
            kind: DatasetKind::Tabular,
            dataset_schema,
        }
    }

    /// Full URL of this dataset under the given base URL
    pub fn url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.route)
    }
}
