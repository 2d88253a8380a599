//! The dataset registry an application is built against

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{SpecError, UnknownDatasetId};
use crate::schema::DatasetMetadata;
use crate::typed::Dataset;

/// Ordered, immutable list of dataset declarations.
///
/// Dataset ids are unique and so are column names within each dataset. Both
/// are checked on construction, including on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSpec")]
pub struct TacoSpec {
    datasets: Vec<DatasetMetadata>,
}

#[derive(Deserialize)]
struct RawSpec {
    datasets: Vec<DatasetMetadata>,
}

impl TryFrom<RawSpec> for TacoSpec {
    type Error = SpecError;

    fn try_from(raw: RawSpec) -> Result<Self, Self::Error> {
        TacoSpec::new(raw.datasets)
    }
}

impl TacoSpec {
    /// Validate and build a spec
    pub fn new(datasets: Vec<DatasetMetadata>) -> Result<Self, SpecError> {
        let mut ids = AHashSet::with_capacity(datasets.len());
        for metadata in &datasets {
            if !ids.insert(metadata.id.as_str()) {
                return Err(SpecError::DuplicateDatasetId(metadata.id.clone()));
            }
            if let Some(column) = metadata.dataset_schema.duplicate_column() {
                return Err(SpecError::DuplicateColumn {
                    dataset: metadata.id.clone(),
                    column: column.to_string(),
                });
            }
        }

        tracing::debug!("Validated spec with {} datasets", datasets.len());
        Ok(Self { datasets })
    }

    pub fn builder() -> TacoSpecBuilder {
        TacoSpecBuilder::default()
    }

    /// All declarations in declaration order
    pub fn datasets(&self) -> &[DatasetMetadata] {
        &self.datasets
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetMetadata> {
        self.datasets.iter()
    }

    pub fn get(&self, id: &str) -> Option<&DatasetMetadata> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Like [`TacoSpec::get`], but reports the declared ids on a miss
    pub fn require(&self, id: &str) -> Result<&DatasetMetadata, UnknownDatasetId> {
        self.get(id).ok_or_else(|| self.unknown(id))
    }

    /// Build the lookup error for an id this spec does not declare
    pub fn unknown(&self, id: &str) -> UnknownDatasetId {
        UnknownDatasetId {
            id: id.to_string(),
            valid: self.ids().map(str::to_string).collect(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Incremental construction of a [`TacoSpec`], mixing typed and plain
/// declarations
#[derive(Debug, Default)]
pub struct TacoSpecBuilder {
    datasets: Vec<DatasetMetadata>,
}

impl TacoSpecBuilder {
    /// Declare a dataset from its typed definition
    pub fn dataset<D: Dataset>(mut self) -> Self {
        self.datasets.push(D::metadata());
        self
    }

    pub fn metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.datasets.push(metadata);
        self
    }

    pub fn build(self) -> Result<TacoSpec, SpecError> {
        TacoSpec::new(self.datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSchema, DatasetSchema};

    fn metadata(id: &str) -> DatasetMetadata {
        DatasetMetadata::new(
            id,
            format!("/{id}"),
            DatasetSchema::new(vec![ColumnSchema::string("Beverage")]),
        )
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = TacoSpec::new(vec![metadata("a"), metadata("b"), metadata("a")]).unwrap_err();
        assert_eq!(err, SpecError::DuplicateDatasetId("a".to_string()));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let bad = DatasetMetadata::new(
            "prices",
            "/prices",
            DatasetSchema::new(vec![ColumnSchema::number("Price"), ColumnSchema::string("Price")]),
        );
        let err = TacoSpec::new(vec![bad]).unwrap_err();
        assert_eq!(
            err,
            SpecError::DuplicateColumn {
                dataset: "prices".into(),
                column: "Price".into()
            }
        );
    }

    #[test]
    fn test_lookup_preserves_declaration_order() {
        let spec = TacoSpec::new(vec![metadata("c"), metadata("a"), metadata("b")]).unwrap();
        assert_eq!(spec.ids().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(spec.get("a").map(|m| m.route.as_str()), Some("/a"));
        assert!(spec.contains("b"));
        assert!(!spec.contains("z"));
        assert_eq!(spec.len(), 3);
    }

    #[test]
    fn test_require_reports_declared_ids() {
        let spec = TacoSpec::new(vec![metadata("dataset-1"), metadata("dataset-2")]).unwrap();
        let err = spec.require("dataset-x").unwrap_err();
        assert_eq!(err.id, "dataset-x");
        assert_eq!(err.valid, vec!["dataset-1", "dataset-2"]);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = serde_json::json!({
            "datasets": [
                { "id": "a", "route": "/a", "dataset_schema": { "columns": [] } },
                { "id": "a", "route": "/b", "dataset_schema": { "columns": [] } }
            ]
        });
        let err = serde_json::from_value::<TacoSpec>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate dataset id 'a'"));
    }

    #[test]
    fn test_empty_spec_is_valid() {
        let spec = TacoSpec::builder().build().unwrap();
        assert!(spec.is_empty());
    }
}
