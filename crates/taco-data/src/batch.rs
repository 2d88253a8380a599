//! Arrow export of loaded datasets

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use taco_core::{DatasetRequest, DatasetSchema, Row, ValueType};

use crate::provider::TacoProvider;
use crate::DataError;

/// Arrow schema of a dataset, one field per column in declaration order
pub fn arrow_schema(schema: &DatasetSchema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .columns
        .iter()
        .map(|column| {
            let data_type = match column.value_type {
                ValueType::String => DataType::Utf8,
                ValueType::Number => DataType::Float64,
            };
            Field::new(&column.name, data_type, true)
        })
        .collect();

    Arc::new(Schema::new(fields))
}

/// Convert decoded rows into a single record batch.
///
/// Cells that are missing or of the wrong type become nulls. Rows decoded
/// against the same schema never contain either.
pub fn rows_to_record_batch(schema: &DatasetSchema, rows: &[Row]) -> Result<RecordBatch, ArrowError> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.columns.len());

    for column in &schema.columns {
        let array: ArrayRef = match column.value_type {
            ValueType::String => {
                let mut builder = StringBuilder::new();
                for row in rows {
                    builder.append_option(row.get_str(&column.name));
                }
                Arc::new(builder.finish())
            }
            ValueType::Number => {
                let mut builder = Float64Builder::with_capacity(rows.len());
                for row in rows {
                    builder.append_option(row.get_number(&column.name));
                }
                Arc::new(builder.finish())
            }
        };
        columns.push(array);
    }

    // A schema without columns still keeps its row count
    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    RecordBatch::try_new_with_options(arrow_schema(schema), columns, &options)
}

impl TacoProvider {
    /// Export a loaded dataset as an Arrow record batch
    pub fn record_batch(&self, id: &str) -> Result<RecordBatch, DataError> {
        let metadata = self.spec().require(id)?;
        let snapshot = self.snapshot();

        match snapshot.get(id) {
            Some(DatasetRequest::Loaded { source, .. }) => {
                Ok(rows_to_record_batch(&metadata.dataset_schema, source)?)
            }
            Some(request) => Err(DataError::NotLoaded {
                id: id.to_string(),
                state: request.state(),
            }),
            None => Err(self.spec().unknown(id).into()),
        }
    }
}
