//! Statically typed datasets
//!
//! A dataset declared with [`taco_dataset!`](crate::taco_dataset) gets a
//! marker type implementing [`Dataset`] and a row struct whose field types
//! follow the declared column kinds (`String` for string columns, `f64` for
//! number columns). The schema is derived from the same declaration, so the
//! row type and the column list cannot disagree.

use std::fmt;

use crate::error::{SchemaViolation, UnknownDatasetId};
use crate::request::{DatasetRequest, TypedRequest};
use crate::row::{Row, Value};
use crate::schema::{DatasetMetadata, DatasetSchema, ValueType};

/// Rust type backing a column value type
pub trait ColumnType: Sized {
    const VALUE_TYPE: ValueType;

    fn from_value(value: &Value) -> Option<Self>;
}

impl ColumnType for String {
    const VALUE_TYPE: ValueType = ValueType::String;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl ColumnType for f64 {
    const VALUE_TYPE: ValueType = ValueType::Number;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_number()
    }
}

/// Conversion from a decoded row into a typed row
pub trait FromRow: Sized {
    fn from_row(index: usize, row: &Row) -> Result<Self, SchemaViolation>;
}

/// A dataset known at compile time
pub trait Dataset: Send + Sync + 'static {
    const ID: &'static str;
    const ROUTE: &'static str;

    type Row: FromRow + Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    fn schema() -> DatasetSchema;

    fn metadata() -> DatasetMetadata {
        DatasetMetadata::new(Self::ID, Self::ROUTE, Self::schema())
    }
}

/// Read one typed column out of a row
pub fn column<T: ColumnType>(index: usize, row: &Row, name: &str) -> Result<T, SchemaViolation> {
    let value = row.get(name).ok_or_else(|| SchemaViolation::MissingColumn {
        row: index,
        column: name.to_string(),
    })?;

    T::from_value(value).ok_or_else(|| SchemaViolation::TypeMismatch {
        row: index,
        column: name.to_string(),
        expected: T::VALUE_TYPE,
        found: value.value_type().as_str(),
    })
}

/// An ordered group of typed datasets, resolved together.
///
/// Implemented for tuples of up to six datasets; the requests come back as
/// a tuple in the same order.
pub trait DatasetSet {
    type Requests;

    fn ids() -> Vec<&'static str>;

    fn resolve<L>(lookup: L) -> Result<Self::Requests, UnknownDatasetId>
    where
        L: FnMut(&str) -> Result<DatasetRequest, UnknownDatasetId>;
}

macro_rules! impl_dataset_set {
    ($($d:ident),+) => {
        impl<$($d: Dataset),+> DatasetSet for ($($d,)+) {
            type Requests = ($(TypedRequest<$d>,)+);

            fn ids() -> Vec<&'static str> {
                vec![$($d::ID),+]
            }

            fn resolve<L>(mut lookup: L) -> Result<Self::Requests, UnknownDatasetId>
            where
                L: FnMut(&str) -> Result<DatasetRequest, UnknownDatasetId>,
            {
                Ok(($(TypedRequest::<$d>::from_request(lookup($d::ID)?),)+))
            }
        }
    };
}

impl_dataset_set!(A);
impl_dataset_set!(A, B);
impl_dataset_set!(A, B, C);
impl_dataset_set!(A, B, C, D);
impl_dataset_set!(A, B, C, D, E);
impl_dataset_set!(A, B, C, D, E, F);

/// Declare a typed dataset.
///
/// ```
/// taco_core::taco_dataset! {
///     /// Beverage prices
///     pub struct Beverages {
///         id: "dataset-1",
///         route: "/dataset-1",
///         row: BeverageRow {
///             beverage: String => "Beverage",
///             price: f64 => "Price",
///         }
///     }
/// }
///
/// use taco_core::Dataset;
/// assert_eq!(Beverages::schema().columns.len(), 2);
/// ```
#[macro_export]
macro_rules! taco_dataset {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            id: $id:literal,
            route: $route:literal,
            row: $row:ident {
                $( $field:ident : $ty:ty => $column:literal ),* $(,)?
            } $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        $vis struct $name;

        #[derive(Debug, Clone, PartialEq)]
        $vis struct $row {
            $( pub $field: $ty, )*
        }

        impl $crate::typed::FromRow for $row {
            fn from_row(
                index: usize,
                row: &$crate::Row,
            ) -> ::std::result::Result<Self, $crate::SchemaViolation> {
                let _ = (index, row);
                Ok(Self {
                    $( $field: $crate::typed::column::<$ty>(index, row, $column)?, )*
                })
            }
        }

        impl $crate::typed::Dataset for $name {
            const ID: &'static str = $id;
            const ROUTE: &'static str = $route;
            type Row = $row;

            fn schema() -> $crate::DatasetSchema {
                $crate::DatasetSchema::new(vec![
                    $( $crate::ColumnSchema::new(
                        $column,
                        <$ty as $crate::typed::ColumnType>::VALUE_TYPE,
                    ), )*
                ])
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::request::RequestState;
    use crate::schema::ColumnSchema;
    use crate::spec::TacoSpec;

    crate::taco_dataset! {
        struct Beverages {
            id: "dataset-1",
            route: "/dataset-1",
            row: BeverageRow {
                beverage: String => "Beverage",
                price: f64 => "Price",
            }
        }
    }

    crate::taco_dataset! {
        struct Cocktails {
            id: "dataset-2",
            route: "/dataset-2",
            row: CocktailRow {
                cocktail: String => "Cocktail",
            }
        }
    }

    crate::taco_dataset! {
        struct Heartbeat {
            id: "heartbeat",
            route: "/heartbeat",
            row: HeartbeatRow {}
        }
    }

    fn coffee() -> Row {
        [("Beverage", Value::from("Coffee")), ("Price", Value::from(3.0))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_schema_derived_from_declaration() {
        assert_eq!(
            Beverages::schema().columns,
            vec![ColumnSchema::string("Beverage"), ColumnSchema::number("Price")]
        );
        assert_eq!(Beverages::metadata().route, "/dataset-1");
        assert!(Heartbeat::schema().columns.is_empty());
    }

    #[test]
    fn test_typed_spec_builder() {
        let spec = TacoSpec::builder()
            .dataset::<Beverages>()
            .dataset::<Cocktails>()
            .build()
            .unwrap();
        assert_eq!(spec.ids().collect::<Vec<_>>(), vec!["dataset-1", "dataset-2"]);

        let err = TacoSpec::builder()
            .dataset::<Beverages>()
            .dataset::<Beverages>()
            .build()
            .unwrap_err();
        assert_eq!(err, crate::SpecError::DuplicateDatasetId("dataset-1".into()));
    }

    #[test]
    fn test_from_row() {
        let row = BeverageRow::from_row(0, &coffee()).unwrap();
        assert_eq!(
            row,
            BeverageRow {
                beverage: "Coffee".into(),
                price: 3.0
            }
        );

        let wrong: Row = [("Beverage", Value::from(1.0)), ("Price", Value::from(3.0))]
            .into_iter()
            .collect();
        let err = BeverageRow::from_row(4, &wrong).unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::TypeMismatch {
                row: 4,
                column: "Beverage".into(),
                expected: ValueType::String,
                found: "number",
            }
        );
    }

    #[test]
    fn test_typed_request_conversion() {
        let typed = TypedRequest::<Beverages>::from_request(DatasetRequest::loaded(
            "dataset-1",
            vec![coffee()],
        ));
        assert_eq!(typed.state(), RequestState::Loaded);
        assert_eq!(typed.rows().map(|r| r[0].price), Some(3.0));

        // Rows of some other dataset do not fit
        let cocktails = TypedRequest::<Cocktails>::from_request(DatasetRequest::loaded(
            "dataset-2",
            vec![coffee()],
        ));
        assert!(matches!(cocktails.error(), Some(FetchError::Schema(_))));
    }

    #[test]
    fn test_dataset_set_resolves_in_order() {
        let mut seen = Vec::new();
        let (cocktails, beverages) = <(Cocktails, Beverages)>::resolve(|id| {
            seen.push(id.to_string());
            Ok(DatasetRequest::pending(id))
        })
        .unwrap();

        assert_eq!(seen, vec!["dataset-2", "dataset-1"]);
        assert_eq!(cocktails, TypedRequest::Pending);
        assert_eq!(beverages.id(), "dataset-1");
        assert_eq!(<(Cocktails, Beverages)>::ids(), vec!["dataset-2", "dataset-1"]);
    }
}
