//! Parquet schema descriptor types

use crate::error::{Error, Result};
use arrow::datatypes::{DataType, Field, Fields, Schema, TimeUnit};
use serde_json::Value;
use std::sync::Arc;

/// Parquet physical type for a scalar leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
}

impl PhysicalType {
    /// Map a scalar JSON value to its Parquet physical type
    ///
    /// Non-scalar values (objects, arrays, nulls) are the caller's problem
    /// and yield a schema error here.
    pub fn for_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(_) => Ok(Self::Boolean),
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Ok(Self::Int64)
                } else if n.is_f64() {
                    Ok(Self::Double)
                } else {
                    Err(Error::schema(format!("number {n} has no Parquet mapping")))
                }
            }
            Value::String(_) => Ok(Self::ByteArray),
            other => Err(Error::schema(format!(
                "value of kind {} is not a scalar",
                kind_name(other)
            ))),
        }
    }

    /// The Arrow data type this physical type encodes as
    pub fn to_arrow(self) -> DataType {
        match self {
            Self::Boolean => DataType::Boolean,
            Self::Int32 => DataType::Int32,
            Self::Int64 => DataType::Int64,
            Self::Int96 => DataType::Timestamp(TimeUnit::Nanosecond, None),
            Self::Float => DataType::Float32,
            Self::Double => DataType::Float64,
            Self::ByteArray => DataType::Utf8,
        }
    }
}

/// Human-readable kind of a JSON value, for error messages
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A node of the inferred Parquet schema
///
/// The descriptor is a strict tree; every node carries repetition REQUIRED.
/// A `List` node's single child is always named `element`.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Scalar leaf
    Leaf {
        name: String,
        physical: PhysicalType,
    },
    /// Nested record
    Group {
        name: String,
        fields: Vec<SchemaNode>,
    },
    /// Repeated list; the element carries the name `element`
    List {
        name: String,
        element: Box<SchemaNode>,
    },
}

impl SchemaNode {
    /// Name of this node
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf { name, .. } | Self::Group { name, .. } | Self::List { name, .. } => name,
        }
    }

    /// The Arrow field this node encodes as; REQUIRED maps to non-nullable
    pub fn to_arrow_field(&self) -> Field {
        match self {
            Self::Leaf { name, physical } => Field::new(name, physical.to_arrow(), false),
            Self::Group { name, fields } => {
                let children: Vec<Field> = fields.iter().map(SchemaNode::to_arrow_field).collect();
                Field::new(name, DataType::Struct(Fields::from(children)), false)
            }
            Self::List { name, element } => Field::new(
                name,
                DataType::List(Arc::new(element.to_arrow_field())),
                false,
            ),
        }
    }

    /// Render the root descriptor as an Arrow schema
    ///
    /// Valid encoder input means every leaf carries a physical type (by
    /// construction) and every group has at least one child; the inferrer
    /// never emits empty groups.
    pub fn to_arrow_schema(&self) -> Result<Schema> {
        match self {
            Self::Group { fields, .. } if !fields.is_empty() => {
                let arrow_fields: Vec<Field> =
                    fields.iter().map(SchemaNode::to_arrow_field).collect();
                Ok(Schema::new(arrow_fields))
            }
            Self::Group { name, .. } => {
                Err(Error::schema(format!("group {name} has no fields")))
            }
            other => Err(Error::schema(format!(
                "schema root {} is not a group",
                other.name()
            ))),
        }
    }
}
