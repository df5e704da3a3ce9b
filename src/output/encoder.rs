//! JSON to Parquet encoding against a schema descriptor

use crate::error::{Error, Result};
use crate::schema::{PhysicalType, SchemaNode};
use arrow::array::{
    ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, ListArray,
    StringArray, StructArray, TimestampNanosecondArray,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::Fields;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Map a stream's compression type id to a Parquet codec
///
/// Ids outside the configured range fall back to uncompressed.
pub fn compression_for(compression_type_id: i64) -> Compression {
    match compression_type_id {
        1 => Compression::SNAPPY,
        2 => Compression::GZIP(GzipLevel::default()),
        3 => Compression::LZO,
        _ => Compression::UNCOMPRESSED,
    }
}

/// Encode one payload as a single-row Parquet blob
///
/// Fails with an encode error whenever the payload disagrees with the
/// descriptor; the caller treats that as a non-retryable message failure.
pub fn encode(
    schema: &SchemaNode,
    payload: &Map<String, Value>,
    compression_type_id: i64,
) -> Result<Bytes> {
    let arrow_schema = Arc::new(schema.to_arrow_schema()?);
    let SchemaNode::Group { fields, .. } = schema else {
        return Err(Error::encode("schema root is not a group"));
    };

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.len());
    for node in fields {
        let value = payload.get(node.name()).ok_or_else(|| {
            Error::encode(format!("payload is missing schema field {}", node.name()))
        })?;
        columns.push(build_column(node, &[value])?);
    }

    let batch = RecordBatch::try_new(Arc::clone(&arrow_schema), columns)
        .map_err(|e| Error::encode(format!("failed to assemble record batch: {e}")))?;

    let props = WriterProperties::builder()
        .set_compression(compression_for(compression_type_id))
        .build();

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, arrow_schema, Some(props))
        .map_err(|e| Error::encode(format!("failed to create Parquet writer: {e}")))?;
    writer
        .write(&batch)
        .map_err(|e| Error::encode(format!("failed to write record: {e}")))?;
    writer
        .close()
        .map_err(|e| Error::encode(format!("failed to close Parquet writer: {e}")))?;

    Ok(Bytes::from(buf))
}

/// Build the column for a schema node from the values occupying it, one per row
fn build_column(node: &SchemaNode, values: &[&Value]) -> Result<ArrayRef> {
    match node {
        SchemaNode::Leaf { name, physical } => build_scalar(name, *physical, values),
        SchemaNode::Group { name, fields } => {
            let mut records = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::Object(map) => records.push(map),
                    other => {
                        return Err(Error::encode(format!(
                            "field {name} expects a record, payload has {other}"
                        )))
                    }
                }
            }

            let arrow_fields: Vec<_> = fields.iter().map(SchemaNode::to_arrow_field).collect();
            let mut children: Vec<ArrayRef> = Vec::with_capacity(fields.len());
            for child in fields {
                let child_values: Vec<&Value> = records
                    .iter()
                    .map(|map| {
                        map.get(child.name()).ok_or_else(|| {
                            Error::encode(format!(
                                "record {name} is missing schema field {}",
                                child.name()
                            ))
                        })
                    })
                    .collect::<Result<_>>()?;
                children.push(build_column(child, &child_values)?);
            }

            Ok(Arc::new(StructArray::new(
                Fields::from(arrow_fields),
                children,
                None,
            )))
        }
        SchemaNode::List { name, element } => {
            let mut items: Vec<&Value> = Vec::new();
            let mut offsets: Vec<i32> = vec![0];
            for value in values {
                match value {
                    Value::Array(elems) => items.extend(elems.iter()),
                    other => {
                        return Err(Error::encode(format!(
                            "field {name} expects a list, payload has {other}"
                        )))
                    }
                }
                let offset = i32::try_from(items.len())
                    .map_err(|_| Error::encode(format!("list {name} overflows i32 offsets")))?;
                offsets.push(offset);
            }

            let item_array = build_column(element, &items)?;
            Ok(Arc::new(ListArray::new(
                Arc::new(element.to_arrow_field()),
                OffsetBuffer::new(offsets.into()),
                item_array,
                None,
            )))
        }
    }
}

/// Build a scalar column, rejecting every value the physical type cannot hold
fn build_scalar(name: &str, physical: PhysicalType, values: &[&Value]) -> Result<ArrayRef> {
    fn expect<T>(name: &str, expected: &str, value: &Value, parsed: Option<T>) -> Result<T> {
        parsed.ok_or_else(|| {
            Error::encode(format!(
                "field {name} expects {expected}, payload has {value}"
            ))
        })
    }

    match physical {
        PhysicalType::Boolean => {
            let column: Vec<bool> = values
                .iter()
                .map(|v| expect(name, "BOOLEAN", v, v.as_bool()))
                .collect::<Result<_>>()?;
            Ok(Arc::new(BooleanArray::from(column)))
        }
        PhysicalType::Int32 => {
            let column: Vec<i32> = values
                .iter()
                .map(|v| {
                    expect(name, "INT32", v, v.as_i64().and_then(|i| i32::try_from(i).ok()))
                })
                .collect::<Result<_>>()?;
            Ok(Arc::new(Int32Array::from(column)))
        }
        PhysicalType::Int64 => {
            let column: Vec<i64> = values
                .iter()
                .map(|v| expect(name, "INT64", v, v.as_i64()))
                .collect::<Result<_>>()?;
            Ok(Arc::new(Int64Array::from(column)))
        }
        PhysicalType::Int96 => {
            let column: Vec<i64> = values
                .iter()
                .map(|v| expect(name, "INT96", v, v.as_i64()))
                .collect::<Result<_>>()?;
            Ok(Arc::new(TimestampNanosecondArray::from(column)))
        }
        PhysicalType::Float => {
            #[allow(clippy::cast_possible_truncation)]
            let column: Vec<f32> = values
                .iter()
                .map(|v| expect(name, "FLOAT", v, v.as_f64().map(|f| f as f32)))
                .collect::<Result<_>>()?;
            Ok(Arc::new(Float32Array::from(column)))
        }
        PhysicalType::Double => {
            let column: Vec<f64> = values
                .iter()
                .map(|v| expect(name, "DOUBLE", v, v.as_f64()))
                .collect::<Result<_>>()?;
            Ok(Arc::new(Float64Array::from(column)))
        }
        PhysicalType::ByteArray => {
            let column: Vec<&str> = values
                .iter()
                .map(|v| expect(name, "BYTE_ARRAY", v, v.as_str()))
                .collect::<Result<_>>()?;
            Ok(Arc::new(StringArray::from(column)))
        }
    }
}
