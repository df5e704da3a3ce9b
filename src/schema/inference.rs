//! Schema inference from JSON payloads

use super::types::{kind_name, PhysicalType, SchemaNode};
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Infer a Parquet schema descriptor from a payload
///
/// The root node is a group named after the message type; its fields are
/// built from the top-level mapping in iteration order. A payload whose
/// every value is null or empty yields a schema error, since the encoder
/// cannot accept an empty root group.
pub fn infer(payload: &Map<String, Value>, message_type: &str) -> Result<SchemaNode> {
    let fields = infer_fields(payload)?;
    if fields.is_empty() {
        return Err(Error::schema(
            "payload has no fields representable in a Parquet schema",
        ));
    }
    Ok(SchemaNode::Group {
        name: message_type.to_string(),
        fields,
    })
}

/// Build schema nodes for every representable entry of a mapping
fn infer_fields(map: &Map<String, Value>) -> Result<Vec<SchemaNode>> {
    let mut fields = Vec::with_capacity(map.len());

    for (key, value) in map {
        match value {
            // nulls are omitted
            Value::Null => {}
            Value::Object(inner) => {
                if inner.is_empty() {
                    continue;
                }
                let inner_fields = infer_fields(inner)?;
                // a mapping of nothing but nulls reduces to an empty group;
                // omit it like the empty mapping it effectively is
                if inner_fields.is_empty() {
                    continue;
                }
                fields.push(SchemaNode::Group {
                    name: key.clone(),
                    fields: inner_fields,
                });
            }
            Value::Array(items) => {
                if items.is_empty() {
                    continue;
                }
                if let Some(node) = infer_list(key, items)? {
                    fields.push(node);
                }
            }
            scalar => {
                fields.push(SchemaNode::Leaf {
                    name: key.clone(),
                    physical: PhysicalType::for_value(scalar)?,
                });
            }
        }
    }

    Ok(fields)
}

/// Derive the element schema of a non-empty array
///
/// The first element drives the element shape. Arrays of objects recurse on
/// the first element; arrays of scalars must agree on the scalar kind across
/// every element, anything else is a schema error rather than a silently
/// wrong file.
fn infer_list(key: &str, items: &[Value]) -> Result<Option<SchemaNode>> {
    match &items[0] {
        Value::Object(first) => {
            for item in &items[1..] {
                if !item.is_object() {
                    return Err(Error::schema(format!(
                        "array {key} mixes objects with {} elements",
                        kind_name(item)
                    )));
                }
            }
            let element_fields = infer_fields(first)?;
            if element_fields.is_empty() {
                return Ok(None);
            }
            Ok(Some(SchemaNode::List {
                name: key.to_string(),
                element: Box::new(SchemaNode::Group {
                    name: "element".to_string(),
                    fields: element_fields,
                }),
            }))
        }
        Value::Array(_) | Value::Null => Err(Error::schema(format!(
            "array {key} has a {} first element",
            kind_name(&items[0])
        ))),
        first => {
            let physical = PhysicalType::for_value(first)?;
            for item in &items[1..] {
                let item_physical = PhysicalType::for_value(item).map_err(|_| {
                    Error::schema(format!(
                        "array {key} mixes {} with {} elements",
                        kind_name(first),
                        kind_name(item)
                    ))
                })?;
                if item_physical != physical {
                    return Err(Error::schema(format!(
                        "array {key} mixes {} with {} elements",
                        kind_name(first),
                        kind_name(item)
                    )));
                }
            }
            Ok(Some(SchemaNode::List {
                name: key.to_string(),
                element: Box::new(SchemaNode::Leaf {
                    name: "element".to_string(),
                    physical,
                }),
            }))
        }
    }
}
