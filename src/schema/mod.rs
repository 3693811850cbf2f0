//! Declarative output-shape descriptions and the mock-data synthesizer.
//!
//! A node that has never run still needs representative output so templates
//! referencing it can resolve. Synthesis is deterministic and memoized by
//! schema identity, so repeated evaluations within one editing session see
//! reference-stable placeholder data.

use crate::error::SchemaError;
use crate::value::{RepeatedView, Value};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Placeholder constants for synthesized primitive values.
pub const MOCK_TEXT: &str = "sample value";
pub const MOCK_NUMBER: f64 = 1.0;
pub const MOCK_BOOL: bool = true;

/// One entry of a node's declared output shape. Recursive: `object` and
/// `array` entries describe their contents through `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchemaItem {
    pub code: String,
    pub label: String,
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<OutputSchemaItem>>,
}

/// The closed set of schema types. Unknown type names in a document fail at
/// the deserialization boundary rather than surfacing mid-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl OutputSchemaItem {
    pub fn new(code: &str, label: &str, schema_type: SchemaType) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
            schema_type,
            children: None,
        }
    }

    pub fn with_children(mut self, children: Vec<OutputSchemaItem>) -> Self {
        self.children = Some(children);
        self
    }
}

/// A node's output schema, shared by reference. The mock memo is keyed by this
/// pointer identity.
pub type OutputSchema = Rc<Vec<OutputSchemaItem>>;

/// Memoized mock synthesis, keyed by schema identity rather than content.
///
/// Two structurally identical schemas held behind distinct `Rc`s synthesize
/// separately (the results are deep-equal but not shared). This is a
/// deliberate trade of a little duplicate work for a trivially correct key.
#[derive(Debug, Default)]
pub struct MockCache {
    entries: RefCell<AHashMap<usize, Rc<Value>>>,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesizes representative output for `schema`, returning the cached
    /// value on every subsequent call with the same schema reference.
    pub fn synthesize(&self, schema: &OutputSchema) -> Result<Rc<Value>, SchemaError> {
        let key = Rc::as_ptr(schema) as usize;

        if let Some(hit) = self.entries.borrow().get(&key) {
            return Ok(Rc::clone(hit));
        }

        let value = Rc::new(synthesize_items(schema)?);
        self.entries
            .borrow_mut()
            .insert(key, Rc::clone(&value));
        Ok(value)
    }
}

fn synthesize_items(items: &[OutputSchemaItem]) -> Result<Value, SchemaError> {
    let mut object = AHashMap::with_capacity(items.len());
    for item in items {
        object.insert(item.code.clone(), synthesize_item(item)?);
    }
    Ok(Value::Object(object))
}

fn synthesize_item(item: &OutputSchemaItem) -> Result<Value, SchemaError> {
    match item.schema_type {
        SchemaType::String | SchemaType::Number | SchemaType::Boolean => {
            // A primitive entry carrying children is an authoring defect.
            if item.children.as_ref().is_some_and(|c| !c.is_empty()) {
                return Err(SchemaError::PrimitiveWithChildren {
                    code: item.code.clone(),
                });
            }
            Ok(match item.schema_type {
                SchemaType::String => Value::String(MOCK_TEXT.to_string()),
                SchemaType::Number => Value::Number(MOCK_NUMBER),
                SchemaType::Boolean => Value::Bool(MOCK_BOOL),
                _ => unreachable!(),
            })
        }
        SchemaType::Object => synthesize_items(item.children.as_deref().unwrap_or(&[])),
        SchemaType::Array => {
            let element = match item.children.as_ref().and_then(|c| c.first()) {
                Some(child) => synthesize_item(child)?,
                None => Value::String(MOCK_TEXT.to_string()),
            };
            Ok(Value::Repeated(Rc::new(RepeatedView::new(element))))
        }
    }
}
