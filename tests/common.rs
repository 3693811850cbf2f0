//! Common test utilities for building workflow documents.
use hinagata::prelude::*;
use std::rc::Rc;

/// A single-field output schema with the given type.
#[allow(dead_code)]
pub fn output_of(code: &str, schema_type: SchemaType) -> OutputSchema {
    Rc::new(vec![OutputSchemaItem::new(code, code, schema_type)])
}

/// A leaf task node with an optional output schema.
#[allow(dead_code)]
pub fn leaf(id: &str, name: &str, schema: Option<OutputSchema>) -> WorkflowNode {
    WorkflowNode {
        id: id.to_string(),
        kind: NodeKind::Custom("task".to_string()),
        data: NodeData {
            name: name.to_string(),
            output_schema: schema,
            ..Default::default()
        },
        children: vec![],
    }
}

/// A composite node (its children are nested blocks).
#[allow(dead_code)]
pub fn composite(id: &str, name: &str, kind: NodeKind, children: Vec<WorkflowNode>) -> WorkflowNode {
    WorkflowNode {
        id: id.to_string(),
        kind,
        data: NodeData {
            name: name.to_string(),
            ..Default::default()
        },
        children,
    }
}

/// A purely structural container (no output schema, traversed through).
#[allow(dead_code)]
pub fn branch(id: &str, children: Vec<WorkflowNode>) -> WorkflowNode {
    WorkflowNode {
        id: id.to_string(),
        kind: NodeKind::Custom("branch".to_string()),
        data: NodeData::default(),
        children,
    }
}

/// Wraps top-level nodes into a document.
#[allow(dead_code)]
pub fn document(children: Vec<WorkflowNode>) -> Workflow {
    Workflow {
        id: "wf-1".to_string(),
        name: "Test Workflow".to_string(),
        vars: Default::default(),
        root: WorkflowNode {
            id: "root".to_string(),
            kind: NodeKind::Start,
            data: NodeData::default(),
            children,
        },
    }
}

/// Attaches captured sample data to a node.
#[allow(dead_code)]
pub fn with_sample(mut node: WorkflowNode, sample: serde_json::Value) -> WorkflowNode {
    node.data.sample_data = Some(sample);
    node
}

/// Builds a form-value map from (code, value) pairs.
#[allow(dead_code)]
pub fn form_values(pairs: &[(&str, Value)]) -> ahash::AHashMap<String, Value> {
    pairs
        .iter()
        .map(|(code, value)| (code.to_string(), value.clone()))
        .collect()
}

/// Splits editor text on the `|` marker into (text, cursor offset).
#[allow(dead_code)]
pub fn cursor_at(marked: &str) -> (String, usize) {
    let cursor = marked.find('|').expect("marker in test input");
    let mut text = marked.to_string();
    text.remove(cursor);
    (text, cursor)
}
