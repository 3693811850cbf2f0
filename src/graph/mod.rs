//! The workflow node tree and the reference-legality resolver.
//!
//! The editor document owns the graph; everything here only reads it. Two
//! lookups coexist on purpose: [`previous_nodes`] restricts to nodes that run
//! earlier and feeds completion suggestions, while [`find_by_name`] searches
//! the whole document and backs `$()` at evaluation time. An expression can
//! therefore reference a node that completion would never have offered.

use crate::error::GraphError;
use crate::schema::OutputSchema;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

fn ahashmap_is_empty<K, V>(map: &AHashMap<K, V>) -> bool {
    map.is_empty()
}

/// A workflow document: identity, the workflow-level variable bag and the
/// root container node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vars: AHashMap<String, serde_json::Value>,
    pub root: WorkflowNode,
}

/// One node of the tree. Sibling order is significant: it defines which nodes
/// run "earlier" and may therefore be referenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default)]
    pub children: Vec<WorkflowNode>,
}

/// The closed set of node kinds. Behavior differences between kinds live in
/// the capability table, not in per-instance callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Start,
    End,
    Switch,
    Loop,
    Custom(String),
}

impl From<String> for NodeKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "start" => NodeKind::Start,
            "end" => NodeKind::End,
            "switch" => NodeKind::Switch,
            "loop" => NodeKind::Loop,
            _ => NodeKind::Custom(raw),
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Start => "start".to_string(),
            NodeKind::End => "end".to_string(),
            NodeKind::Switch => "switch".to_string(),
            NodeKind::Loop => "loop".to_string(),
            NodeKind::Custom(raw) => raw,
        }
    }
}

/// What the editor may do with a node of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCapabilities {
    pub deletable: bool,
    pub accepts_children: bool,
    pub insertable: bool,
}

impl NodeKind {
    /// The static capability row for this kind.
    pub fn capabilities(&self) -> NodeCapabilities {
        match self {
            NodeKind::Start | NodeKind::End => NodeCapabilities {
                deletable: false,
                accepts_children: false,
                insertable: false,
            },
            NodeKind::Switch | NodeKind::Loop => NodeCapabilities {
                deletable: true,
                accepts_children: true,
                insertable: true,
            },
            NodeKind::Custom(_) => NodeCapabilities {
                deletable: true,
                accepts_children: false,
                insertable: true,
            },
        }
    }
}

/// A node's payload. The recognized keys are modeled; anything else the
/// editor stores rides along in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<OutputSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "ahashmap_is_empty")]
    pub inputs: AHashMap<String, InputBinding>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One configured input field of a node: either a plain value or an
/// expression template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputBinding {
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub is_expression: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// Collects every node that runs before `current_node_id` and declares an
/// output schema.
///
/// Starting at the current node's position, the walk collects each preceding
/// sibling — descending through the full depth of composite siblings' nested
/// blocks — then steps up to the parent's position among *its* siblings and
/// repeats, until the root container is reached. Structural nodes without an
/// output schema are traversed through but not collected.
///
/// Fails fast when `current_node_id` does not exist in the document.
pub fn previous_nodes<'a>(
    root: &'a WorkflowNode,
    current_node_id: &str,
) -> Result<Vec<&'a WorkflowNode>, GraphError> {
    if root.id == current_node_id {
        return Ok(Vec::new());
    }

    let mut path = Vec::new();
    if !find_path(root, current_node_id, &mut path) {
        return Err(GraphError::NodeNotFound(current_node_id.to_string()));
    }

    let mut collected = Vec::new();
    for (parent, index) in path.iter().rev() {
        for sibling in parent.children[..*index].iter().rev() {
            collect_with_descendants(sibling, &mut collected);
        }
    }

    Ok(collected)
}

/// Resolves a node by display name anywhere in the document.
///
/// Deliberately looser than [`previous_nodes`]: evaluation resolves any node
/// by name, while completion only suggests legally precedent ones.
pub fn find_by_name<'a>(root: &'a WorkflowNode, name: &str) -> Option<&'a WorkflowNode> {
    if root.data.name == name {
        return Some(root);
    }
    root.children
        .iter()
        .find_map(|child| find_by_name(child, name))
}

/// Resolves a node by identifier anywhere in the document.
pub fn find_by_id<'a>(root: &'a WorkflowNode, id: &str) -> Option<&'a WorkflowNode> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter().find_map(|child| find_by_id(child, id))
}

/// Records the (parent, child-index) chain from `node` down to the node with
/// the given id. Returns false when the id is absent from this subtree.
fn find_path<'a>(
    node: &'a WorkflowNode,
    id: &str,
    path: &mut Vec<(&'a WorkflowNode, usize)>,
) -> bool {
    for (index, child) in node.children.iter().enumerate() {
        path.push((node, index));
        if child.id == id || find_path(child, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn collect_with_descendants<'a>(node: &'a WorkflowNode, out: &mut Vec<&'a WorkflowNode>) {
    if node.data.output_schema.is_some() {
        out.push(node);
    }
    for child in &node.children {
        collect_with_descendants(child, out);
    }
}
