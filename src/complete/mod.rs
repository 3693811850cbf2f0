//! Symbol and member completion for partially typed expressions.
//!
//! Invoked by the text-editing surface on every keystroke; everything here is
//! fail-soft. Three candidate families are selected by lexical dispatch on
//! the text before the cursor: root symbols after `$`, builtin namespaces
//! after a capitalized prefix, and members after a resolvable base expression
//! followed by `.`.
//!
//! Suggestions only offer nodes that run earlier than the current node, while
//! `$()` evaluation resolves any node in the document by name — an expression
//! can legally reference a node completion would never have proposed.

use crate::eval::{BindingSet, Evaluator, builtins};
use crate::graph::{self, Workflow};
use crate::schema::MockCache;
use crate::value::Value;
use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

static ROOT_SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[A-Za-z_]*$").expect("root symbol pattern"));
static NAMESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][A-Za-z0-9_]*$").expect("namespace pattern"));
static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// One candidate continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub label: String,
    pub kind: CompletionKind,
    /// Text to splice into the replacement span when accepted.
    pub insert_text: String,
    /// Signature or short description shown next to the label.
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub parameters: Vec<String>,
    pub example: Option<String>,
    /// Byte length of the confirmed portion: the longest common prefix
    /// (case-insensitive) between the typed tail and this candidate.
    pub matched_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Binding,
    Node,
    Namespace,
    Method,
    Property,
}

/// Candidates plus the span of already-typed text they replace.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub items: Vec<Completion>,
    pub replace_start: usize,
    pub replace_end: usize,
}

impl CompletionResponse {
    fn empty(cursor: usize) -> Self {
        Self {
            items: Vec::new(),
            replace_start: cursor,
            replace_end: cursor,
        }
    }
}

/// Computes completions for the cursor position.
///
/// Only active when the cursor sits inside an open `{{ … }}` region on the
/// current line. That gate is a textual heuristic — good enough for editing
/// flows, not a correctness guarantee against every malformed-brace input.
pub fn completions_at(
    text: &str,
    cursor: usize,
    workflow: &Workflow,
    current_node_id: &str,
    mock_cache: &MockCache,
) -> CompletionResponse {
    if cursor > text.len() || !text.is_char_boundary(cursor) {
        return CompletionResponse::empty(cursor.min(text.len()));
    }

    let Some(prefix) = expression_prefix(text, cursor) else {
        return CompletionResponse::empty(cursor);
    };

    // Member access: everything before the final '.' is the base expression.
    if let Some(dot) = prefix.rfind('.') {
        let partial = &prefix[dot + 1..];
        let base = prefix[..dot].trim();
        if !base.is_empty() && (partial.is_empty() || IDENT_RE.is_match(partial)) {
            let items = member_candidates(base, partial, workflow, mock_cache);
            return CompletionResponse {
                items,
                replace_start: cursor - partial.len(),
                replace_end: cursor,
            };
        }
    }

    // Root symbols: the cursor sits right after a bare (or partial) '$' name.
    if let Some(m) = ROOT_SYMBOL_RE.find(prefix) {
        let partial = m.as_str();
        let items = root_candidates(partial, workflow, current_node_id);
        return CompletionResponse {
            items,
            replace_start: cursor - partial.len(),
            replace_end: cursor,
        };
    }

    // Builtin namespaces: a capitalized global identifier prefix.
    if let Some(m) = NAMESPACE_RE.find(prefix) {
        let partial = m.as_str();
        let items = namespace_candidates(partial);
        return CompletionResponse {
            items,
            replace_start: cursor - partial.len(),
            replace_end: cursor,
        };
    }

    CompletionResponse::empty(cursor)
}

/// The text between the enclosing `{{` and the cursor, or `None` when the
/// cursor is not inside an open expression region on its line.
fn expression_prefix(text: &str, cursor: usize) -> Option<&str> {
    let line_start = text[..cursor].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[cursor..]
        .find('\n')
        .map(|i| cursor + i)
        .unwrap_or(text.len());

    let before = &text[line_start..cursor];
    let after = &text[cursor..line_end];

    let open = before.rfind("{{")?;
    // An already-closed region before the cursor does not count as open.
    if before[open..].contains("}}") {
        return None;
    }
    // A closing marker must follow on the same line, before any new opener.
    let close = after.find("}}")?;
    if after[..close].contains("{{") {
        return None;
    }

    Some(&before[open + 2..])
}

fn root_candidates(partial: &str, workflow: &Workflow, current_node_id: &str) -> Vec<Completion> {
    let mut items = Vec::new();

    let fixed: [(&str, &str); 3] = [
        ("$workflow", "Workflow metadata (name, id)"),
        ("$now", "The current instant"),
        ("$vars", "Workflow-level variables"),
    ];
    for (label, description) in fixed {
        if let Some(matched_len) = prefix_match(partial, label) {
            items.push(Completion {
                label: label.to_string(),
                kind: CompletionKind::Binding,
                insert_text: label.to_string(),
                detail: Some(description.to_string()),
                documentation: None,
                parameters: Vec::new(),
                example: None,
                matched_len,
            });
        }
    }

    // Only legally precedent nodes are suggested; unknown positions fail soft.
    let previous = graph::previous_nodes(&workflow.root, current_node_id).unwrap_or_default();
    for node in previous {
        let name = &node.data.name;
        let filter = format!("${}", name);
        let Some(matched_len) = prefix_match(partial, &filter) else {
            continue;
        };
        let reference = format!("$('{}')", name);
        items.push(Completion {
            label: reference.clone(),
            kind: CompletionKind::Node,
            insert_text: reference,
            detail: node.data.description.clone(),
            documentation: Some(format!("Outputs of node '{}'", name)),
            parameters: Vec::new(),
            example: None,
            matched_len,
        });
    }

    items
}

fn namespace_candidates(partial: &str) -> Vec<Completion> {
    builtins::namespaces()
        .iter()
        .filter_map(|ns| {
            let matched_len = prefix_match(partial, ns.name)?;
            Some(Completion {
                label: ns.name.to_string(),
                kind: CompletionKind::Namespace,
                insert_text: ns.name.to_string(),
                detail: Some(ns.description.to_string()),
                documentation: None,
                parameters: Vec::new(),
                example: None,
                matched_len,
            })
        })
        .collect()
}

fn member_candidates(
    base: &str,
    partial: &str,
    workflow: &Workflow,
    mock_cache: &MockCache,
) -> Vec<Completion> {
    // A recognized namespace name uses its static table; no live evaluation.
    if let Some(ns) = builtins::namespace_doc(base) {
        return method_completions(ns.methods, partial);
    }

    let bindings = BindingSet::new(workflow, mock_cache);
    let outcome = Evaluator::new(&bindings).evaluate(base);
    if outcome.is_error() {
        return Vec::new();
    }
    let Some(value) = outcome.result else {
        return Vec::new();
    };

    let mut items = Vec::new();

    if let Value::Object(entries) = &value {
        for key in entries.keys().sorted() {
            if let Some(matched_len) = prefix_match(partial, key) {
                items.push(Completion {
                    label: key.clone(),
                    kind: CompletionKind::Property,
                    insert_text: key.clone(),
                    detail: Some(entries[key].type_name().to_string()),
                    documentation: None,
                    parameters: Vec::new(),
                    example: None,
                    matched_len,
                });
            }
        }
    }

    if matches!(
        &value,
        Value::String(_) | Value::Array(_) | Value::Repeated(_)
    ) {
        if let Some(matched_len) = prefix_match(partial, "length") {
            items.push(Completion {
                label: "length".to_string(),
                kind: CompletionKind::Property,
                insert_text: "length".to_string(),
                detail: Some("number".to_string()),
                documentation: None,
                parameters: Vec::new(),
                example: None,
                matched_len,
            });
        }
    }

    items.extend(method_completions(
        builtins::methods_for(value.type_name()),
        partial,
    ));

    // Object keys shadow same-named methods in the candidate list.
    items
        .into_iter()
        .unique_by(|item| item.label.clone())
        .collect()
}

fn method_completions(methods: &'static [builtins::MethodDoc], partial: &str) -> Vec<Completion> {
    methods
        .iter()
        .filter_map(|method| {
            let matched_len = prefix_match(partial, method.name)?;
            Some(Completion {
                label: method.name.to_string(),
                kind: CompletionKind::Method,
                insert_text: format!("{}()", method.name),
                detail: Some(method.signature.to_string()),
                documentation: Some(method.documentation.to_string()),
                parameters: method.parameters.iter().map(|p| p.to_string()).collect(),
                example: Some(method.example.to_string()),
                matched_len,
            })
        })
        .collect()
}

/// Case-insensitive prefix filter. Returns the byte length of the longest
/// common prefix of `typed` and `candidate` so the UI can highlight the
/// confirmed portion; `None` when the candidate does not extend the tail.
fn prefix_match(typed: &str, candidate: &str) -> Option<usize> {
    if !candidate.to_lowercase().starts_with(&typed.to_lowercase()) {
        return None;
    }

    let matched = typed
        .chars()
        .zip(candidate.chars())
        .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
        .map(|(a, _)| a.len_utf8())
        .sum();
    Some(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_requires_open_region_on_line() {
        assert!(expression_prefix("plain text", 5).is_none());
        assert!(expression_prefix("{{ a }} b", 8).is_none());
        assert_eq!(expression_prefix("x {{ $ }}", 6), Some(" $"));
    }

    #[test]
    fn gate_rejects_closed_region_before_cursor() {
        let text = "{{ a }} tail";
        assert!(expression_prefix(text, text.len()).is_none());
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert_eq!(prefix_match("ma", "Math"), Some(2));
        assert_eq!(prefix_match("", "Math"), Some(0));
        assert!(prefix_match("mx", "Math").is_none());
    }
}
