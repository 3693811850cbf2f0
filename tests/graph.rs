//! Tests for the precedence-respecting graph resolver.
mod common;
use common::*;
use hinagata::prelude::*;

fn names(nodes: &[&WorkflowNode]) -> Vec<String> {
    nodes.iter().map(|n| n.data.name.clone()).collect()
}

#[test]
fn linear_chain_sees_earlier_nodes_only() {
    let workflow = document(vec![
        leaf("a", "A", Some(output_of("value", SchemaType::Number))),
        leaf("b", "B", Some(output_of("value", SchemaType::Number))),
        leaf("c", "C", Some(output_of("value", SchemaType::Number))),
    ]);

    let previous = previous_nodes(&workflow.root, "c").expect("node exists");
    let mut found = names(&previous);
    found.sort();
    assert_eq!(found, vec!["A".to_string(), "B".to_string()]);
}

#[test]
fn first_node_has_no_previous_nodes() {
    let workflow = document(vec![
        leaf("a", "A", Some(output_of("value", SchemaType::Number))),
        leaf("b", "B", None),
    ]);

    let previous = previous_nodes(&workflow.root, "a").expect("node exists");
    assert!(previous.is_empty());
}

#[test]
fn branching_composite_contributes_both_branches() {
    // A switch with two branches precedes the current node: descendants of
    // both branches are legal references.
    let workflow = document(vec![
        composite(
            "switch",
            "Switch",
            NodeKind::Switch,
            vec![
                branch(
                    "case-1",
                    vec![leaf("a1", "A1", Some(output_of("value", SchemaType::Number)))],
                ),
                branch(
                    "case-2",
                    vec![leaf("a2", "A2", Some(output_of("value", SchemaType::String)))],
                ),
            ],
        ),
        leaf("current", "Current", None),
    ]);

    let previous = previous_nodes(&workflow.root, "current").expect("node exists");
    let mut found = names(&previous);
    found.sort();
    assert_eq!(found, vec!["A1".to_string(), "A2".to_string()]);
}

#[test]
fn nested_position_steps_up_through_ancestors() {
    // current sits inside the second branch; it sees the sibling ahead of it
    // in its own block, the other branch's descendants, and the top-level
    // node before the switch.
    let workflow = document(vec![
        leaf("first", "First", Some(output_of("value", SchemaType::Number))),
        composite(
            "loop",
            "Loop",
            NodeKind::Loop,
            vec![
                branch(
                    "block-1",
                    vec![leaf("x", "X", Some(output_of("value", SchemaType::Number)))],
                ),
                branch(
                    "block-2",
                    vec![
                        leaf("y", "Y", Some(output_of("value", SchemaType::Number))),
                        leaf("current", "Current", None),
                    ],
                ),
            ],
        ),
    ]);

    let previous = previous_nodes(&workflow.root, "current").expect("node exists");
    let mut found = names(&previous);
    found.sort();
    assert_eq!(
        found,
        vec!["First".to_string(), "X".to_string(), "Y".to_string()]
    );
}

#[test]
fn structural_nodes_are_traversed_but_not_collected() {
    let workflow = document(vec![
        branch(
            "empty-container",
            vec![leaf("inner", "Inner", Some(output_of("v", SchemaType::Number)))],
        ),
        leaf("current", "Current", None),
    ]);

    let previous = previous_nodes(&workflow.root, "current").expect("node exists");
    assert_eq!(names(&previous), vec!["Inner".to_string()]);
}

#[test]
fn unknown_node_fails_fast() {
    let workflow = document(vec![leaf("a", "A", None)]);
    assert!(matches!(
        previous_nodes(&workflow.root, "ghost"),
        Err(GraphError::NodeNotFound(_))
    ));
}

#[test]
fn name_lookup_searches_the_whole_document() {
    // Name lookup is looser than precedence resolution: it also finds nodes
    // that run later than any given position.
    let workflow = document(vec![
        leaf("current", "Current", None),
        leaf("later", "Later", Some(output_of("value", SchemaType::Number))),
    ]);

    let found = find_by_name(&workflow.root, "Later").expect("full-document search");
    assert_eq!(found.id, "later");

    let previous = previous_nodes(&workflow.root, "current").expect("node exists");
    assert!(previous.is_empty(), "precedence query must not see 'Later'");
}

#[test]
fn capability_table_is_fixed_per_kind() {
    assert!(!NodeKind::Start.capabilities().deletable);
    assert!(!NodeKind::End.capabilities().deletable);
    assert!(NodeKind::Switch.capabilities().accepts_children);
    assert!(NodeKind::Loop.capabilities().accepts_children);

    let custom = NodeKind::Custom("http".to_string()).capabilities();
    assert!(custom.deletable);
    assert!(!custom.accepts_children);
}
