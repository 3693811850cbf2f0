//! Tests for the symbol/member completion resolver.
mod common;
use common::*;
use hinagata::prelude::*;

fn setup() -> (Workflow, MockCache) {
    let workflow = document(vec![
        leaf("a", "A", Some(output_of("title", SchemaType::String))),
        leaf("current", "Current", None),
    ]);
    (workflow, MockCache::new())
}

fn labels(response: &CompletionResponse) -> Vec<String> {
    response.items.iter().map(|i| i.label.clone()).collect()
}

fn item<'r>(response: &'r CompletionResponse, label: &str) -> &'r Completion {
    response
        .items
        .iter()
        .find(|i| i.label == label)
        .unwrap_or_else(|| panic!("missing candidate '{}'", label))
}

#[test]
fn inactive_outside_expression_regions() {
    let (workflow, cache) = setup();

    let (text, cursor) = cursor_at("plain $ text|");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);
    assert!(response.items.is_empty());

    // A closed region before the cursor does not activate completion.
    let (text, cursor) = cursor_at("{{ $now }} tail|");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);
    assert!(response.items.is_empty());
}

#[test]
fn root_symbols_after_dollar() {
    let (workflow, cache) = setup();
    let (text, cursor) = cursor_at("{{ $| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);

    let found = labels(&response);
    assert!(found.contains(&"$workflow".to_string()));
    assert!(found.contains(&"$now".to_string()));
    assert!(found.contains(&"$vars".to_string()));
    assert!(found.contains(&"$('A')".to_string()));

    // The replacement span covers the typed `$`.
    assert_eq!(response.replace_end - response.replace_start, 1);
}

#[test]
fn root_symbols_filter_by_typed_tail() {
    let (workflow, cache) = setup();
    let (text, cursor) = cursor_at("{{ $w| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);

    assert_eq!(labels(&response), vec!["$workflow".to_string()]);
    assert_eq!(item(&response, "$workflow").matched_len, 2);
    assert_eq!(response.replace_end - response.replace_start, 2);
}

#[test]
fn node_suggestions_respect_precedence() {
    // 'Later' runs after the current node: evaluation could still resolve it
    // by name, but completion must not offer it.
    let workflow = document(vec![
        leaf("current", "Current", None),
        leaf("later", "Later", Some(output_of("x", SchemaType::Number))),
    ]);
    let cache = MockCache::new();

    let (text, cursor) = cursor_at("{{ $| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);
    assert!(!labels(&response).contains(&"$('Later')".to_string()));
}

#[test]
fn namespaces_after_capitalized_prefix() {
    let (workflow, cache) = setup();
    let (text, cursor) = cursor_at("{{ Ma| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);

    assert_eq!(labels(&response), vec!["Math".to_string()]);
    let math = item(&response, "Math");
    assert_eq!(math.kind, CompletionKind::Namespace);
    assert_eq!(math.detail.as_deref(), Some("Mathematical utility functions"));
    assert_eq!(math.matched_len, 2);
}

#[test]
fn namespace_members_come_from_the_static_table() {
    let (workflow, cache) = setup();
    let (text, cursor) = cursor_at("{{ Math.| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);

    let abs = item(&response, "abs");
    assert_eq!(abs.kind, CompletionKind::Method);
    assert_eq!(abs.detail.as_deref(), Some("Math.abs(x: number): number"));
    assert_eq!(abs.parameters, vec!["x".to_string()]);
    assert!(abs.example.is_some());
}

#[test]
fn members_of_an_evaluated_base_value() {
    let (workflow, cache) = setup();

    // The node reference itself exposes its two properties.
    let (text, cursor) = cursor_at("{{ $('A').| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);
    let found = labels(&response);
    assert!(found.contains(&"isExecuted".to_string()));
    assert!(found.contains(&"outputs".to_string()));

    // A string-typed output offers string methods and `length`.
    let (text, cursor) = cursor_at("{{ $('A').outputs.title.| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);
    let found = labels(&response);
    assert!(found.contains(&"toUpperCase".to_string()));
    assert!(found.contains(&"length".to_string()));
}

#[test]
fn member_partial_filters_and_reports_matched_span() {
    let (workflow, cache) = setup();
    let (text, cursor) = cursor_at("{{ $('A').outputs.title.toU| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);

    assert_eq!(labels(&response), vec!["toUpperCase".to_string()]);
    assert_eq!(item(&response, "toUpperCase").matched_len, 3);
    assert_eq!(response.replace_end - response.replace_start, 3);
}

#[test]
fn base_evaluation_failure_yields_no_candidates() {
    let (workflow, cache) = setup();
    let (text, cursor) = cursor_at("{{ $('Nope').| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);
    assert!(response.items.is_empty());
}

#[test]
fn method_candidates_insert_call_parentheses() {
    let (workflow, cache) = setup();
    let (text, cursor) = cursor_at("{{ Math.fl| }}");
    let response = completions_at(&text, cursor, &workflow, "current", &cache);
    assert_eq!(item(&response, "floor").insert_text, "floor()");
}
