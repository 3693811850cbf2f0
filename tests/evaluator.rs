//! Tests for the sandboxed expression evaluator and its binding sets.
mod common;
use common::*;
use hinagata::prelude::*;

fn demo_workflow() -> Workflow {
    let mut workflow = document(vec![
        leaf("a", "A", Some(output_of("value", SchemaType::Number))),
        leaf("b", "B", None),
    ]);
    workflow
        .vars
        .insert("env".to_string(), serde_json::json!("prod"));
    workflow
}

#[test]
fn evaluates_arithmetic_against_mock_node_output() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let outcome = evaluator.evaluate("$('A').outputs.value + 1");
    assert_eq!(outcome.result, Some(Value::Number(2.0)));
    assert!(outcome.error.is_none());
    assert!(outcome.is_mock, "synthesized data must be flagged");
}

#[test]
fn sample_data_wins_over_synthesis() {
    let mut workflow = demo_workflow();
    workflow.root.children[0] = with_sample(
        leaf("a", "A", Some(output_of("value", SchemaType::Number))),
        serde_json::json!({"value": 41}),
    );
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let outcome = evaluator.evaluate("$('A').outputs.value + 1");
    assert_eq!(outcome.result, Some(Value::Number(42.0)));
    assert!(!outcome.is_mock);

    let executed = evaluator.evaluate("$('A').isExecuted");
    assert_eq!(executed.result, Some(Value::Bool(true)));
}

#[test]
fn malformed_input_returns_tagged_errors_never_panics() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    for source in ["{", "))(", "", "1 +", "a # b", "'unterminated"] {
        let outcome = evaluator.evaluate(source);
        let error = outcome.error.expect("malformed input must error");
        assert_eq!(error.name, "SyntaxError");
        assert!(outcome.result.is_none());
    }
}

#[test]
fn uninvoked_function_reference_is_an_error() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let outcome = evaluator.evaluate("Math.abs");
    let error = outcome.error.expect("bare callable must error");
    assert_eq!(error.name, "Error");
    assert_eq!(
        error.message,
        "Math.abs was not invoked as a function; referencing it directly is not supported"
    );
}

#[test]
fn unknown_names_are_reference_errors() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let outcome = evaluator.evaluate("nonexistent + 1");
    let error = outcome.error.expect("unknown name must error");
    assert_eq!(error.name, "ReferenceError");
    assert!(error.message.contains("nonexistent"));
}

#[test]
fn node_resolution_failures_are_descriptive() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let missing = evaluator.evaluate("$('Missing')");
    let error = missing.error.expect("unknown node must error");
    assert_eq!(error.name, "Error");
    assert!(error.message.contains("Missing"));

    // B exists but declares neither schema nor sample data.
    let no_output = evaluator.evaluate("$('B')");
    let error = no_output.error.expect("output-less node must error");
    assert!(error.message.contains("neither an output schema nor sample data"));
}

#[test]
fn workflow_bindings_are_visible() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    assert_eq!(
        evaluator.evaluate("$workflow.name").result,
        Some(Value::String("Test Workflow".to_string()))
    );
    assert_eq!(
        evaluator.evaluate("$vars.env").result,
        Some(Value::String("prod".to_string()))
    );
    assert!(matches!(
        evaluator.evaluate("$now").result,
        Some(Value::DateTime(_))
    ));
}

#[test]
fn builtin_methods_and_namespaces_dispatch() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    assert_eq!(
        evaluator.evaluate("'a,b'.split(',').length").result,
        Some(Value::Number(2.0))
    );
    assert_eq!(
        evaluator.evaluate("'ab'.toUpperCase()").result,
        Some(Value::String("AB".to_string()))
    );
    assert_eq!(
        evaluator.evaluate("Math.max(1, 2) * 10").result,
        Some(Value::Number(20.0))
    );
    assert_eq!(
        evaluator.evaluate("JSON.stringify([1, 2])").result,
        Some(Value::String("[1,2]".to_string()))
    );
}

#[test]
fn operators_follow_host_semantics() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    assert_eq!(
        evaluator.evaluate("'Sum: ' + 1").result,
        Some(Value::String("Sum: 1".to_string()))
    );
    assert_eq!(
        evaluator.evaluate("1 > 2 ? 'x' : 'y'").result,
        Some(Value::String("y".to_string()))
    );
    assert_eq!(
        evaluator.evaluate("!false && 2 >= 2").result,
        Some(Value::Bool(true))
    );
    assert_eq!(
        evaluator.evaluate("'a' == 'b'").result,
        Some(Value::Bool(false))
    );
    // Short-circuiting skips the failing right-hand side.
    assert_eq!(
        evaluator.evaluate("false && $('Missing')").result,
        Some(Value::Bool(false))
    );
}

#[test]
fn type_mismatches_are_type_errors() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let outcome = evaluator.evaluate("'a' - 1");
    assert_eq!(outcome.error.expect("must error").name, "TypeError");

    let outcome = evaluator.evaluate("'a'.noSuchMethod()");
    assert_eq!(outcome.error.expect("must error").name, "TypeError");
}

#[test]
fn mock_flag_stays_unset_without_node_access() {
    let workflow = demo_workflow();
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let outcome = evaluator.evaluate("1 + 1");
    assert_eq!(outcome.result, Some(Value::Number(2.0)));
    assert!(!outcome.is_mock);
}
