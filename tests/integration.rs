//! End-to-end tests wiring the graph, synthesizer, evaluator and template
//! parser together the way the editor does.
mod common;
use common::*;
use hinagata::prelude::*;
use std::rc::Rc;

#[test]
fn template_renders_against_synthesized_output() {
    // A precedes B; B's template references A, which has never run.
    let workflow = document(vec![
        leaf("a", "A", Some(output_of("value", SchemaType::Number))),
        leaf("b", "B", Some(output_of("value", SchemaType::Number))),
    ]);
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let segments = parse_template("Sum: {{ $('A').outputs.value + 1 }}", &evaluator);
    assert_eq!(render(&segments), "Sum: 2");

    let TemplateSegment::Expression { outcome, .. } = &segments[1] else {
        panic!("expected an expression segment");
    };
    assert!(outcome.is_mock, "provisional values must be flagged");
}

#[test]
fn template_renders_against_captured_sample_data() {
    let workflow = document(vec![
        with_sample(
            leaf("a", "A", Some(output_of("value", SchemaType::Number))),
            serde_json::json!({"value": 41}),
        ),
        leaf("b", "B", Some(output_of("value", SchemaType::Number))),
    ]);
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let segments = parse_template("Sum: {{ $('A').outputs.value + 1 }}", &evaluator);
    assert_eq!(render(&segments), "Sum: 42");

    let TemplateSegment::Expression { outcome, .. } = &segments[1] else {
        panic!("expected an expression segment");
    };
    assert!(!outcome.is_mock);
}

#[test]
fn repeated_array_view_tolerates_any_index() {
    let schema: OutputSchema = Rc::new(vec![
        OutputSchemaItem::new("items", "Items", SchemaType::Array)
            .with_children(vec![OutputSchemaItem::new("", "", SchemaType::String)]),
    ]);
    let workflow = document(vec![leaf("a", "A", Some(schema))]);
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    for expr in [
        "$('A').outputs.items[0]",
        "$('A').outputs.items[1]",
        "$('A').outputs.items[999]",
    ] {
        let outcome = evaluator.evaluate(expr);
        assert_eq!(
            outcome.result,
            Some(Value::String("sample value".to_string())),
            "index access through {}",
            expr
        );
    }

    assert_eq!(
        evaluator.evaluate("$('A').outputs.items.length").result,
        Some(Value::Number(1.0))
    );
}

#[test]
fn mock_synthesis_is_stable_across_repeated_evaluations() {
    let workflow = document(vec![leaf(
        "a",
        "A",
        Some(output_of("value", SchemaType::Number)),
    )]);
    let cache = MockCache::new();
    let bindings = BindingSet::new(&workflow, &cache);
    let evaluator = Evaluator::new(&bindings);

    let first = evaluator.evaluate("$('A').outputs.value");
    let second = evaluator.evaluate("$('A').outputs.value");
    assert_eq!(first.result, second.result);
}

#[test]
fn workflow_documents_deserialize_from_editor_json() {
    let json = serde_json::json!({
        "id": "wf-9",
        "name": "Imported",
        "vars": {"env": "prod"},
        "root": {
            "id": "root",
            "kind": "start",
            "data": {},
            "children": [
                {
                    "id": "n1",
                    "kind": "httpRequest",
                    "data": {
                        "name": "Fetch",
                        "description": "Fetches the record",
                        "outputSchema": [
                            {"code": "status", "label": "Status", "type": "number"},
                            {"code": "body", "label": "Body", "type": "object", "children": []}
                        ],
                        "inputs": {
                            "url": {"value": "https://example.test", "isExpression": false}
                        }
                    },
                    "children": []
                }
            ]
        }
    });

    let workflow: Workflow = serde_json::from_value(json).expect("document must deserialize");
    assert_eq!(workflow.root.children.len(), 1);

    let node = &workflow.root.children[0];
    assert_eq!(node.kind, NodeKind::Custom("httpRequest".to_string()));
    assert_eq!(node.data.name, "Fetch");
    let schema = node.data.output_schema.as_ref().expect("schema present");
    assert_eq!(schema.len(), 2);
    assert_eq!(schema[0].schema_type, SchemaType::Number);
    assert!(!node.data.inputs["url"].is_expression);
}

#[test]
fn unknown_schema_type_names_fail_at_the_boundary() {
    let malformed = serde_json::json!({
        "code": "ts", "label": "Timestamp", "type": "datetime"
    });
    assert!(serde_json::from_value::<OutputSchemaItem>(malformed).is_err());
}

#[test]
fn prelude_exports_are_usable() {
    let _evaluation: Option<EvaluationResult> = None;
    let _segment: Option<TemplateSegment> = None;
    let _value: Option<Value> = None;
    let _completion: Option<Completion> = None;
    let _outcome: Option<ValidationOutcome> = None;
    let _result: hinagata::prelude::Result<()> = Ok(());
}
