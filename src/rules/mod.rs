//! Visibility and validation rules over a flat form-value map.
//!
//! Both runners are thin, fixed-binding specializations of the expression
//! evaluator: the field codes of the form are the scope, validators see the
//! candidate `value`, and invalidity is raised with the `fail(message)`
//! builtin. Visibility fails closed — a rule that cannot be evaluated hides
//! its field rather than risk exposing bad state.

use crate::eval::{Evaluator, FormBindings};
use crate::value::Value;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// The outcome of validating one field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub message: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

/// One field of a dynamically rendered form, as far as this engine needs to
/// know it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub code: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_source: Option<DynamicSourceSpec>,
}

/// Evaluates a visibility predicate. The rule must produce a boolean; any
/// failure, and any non-boolean result, counts as hidden.
pub fn is_visible(rule: &str, form_values: &AHashMap<String, Value>) -> bool {
    let bindings = FormBindings::new(form_values);
    let outcome = Evaluator::new(&bindings).evaluate(rule);
    matches!(
        (outcome.error, outcome.result),
        (None, Some(Value::Bool(true)))
    )
}

/// Evaluates a validation rule for one value. A normal completion means
/// valid; a raised failure's message becomes the user-facing reason, e.g.
/// `value > 0 || fail('must be positive')`.
pub fn validate(
    rule: &str,
    value: &Value,
    form_values: &AHashMap<String, Value>,
) -> ValidationOutcome {
    let bindings = FormBindings::with_current(form_values, value);
    let outcome = Evaluator::new(&bindings).evaluate(rule);
    match outcome.error {
        Some(failure) => ValidationOutcome::invalid(failure.message),
        None => ValidationOutcome::valid(),
    }
}

/// Validates a field end to end. A required field with no usable value is
/// invalid before any script rule runs.
pub fn validate_field(
    field: &FieldSchema,
    value: Option<&Value>,
    form_values: &AHashMap<String, Value>,
) -> ValidationOutcome {
    let missing = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    };

    if missing {
        if field.required {
            let shown = if field.label.is_empty() {
                &field.code
            } else {
                &field.label
            };
            return ValidationOutcome::invalid(format!("{} is required", shown));
        }
        return ValidationOutcome::valid();
    }

    match (&field.validator, value) {
        (Some(rule), Some(value)) => validate(rule, value, form_values),
        _ => ValidationOutcome::valid(),
    }
}

/// Whether a field is currently shown: not explicitly hidden, and its
/// visibility rule (if any) passes against the form values.
pub fn field_visible(field: &FieldSchema, form_values: &AHashMap<String, Value>) -> bool {
    if field.hidden {
        return false;
    }
    match &field.visible_when {
        Some(rule) => is_visible(rule, form_values),
        None => true,
    }
}

/// Drops every value whose field entry is absent from the schema, explicitly
/// hidden, or failing its visibility rule. Used when a dynamically fetched
/// sub-schema changes shape and stale values must not linger.
pub fn prune_hidden_fields(
    schema: &[FieldSchema],
    form_values: &AHashMap<String, Value>,
) -> AHashMap<String, Value> {
    form_values
        .iter()
        .filter(|(code, _)| {
            schema
                .iter()
                .find(|field| &field.code == *code)
                .is_some_and(|field| field_visible(field, form_values))
        })
        .map(|(code, value)| (code.clone(), value.clone()))
        .collect()
}

/// The request shape handed to the excluded dynamic-schema fetcher: a script
/// plus the field names whose values it depends on. The fetcher re-runs only
/// when the dependent values actually change, and must cancel an in-flight
/// request before issuing a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicSourceSpec {
    pub dependent_field_names: Vec<String>,
    pub script: String,
}

/// One selectable option returned by a dynamic option source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: serde_json::Value,
    pub label: String,
}

impl DynamicSourceSpec {
    /// Captures the current dependent values, in declaration order.
    pub fn dependency_snapshot(
        &self,
        form_values: &AHashMap<String, Value>,
    ) -> Vec<serde_json::Value> {
        self.dependent_field_names
            .iter()
            .map(|name| {
                form_values
                    .get(name)
                    .map(Value::to_json)
                    .unwrap_or(serde_json::Value::Null)
            })
            .collect()
    }

    /// Deep-equality comparison against a previous snapshot. Reference
    /// identity is not enough here: the form layer rebuilds value maps
    /// freely, and only a real change may retrigger a fetch.
    pub fn dependencies_changed(
        &self,
        previous: &[serde_json::Value],
        form_values: &AHashMap<String, Value>,
    ) -> bool {
        self.dependency_snapshot(form_values) != previous
    }
}
