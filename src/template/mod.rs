//! Splitting text templates around `{{ … }}` regions and rebuilding display
//! values from the evaluated segments.
//!
//! A failed segment never aborts the rest of the template: each expression's
//! error stays local to its own segment and only shows up in that segment's
//! rendered output.

use crate::eval::{EvaluationResult, Evaluator};
use crate::value::Value;
use chrono::SecondsFormat;
use regex::Regex;
use std::sync::LazyLock;

/// Non-greedy, left-to-right expression region scan.
static EXPRESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("expression region pattern"));

/// One unit of a parsed template: literal text, or an evaluated expression
/// region. `source` keeps the raw region text (including the delimiters), so
/// concatenating literal text with expression sources reconstructs the
/// original template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    Literal(String),
    Expression {
        source: String,
        outcome: EvaluationResult,
    },
}

/// Parses a template into ordered segments, evaluating each `{{ … }}` region
/// with the given evaluator. Empty literal runs between adjacent regions are
/// omitted.
pub fn parse_template(template: &str, evaluator: &Evaluator) -> Vec<TemplateSegment> {
    let mut segments = Vec::new();
    let mut last_end = 0;

    for captures in EXPRESSION_RE.captures_iter(template) {
        let region = captures.get(0).expect("whole match");
        if region.start() > last_end {
            segments.push(TemplateSegment::Literal(
                template[last_end..region.start()].to_string(),
            ));
        }

        let inner = captures.get(1).expect("inner expression").as_str().trim();
        segments.push(TemplateSegment::Expression {
            source: region.as_str().to_string(),
            outcome: evaluator.evaluate(inner),
        });
        last_end = region.end();
    }

    if last_end < template.len() || segments.is_empty() {
        segments.push(TemplateSegment::Literal(template[last_end..].to_string()));
    }

    segments
}

/// Renders segments into the display string: literals pass through verbatim,
/// expression values go through the type-aware formatter, and errors render
/// as `[ErrorName: message]`.
pub fn render(segments: &[TemplateSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            TemplateSegment::Literal(text) => out.push_str(text),
            TemplateSegment::Expression { outcome, .. } => {
                out.push_str(&display_outcome(outcome));
            }
        }
    }
    out
}

/// Folds segments into a single value, left to right, starting from the first
/// segment's resolved value. A template that is one lone expression region
/// yields that expression's value uncoerced; anything longer coerces through
/// string concatenation.
pub fn reduce(segments: &[TemplateSegment]) -> Value {
    let mut iter = segments.iter();
    let Some(first) = iter.next() else {
        return Value::String(String::new());
    };

    let mut accumulated = segment_value(first);
    for segment in iter {
        accumulated = Value::String(format!(
            "{}{}",
            accumulated.coerce_string(),
            segment_value(segment).coerce_string()
        ));
    }
    accumulated
}

fn segment_value(segment: &TemplateSegment) -> Value {
    match segment {
        TemplateSegment::Literal(text) => Value::String(text.clone()),
        TemplateSegment::Expression { outcome, .. } => match (&outcome.result, &outcome.error) {
            (Some(value), _) => value.clone(),
            (None, Some(error)) => Value::String(format!("[{}: {}]", error.name, error.message)),
            (None, None) => Value::Null,
        },
    }
}

fn display_outcome(outcome: &EvaluationResult) -> String {
    if let Some(error) = &outcome.error {
        return format!("[{}: {}]", error.name, error.message);
    }
    match &outcome.result {
        Some(value) => display_value(value),
        None => String::new(),
    }
}

/// Type-aware display form: structured values and dates are bracketed with
/// their type name, primitives use their natural string form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Object(_) => format!("[Object: {}]", value.to_json()),
        Value::Array(_) | Value::Repeated(_) => format!("[Array: {}]", value.to_json()),
        Value::DateTime(dt) => {
            format!("[Date: {}]", dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        other => other.coerce_string(),
    }
}
