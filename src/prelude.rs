//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and functions so downstream code
//! can `use hinagata::prelude::*;` instead of importing each item
//! individually.

// Evaluation
pub use crate::eval::{
    BindingSet, Bindings, EvalFailure, EvaluationResult, Evaluator, FormBindings, NodeResolution,
};

// Values
pub use crate::value::{FunctionTarget, FunctionValue, RepeatedView, Value};

// Workflow graph
pub use crate::graph::{
    InputBinding, NodeCapabilities, NodeData, NodeKind, Workflow, WorkflowNode, find_by_id,
    find_by_name, previous_nodes,
};

// Output schemas and mock synthesis
pub use crate::schema::{MockCache, OutputSchema, OutputSchemaItem, SchemaType};

// Templates
pub use crate::template::{TemplateSegment, display_value, parse_template, reduce, render};

// Rules
pub use crate::rules::{
    DynamicSourceSpec, FieldSchema, OptionItem, ValidationOutcome, field_visible, is_visible,
    prune_hidden_fields, validate, validate_field,
};

// Completion
pub use crate::complete::{Completion, CompletionKind, CompletionResponse, completions_at};

// Error types
pub use crate::error::{GraphError, ParseError, RuntimeError, SchemaError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
