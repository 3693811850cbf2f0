use crate::value::Value;
use thiserror::Error;

/// Errors produced while tokenizing or parsing an expression fragment.
///
/// Messages deliberately carry no byte offsets: they are shown verbatim in the
/// editor next to the offending template region.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unrecognized token '{0}'")]
    InvalidToken(String),

    #[error("Unexpected '{found}', expected {expected}")]
    UnexpectedToken { found: String, expected: String },

    #[error("Expression ended unexpectedly, expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),
}

/// Errors raised while interpreting a parsed expression.
///
/// These never cross the evaluator boundary as `Err`; the evaluator converts
/// them into tagged failure results with [`RuntimeError::error_name`] as the
/// user-visible error kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("'{0}' is not defined")]
    UnknownName(String),

    #[error("{type_name} has no member '{member}'")]
    UnknownMember { type_name: String, member: String },

    #[error("'{0}' is not a function")]
    NotCallable(String),

    #[error("{function} expects {expected} argument(s), but received {received}")]
    WrongArity {
        function: String,
        expected: usize,
        received: usize,
    },

    #[error("Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'")]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("No node named '{0}' exists in this workflow")]
    NodeNotFound(String),

    #[error("Node '{0}' declares neither an output schema nor sample data")]
    NodeHasNoOutput(String),

    #[error("Node references are not available in this context")]
    NodeAccessUnavailable,

    #[error("{0}")]
    Raised(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl RuntimeError {
    /// The host-style error kind shown alongside the message.
    pub fn error_name(&self) -> &'static str {
        match self {
            RuntimeError::UnknownName(_) => "ReferenceError",
            RuntimeError::UnknownMember { .. }
            | RuntimeError::NotCallable(_)
            | RuntimeError::WrongArity { .. }
            | RuntimeError::TypeMismatch { .. } => "TypeError",
            RuntimeError::Schema(_) => "SchemaError",
            RuntimeError::NodeNotFound(_)
            | RuntimeError::NodeHasNoOutput(_)
            | RuntimeError::NodeAccessUnavailable
            | RuntimeError::Raised(_) => "Error",
        }
    }
}

/// Errors indicating a malformed output schema.
///
/// These are authoring defects, not runtime conditions: unknown type names are
/// already rejected when a document is deserialized, and the remaining
/// structural invariant fails loudly here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Schema item '{code}' has a primitive type but carries child items")]
    PrimitiveWithChildren { code: String },
}

/// Errors produced while resolving positions in the workflow node tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node '{0}' was not found in the workflow document")]
    NodeNotFound(String),
}
