//! The sandboxed expression evaluator.
//!
//! Evaluation runs against an explicit, immutable binding set built from the
//! current workflow snapshot on every call; nothing is registered ambiently
//! and nothing is cached across calls except the mock memo. The scope is a
//! *soft* isolation: it protects against accidental name collisions and gives
//! a controlled failure surface, not protection against deliberately
//! malicious input.
//!
//! The evaluator never raises past its boundary. Every failure — lexing,
//! parsing, runtime, node resolution, a rule's `fail(...)` — comes back as a
//! tagged [`EvaluationResult`] with a host-style error name and a
//! display-ready message.

pub mod builtins;

use crate::error::RuntimeError;
use crate::expr::{self, Expr, Literal};
use crate::graph::{self, Workflow};
use crate::schema::MockCache;
use crate::value::{FunctionTarget, FunctionValue, Value};
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::cmp::Ordering;

/// A user-displayable evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalFailure {
    pub name: String,
    pub message: String,
}

/// The tagged outcome of one expression evaluation.
///
/// Exactly one of `result`/`error` is meaningful: a successful evaluation
/// always carries `result: Some(..)` (with [`Value::Null`] for the host's
/// null), and failure is signaled solely by `error`. `is_mock` marks results
/// that relied on synthesized placeholder data.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub result: Option<Value>,
    pub error: Option<EvalFailure>,
    pub is_mock: bool,
}

impl EvaluationResult {
    pub fn success(value: Value) -> Self {
        Self {
            result: Some(value),
            error: None,
            is_mock: false,
        }
    }

    pub fn failure(name: &str, message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(EvalFailure {
                name: name.to_string(),
                message: message.into(),
            }),
            is_mock: false,
        }
    }

    pub fn with_mock(mut self, is_mock: bool) -> Self {
        self.is_mock = is_mock;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// The resolution of a `$('Name')` call.
pub struct NodeResolution {
    pub value: Value,
    pub is_mock: bool,
}

/// The fixed vocabulary visible inside one evaluation.
pub trait Bindings {
    /// Resolves a scope name; `None` becomes a reference error.
    fn resolve(&self, name: &str) -> Option<Value>;

    /// Resolves the `$('Name')` callable. Scopes without node access reject.
    fn node(&self, name: &str) -> Result<NodeResolution, RuntimeError> {
        let _ = name;
        Err(RuntimeError::NodeAccessUnavailable)
    }

    /// Whether the `fail(message)` callable is in scope.
    fn allows_fail(&self) -> bool {
        false
    }
}

/// Workflow-scope bindings: `$`, `$workflow`, `$now` and `$vars`, built fresh
/// from the document snapshot for every evaluation.
pub struct BindingSet<'w> {
    workflow: &'w Workflow,
    mock_cache: &'w MockCache,
    now: DateTime<Utc>,
}

impl<'w> BindingSet<'w> {
    pub fn new(workflow: &'w Workflow, mock_cache: &'w MockCache) -> Self {
        Self {
            workflow,
            mock_cache,
            now: Utc::now(),
        }
    }
}

impl Bindings for BindingSet<'_> {
    fn resolve(&self, name: &str) -> Option<Value> {
        match name {
            "$" => Some(Value::Function(FunctionValue {
                name: "$".to_string(),
                target: FunctionTarget::NodeRef,
            })),
            "$workflow" => {
                let mut meta = AHashMap::with_capacity(2);
                meta.insert(
                    "name".to_string(),
                    Value::String(self.workflow.name.clone()),
                );
                meta.insert("id".to_string(), Value::String(self.workflow.id.clone()));
                Some(Value::Object(meta))
            }
            "$now" => Some(Value::DateTime(self.now)),
            "$vars" => {
                let vars = self
                    .workflow
                    .vars
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect();
                Some(Value::Object(vars))
            }
            _ => None,
        }
    }

    fn node(&self, name: &str) -> Result<NodeResolution, RuntimeError> {
        // Full-document search by display name: evaluation resolves any node,
        // even ones completion would not suggest for the current position.
        let node = graph::find_by_name(&self.workflow.root, name)
            .ok_or_else(|| RuntimeError::NodeNotFound(name.to_string()))?;

        if let Some(sample) = &node.data.sample_data {
            return Ok(NodeResolution {
                value: node_reference(true, Value::from_json(sample)),
                is_mock: false,
            });
        }

        if let Some(schema) = &node.data.output_schema {
            let mock = self.mock_cache.synthesize(schema)?;
            return Ok(NodeResolution {
                value: node_reference(false, (*mock).clone()),
                is_mock: true,
            });
        }

        Err(RuntimeError::NodeHasNoOutput(name.to_string()))
    }
}

fn node_reference(is_executed: bool, outputs: Value) -> Value {
    let mut reference = AHashMap::with_capacity(2);
    reference.insert("isExecuted".to_string(), Value::Bool(is_executed));
    reference.insert("outputs".to_string(), outputs);
    Value::Object(reference)
}

/// Form-scope bindings used by visibility and validation rules: each field
/// code resolves to its current value, and validators additionally see
/// `value` and may call `fail(message)`.
pub struct FormBindings<'a> {
    values: &'a AHashMap<String, Value>,
    current: Option<&'a Value>,
}

impl<'a> FormBindings<'a> {
    pub fn new(values: &'a AHashMap<String, Value>) -> Self {
        Self {
            values,
            current: None,
        }
    }

    pub fn with_current(values: &'a AHashMap<String, Value>, current: &'a Value) -> Self {
        Self {
            values,
            current: Some(current),
        }
    }
}

impl Bindings for FormBindings<'_> {
    fn resolve(&self, name: &str) -> Option<Value> {
        if name == "value" {
            if let Some(current) = self.current {
                return Some(current.clone());
            }
        }
        self.values.get(name).cloned()
    }

    fn allows_fail(&self) -> bool {
        true
    }
}

/// Evaluates expression fragments against a binding set.
pub struct Evaluator<'b> {
    bindings: &'b dyn Bindings,
}

impl<'b> Evaluator<'b> {
    pub fn new(bindings: &'b dyn Bindings) -> Self {
        Self { bindings }
    }

    /// Evaluates one expression fragment. Never panics and never returns
    /// `Err`; every failure is a tagged result.
    pub fn evaluate(&self, source: &str) -> EvaluationResult {
        let parsed = match expr::parse(source) {
            Ok(parsed) => parsed,
            Err(e) => return EvaluationResult::failure("SyntaxError", e.to_string()),
        };

        let interpreter = Interpreter {
            bindings: self.bindings,
            used_mock: Cell::new(false),
        };

        let outcome = match interpreter.eval(&parsed) {
            // A bare callable has no serializable value for template purposes.
            Ok(Value::Function(_)) => EvaluationResult::failure(
                "Error",
                format!(
                    "{} was not invoked as a function; referencing it directly is not supported",
                    source.trim()
                ),
            ),
            Ok(value) => EvaluationResult::success(value),
            Err(e) => EvaluationResult::failure(e.error_name(), e.to_string()),
        };

        outcome.with_mock(interpreter.used_mock.get())
    }
}

// Generates the match arm body for a binary operation of the given family.
macro_rules! eval_op {
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, number) => {
        $self.eval_numeric($l, $r, $op_str, $op_fn)
    };
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, ordering) => {
        $self.eval_ordering($l, $r, $op_str, $op_fn)
    };
}

/// The recursive engine for one fully-bound expression tree.
struct Interpreter<'b> {
    bindings: &'b dyn Bindings,
    used_mock: Cell<bool>,
}

impl Interpreter<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
            }),
            Expr::Identifier(name) => self.resolve_name(name),
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval(element)?);
                }
                Ok(Value::Array(items))
            }

            Expr::Member { object, property } => {
                let value = self.eval(object)?;
                self.member(value, property)
            }
            Expr::Index { object, index } => {
                let value = self.eval(object)?;
                let index = self.eval(index)?;
                self.index(value, index)
            }
            Expr::Call { callee, args } => {
                let callee_value = self.eval(callee)?;
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.eval(arg)?);
                }
                match callee_value {
                    Value::Function(function) => self.call(function, evaluated),
                    _ => Err(RuntimeError::NotCallable(callee_label(callee))),
                }
            }

            // --- Arithmetic ---
            Expr::Sum(l, r) => self.eval_sum(l, r),
            Expr::Subtract(l, r) => eval_op!(self, l, r, "-", |a, b| a - b, number),
            Expr::Multiply(l, r) => eval_op!(self, l, r, "*", |a, b| a * b, number),
            Expr::Divide(l, r) => eval_op!(self, l, r, "/", |a, b| a / b, number),
            Expr::Modulo(l, r) => eval_op!(self, l, r, "%", |a, b| a % b, number),
            Expr::Negate(v) => match self.eval(v)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(self.type_mismatch("-", "Number", other)),
            },

            // --- Logical, short-circuiting ---
            Expr::Not(v) => Ok(Value::Bool(!self.eval(v)?.is_truthy())),
            Expr::And(l, r) => {
                if !self.eval(l)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval(r)?.is_truthy()))
            }
            Expr::Or(l, r) => {
                if self.eval(l)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval(r)?.is_truthy()))
            }

            // --- Equality: cross-type comparisons are simply unequal ---
            Expr::Equal(l, r) => Ok(Value::Bool(self.eval(l)? == self.eval(r)?)),
            Expr::NotEqual(l, r) => Ok(Value::Bool(self.eval(l)? != self.eval(r)?)),

            // --- Ordering ---
            Expr::GreaterThan(l, r) => {
                eval_op!(self, l, r, ">", |o| o == Ordering::Greater, ordering)
            }
            Expr::GreaterThanOrEqual(l, r) => {
                eval_op!(self, l, r, ">=", |o| o != Ordering::Less, ordering)
            }
            Expr::SmallerThan(l, r) => {
                eval_op!(self, l, r, "<", |o| o == Ordering::Less, ordering)
            }
            Expr::SmallerThanOrEqual(l, r) => {
                eval_op!(self, l, r, "<=", |o| o != Ordering::Greater, ordering)
            }

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(then_branch)
                } else {
                    self.eval(else_branch)
                }
            }
        }
    }

    fn resolve_name(&self, name: &str) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.resolve(name) {
            return Ok(value);
        }
        if let Some(namespace) = builtins::namespace_object(name) {
            return Ok(namespace);
        }
        if name == "fail" && self.bindings.allows_fail() {
            return Ok(Value::Function(FunctionValue {
                name: "fail".to_string(),
                target: FunctionTarget::Fail,
            }));
        }
        Err(RuntimeError::UnknownName(name.to_string()))
    }

    fn member(&self, object: Value, property: &str) -> Result<Value, RuntimeError> {
        if let Value::Object(entries) = &object {
            return entries
                .get(property)
                .cloned()
                .ok_or_else(|| RuntimeError::UnknownMember {
                    type_name: "object".to_string(),
                    member: property.to_string(),
                });
        }

        if property == "length" {
            match &object {
                Value::String(s) => return Ok(Value::Number(s.chars().count() as f64)),
                Value::Array(items) => return Ok(Value::Number(items.len() as f64)),
                Value::Repeated(view) => return Ok(Value::Number(view.len() as f64)),
                _ => {}
            }
        }

        let type_name = object.type_name();
        if builtins::method_exists(type_name, property) {
            Ok(Value::Function(FunctionValue {
                name: property.to_string(),
                target: FunctionTarget::Method {
                    receiver: Box::new(object),
                    method: property.to_string(),
                },
            }))
        } else {
            Err(RuntimeError::UnknownMember {
                type_name: type_name.to_string(),
                member: property.to_string(),
            })
        }
    }

    fn index(&self, object: Value, index: Value) -> Result<Value, RuntimeError> {
        match (&object, &index) {
            // A repeated view answers every integer index with its element.
            (Value::Repeated(view), Value::Number(_)) => Ok(view.element().clone()),
            (Value::Array(items), Value::Number(n)) => {
                let position = *n;
                if position < 0.0 || position.fract() != 0.0 {
                    return Ok(Value::Null);
                }
                Ok(items.get(position as usize).cloned().unwrap_or(Value::Null))
            }
            (Value::String(s), Value::Number(n)) => {
                let position = *n;
                if position < 0.0 || position.fract() != 0.0 {
                    return Ok(Value::Null);
                }
                Ok(s.chars()
                    .nth(position as usize)
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Null))
            }
            (Value::Object(entries), Value::String(key)) => {
                Ok(entries.get(key).cloned().unwrap_or(Value::Null))
            }
            _ => Err(self.type_mismatch("index", "an indexable value", object.clone())),
        }
    }

    fn call(&self, function: FunctionValue, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match function.target {
            FunctionTarget::Namespace { namespace, method } => {
                builtins::call_namespace(namespace, method, &args)
            }
            FunctionTarget::Method { receiver, method } => {
                builtins::call_method(&receiver, &method, &args)
            }
            FunctionTarget::NodeRef => {
                if args.len() != 1 {
                    return Err(RuntimeError::WrongArity {
                        function: "$".to_string(),
                        expected: 1,
                        received: args.len(),
                    });
                }
                let name = match &args[0] {
                    Value::String(name) => name.clone(),
                    other => return Err(self.type_mismatch("$", "String", other.clone())),
                };
                let resolution = self.bindings.node(&name)?;
                if resolution.is_mock {
                    self.used_mock.set(true);
                }
                Ok(resolution.value)
            }
            FunctionTarget::Fail => {
                if args.len() != 1 {
                    return Err(RuntimeError::WrongArity {
                        function: "fail".to_string(),
                        expected: 1,
                        received: args.len(),
                    });
                }
                Err(RuntimeError::Raised(args[0].coerce_string()))
            }
        }
    }

    fn eval_sum(&self, l: &Expr, r: &Expr) -> Result<Value, RuntimeError> {
        let left = self.eval(l)?;
        let right = self.eval(r)?;
        match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            // One string operand makes '+' a concatenation.
            (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::String(format!(
                "{}{}",
                left.coerce_string(),
                right.coerce_string()
            ))),
            _ => Err(self.type_mismatch("+", "Number", left.clone())),
        }
    }

    fn eval_numeric<F>(
        &self,
        l: &Expr,
        r: &Expr,
        op: &'static str,
        f: F,
    ) -> Result<Value, RuntimeError>
    where
        F: Fn(f64, f64) -> f64,
    {
        let left = self.eval(l)?;
        let right = self.eval(r)?;
        match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
            (Value::Number(_), _) => Err(self.type_mismatch(op, "Number", right.clone())),
            _ => Err(self.type_mismatch(op, "Number", left.clone())),
        }
    }

    fn eval_ordering<F>(
        &self,
        l: &Expr,
        r: &Expr,
        op: &'static str,
        f: F,
    ) -> Result<Value, RuntimeError>
    where
        F: Fn(Ordering) -> bool,
    {
        let left = self.eval(l)?;
        let right = self.eval(r)?;
        match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => {
                Ok(Value::Bool(a.partial_cmp(b).map(&f).unwrap_or(false)))
            }
            (Value::String(a), Value::String(b)) => Ok(Value::Bool(f(a.cmp(b)))),
            (Value::Number(_) | Value::String(_), _) => {
                Err(self.type_mismatch(op, "a comparable value", right.clone()))
            }
            _ => Err(self.type_mismatch(op, "a comparable value", left.clone())),
        }
    }

    fn type_mismatch(&self, op: &str, expected: &str, found: Value) -> RuntimeError {
        RuntimeError::TypeMismatch {
            operation: op.to_string(),
            expected: expected.to_string(),
            found,
        }
    }
}

/// A short label for the callee in a "not a function" message.
fn callee_label(callee: &Expr) -> String {
    match callee {
        Expr::Identifier(name) => name.clone(),
        Expr::Member { property, .. } => property.clone(),
        _ => "expression".to_string(),
    }
}
