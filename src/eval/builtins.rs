//! Builtin utility namespaces and per-type methods.
//!
//! One table serves two consumers: the interpreter dispatches calls through
//! it, and the completion resolver displays its signatures, parameter lists
//! and examples next to candidates.

use crate::error::RuntimeError;
use crate::value::{FunctionTarget, FunctionValue, Value};
use ahash::AHashMap;
use chrono::{DateTime, SecondsFormat, Utc};

/// Documentation and dispatch metadata for one builtin function or method.
#[derive(Debug, Clone, Copy)]
pub struct MethodDoc {
    pub name: &'static str,
    pub signature: &'static str,
    pub parameters: &'static [&'static str],
    pub documentation: &'static str,
    pub example: &'static str,
}

/// A builtin utility namespace with its member table.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceDoc {
    pub name: &'static str,
    pub description: &'static str,
    pub methods: &'static [MethodDoc],
}

const MATH_METHODS: &[MethodDoc] = &[
    MethodDoc {
        name: "abs",
        signature: "Math.abs(x: number): number",
        parameters: &["x"],
        documentation: "Return the absolute value.",
        example: "Math.abs(-2) // 2",
    },
    MethodDoc {
        name: "floor",
        signature: "Math.floor(x: number): number",
        parameters: &["x"],
        documentation: "Round down to the nearest integer.",
        example: "Math.floor(2.7) // 2",
    },
    MethodDoc {
        name: "ceil",
        signature: "Math.ceil(x: number): number",
        parameters: &["x"],
        documentation: "Round up to the nearest integer.",
        example: "Math.ceil(2.1) // 3",
    },
    MethodDoc {
        name: "round",
        signature: "Math.round(x: number): number",
        parameters: &["x"],
        documentation: "Round to the nearest integer.",
        example: "Math.round(2.5) // 3",
    },
    MethodDoc {
        name: "min",
        signature: "Math.min(a: number, b: number): number",
        parameters: &["a", "b"],
        documentation: "Return the smaller of two numbers.",
        example: "Math.min(1, 2) // 1",
    },
    MethodDoc {
        name: "max",
        signature: "Math.max(a: number, b: number): number",
        parameters: &["a", "b"],
        documentation: "Return the larger of two numbers.",
        example: "Math.max(1, 2) // 2",
    },
];

const DATE_NAMESPACE_METHODS: &[MethodDoc] = &[
    MethodDoc {
        name: "now",
        signature: "Date.now(): date",
        parameters: &[],
        documentation: "Return the current instant.",
        example: "Date.now().toISOString()",
    },
    MethodDoc {
        name: "parse",
        signature: "Date.parse(text: string): date",
        parameters: &["text"],
        documentation: "Parse an RFC 3339 timestamp.",
        example: "Date.parse('2024-01-01T00:00:00Z')",
    },
];

const OBJECT_METHODS: &[MethodDoc] = &[
    MethodDoc {
        name: "keys",
        signature: "Object.keys(value: object): array",
        parameters: &["value"],
        documentation: "Return the object's own keys, sorted.",
        example: "Object.keys({a: 1}) // ['a']",
    },
    MethodDoc {
        name: "values",
        signature: "Object.values(value: object): array",
        parameters: &["value"],
        documentation: "Return the object's own values, ordered by key.",
        example: "Object.values({a: 1}) // [1]",
    },
];

const JSON_METHODS: &[MethodDoc] = &[
    MethodDoc {
        name: "stringify",
        signature: "JSON.stringify(value: any): string",
        parameters: &["value"],
        documentation: "Serialize a value as JSON text.",
        example: "JSON.stringify({a: 1}) // '{\"a\":1}'",
    },
    MethodDoc {
        name: "parse",
        signature: "JSON.parse(text: string): any",
        parameters: &["text"],
        documentation: "Parse JSON text into a value.",
        example: "JSON.parse('[1, 2]') // [1, 2]",
    },
];

const ARRAY_NAMESPACE_METHODS: &[MethodDoc] = &[
    MethodDoc {
        name: "isArray",
        signature: "Array.isArray(value: any): boolean",
        parameters: &["value"],
        documentation: "Check whether the value is an array.",
        example: "Array.isArray([1]) // true",
    },
    MethodDoc {
        name: "from",
        signature: "Array.from(value: array | string): array",
        parameters: &["value"],
        documentation: "Materialize an array from an array-like value.",
        example: "Array.from('ab') // ['a', 'b']",
    },
];

const NAMESPACES: &[NamespaceDoc] = &[
    NamespaceDoc {
        name: "Math",
        description: "Mathematical utility functions",
        methods: MATH_METHODS,
    },
    NamespaceDoc {
        name: "Date",
        description: "Date and time utilities",
        methods: DATE_NAMESPACE_METHODS,
    },
    NamespaceDoc {
        name: "Object",
        description: "Structured-data utilities",
        methods: OBJECT_METHODS,
    },
    NamespaceDoc {
        name: "JSON",
        description: "JSON serialization utilities",
        methods: JSON_METHODS,
    },
    NamespaceDoc {
        name: "Array",
        description: "Array utilities",
        methods: ARRAY_NAMESPACE_METHODS,
    },
];

const STRING_METHODS: &[MethodDoc] = &[
    MethodDoc {
        name: "toUpperCase",
        signature: "string.toUpperCase(): string",
        parameters: &[],
        documentation: "Convert to uppercase.",
        example: "'ab'.toUpperCase() // 'AB'",
    },
    MethodDoc {
        name: "toLowerCase",
        signature: "string.toLowerCase(): string",
        parameters: &[],
        documentation: "Convert to lowercase.",
        example: "'AB'.toLowerCase() // 'ab'",
    },
    MethodDoc {
        name: "trim",
        signature: "string.trim(): string",
        parameters: &[],
        documentation: "Remove whitespace from both ends.",
        example: "' a '.trim() // 'a'",
    },
    MethodDoc {
        name: "split",
        signature: "string.split(separator: string): array",
        parameters: &["separator"],
        documentation: "Split the string into an array.",
        example: "'a,b'.split(',') // ['a', 'b']",
    },
    MethodDoc {
        name: "includes",
        signature: "string.includes(substring: string): boolean",
        parameters: &["substring"],
        documentation: "Check whether the string contains the substring.",
        example: "'abc'.includes('b') // true",
    },
    MethodDoc {
        name: "startsWith",
        signature: "string.startsWith(prefix: string): boolean",
        parameters: &["prefix"],
        documentation: "Check whether the string starts with the prefix.",
        example: "'abc'.startsWith('a') // true",
    },
    MethodDoc {
        name: "endsWith",
        signature: "string.endsWith(suffix: string): boolean",
        parameters: &["suffix"],
        documentation: "Check whether the string ends with the suffix.",
        example: "'abc'.endsWith('c') // true",
    },
    MethodDoc {
        name: "replace",
        signature: "string.replace(search: string, replacement: string): string",
        parameters: &["search", "replacement"],
        documentation: "Replace the first occurrence.",
        example: "'aa'.replace('a', 'b') // 'ba'",
    },
    MethodDoc {
        name: "slice",
        signature: "string.slice(start: number, end?: number): string",
        parameters: &["start", "end"],
        documentation: "Extract a portion of the string.",
        example: "'abc'.slice(1) // 'bc'",
    },
];

const NUMBER_METHODS: &[MethodDoc] = &[MethodDoc {
    name: "toFixed",
    signature: "number.toFixed(digits: number): string",
    parameters: &["digits"],
    documentation: "Format with a fixed number of fraction digits.",
    example: "(1.005).toFixed(2) // '1.00'",
}];

const ARRAY_METHODS: &[MethodDoc] = &[
    MethodDoc {
        name: "join",
        signature: "array.join(separator: string): string",
        parameters: &["separator"],
        documentation: "Join the elements into a string.",
        example: "[1, 2].join('-') // '1-2'",
    },
    MethodDoc {
        name: "includes",
        signature: "array.includes(value: any): boolean",
        parameters: &["value"],
        documentation: "Check whether the array contains the value.",
        example: "[1, 2].includes(2) // true",
    },
    MethodDoc {
        name: "indexOf",
        signature: "array.indexOf(value: any): number",
        parameters: &["value"],
        documentation: "Return the index of the value, or -1.",
        example: "[1, 2].indexOf(2) // 1",
    },
    MethodDoc {
        name: "slice",
        signature: "array.slice(start: number, end?: number): array",
        parameters: &["start", "end"],
        documentation: "Return a portion of the array.",
        example: "[1, 2, 3].slice(1) // [2, 3]",
    },
    MethodDoc {
        name: "concat",
        signature: "array.concat(other: array): array",
        parameters: &["other"],
        documentation: "Return a new array with elements from both arrays.",
        example: "[1].concat([2]) // [1, 2]",
    },
    MethodDoc {
        name: "reverse",
        signature: "array.reverse(): array",
        parameters: &[],
        documentation: "Return a new array with the elements reversed.",
        example: "[1, 2].reverse() // [2, 1]",
    },
];

const DATE_METHODS: &[MethodDoc] = &[
    MethodDoc {
        name: "toISOString",
        signature: "date.toISOString(): string",
        parameters: &[],
        documentation: "Format as an RFC 3339 timestamp.",
        example: "$now.toISOString()",
    },
    MethodDoc {
        name: "format",
        signature: "date.format(pattern: string): string",
        parameters: &["pattern"],
        documentation: "Format with a strftime-style pattern.",
        example: "$now.format('%Y-%m-%d')",
    },
];

/// All builtin namespaces, for completion display.
pub fn namespaces() -> &'static [NamespaceDoc] {
    NAMESPACES
}

/// Looks up one namespace's documentation table.
pub fn namespace_doc(name: &str) -> Option<&'static NamespaceDoc> {
    NAMESPACES.iter().find(|ns| ns.name == name)
}

/// Builds the value a bare namespace identifier resolves to: an object whose
/// members are the namespace's callables.
pub fn namespace_object(name: &str) -> Option<Value> {
    let doc = namespace_doc(name)?;
    let mut members = AHashMap::with_capacity(doc.methods.len());
    for method in doc.methods {
        members.insert(
            method.name.to_string(),
            Value::Function(FunctionValue {
                name: format!("{}.{}", doc.name, method.name),
                target: FunctionTarget::Namespace {
                    namespace: doc.name,
                    method: method.name,
                },
            }),
        );
    }
    Some(Value::Object(members))
}

/// The method table for a runtime type name, for member completion.
pub fn methods_for(type_name: &str) -> &'static [MethodDoc] {
    match type_name {
        "string" => STRING_METHODS,
        "number" => NUMBER_METHODS,
        "array" => ARRAY_METHODS,
        "date" => DATE_METHODS,
        _ => &[],
    }
}

/// Whether `name` is a method on values of the given runtime type.
pub fn method_exists(type_name: &str, name: &str) -> bool {
    methods_for(type_name).iter().any(|m| m.name == name)
}

/// Checks the argument count, mirroring the message shape used for all
/// callable errors.
fn require_args(function: &str, args: &[Value], count: usize) -> Result<(), RuntimeError> {
    if args.len() != count {
        return Err(RuntimeError::WrongArity {
            function: function.to_string(),
            expected: count,
            received: args.len(),
        });
    }
    Ok(())
}

fn arg_number(function: &str, args: &[Value], index: usize) -> Result<f64, RuntimeError> {
    match &args[index] {
        Value::Number(n) => Ok(*n),
        other => Err(RuntimeError::TypeMismatch {
            operation: function.to_string(),
            expected: "Number".to_string(),
            found: other.clone(),
        }),
    }
}

fn arg_string(function: &str, args: &[Value], index: usize) -> Result<String, RuntimeError> {
    match &args[index] {
        Value::String(s) => Ok(s.clone()),
        other => Err(RuntimeError::TypeMismatch {
            operation: function.to_string(),
            expected: "String".to_string(),
            found: other.clone(),
        }),
    }
}

/// Dispatches a namespace function call, e.g. `Math.abs(-2)`.
pub fn call_namespace(
    namespace: &'static str,
    method: &'static str,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let function = format!("{}.{}", namespace, method);
    match (namespace, method) {
        ("Math", "abs") => {
            require_args(&function, args, 1)?;
            Ok(Value::Number(arg_number(&function, args, 0)?.abs()))
        }
        ("Math", "floor") => {
            require_args(&function, args, 1)?;
            Ok(Value::Number(arg_number(&function, args, 0)?.floor()))
        }
        ("Math", "ceil") => {
            require_args(&function, args, 1)?;
            Ok(Value::Number(arg_number(&function, args, 0)?.ceil()))
        }
        ("Math", "round") => {
            require_args(&function, args, 1)?;
            Ok(Value::Number(arg_number(&function, args, 0)?.round()))
        }
        ("Math", "min") => {
            require_args(&function, args, 2)?;
            let (a, b) = (
                arg_number(&function, args, 0)?,
                arg_number(&function, args, 1)?,
            );
            Ok(Value::Number(a.min(b)))
        }
        ("Math", "max") => {
            require_args(&function, args, 2)?;
            let (a, b) = (
                arg_number(&function, args, 0)?,
                arg_number(&function, args, 1)?,
            );
            Ok(Value::Number(a.max(b)))
        }
        ("Date", "now") => {
            require_args(&function, args, 0)?;
            Ok(Value::DateTime(Utc::now()))
        }
        ("Date", "parse") => {
            require_args(&function, args, 1)?;
            let text = arg_string(&function, args, 0)?;
            DateTime::parse_from_rfc3339(&text)
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
                .map_err(|_| RuntimeError::Raised(format!("Cannot parse '{}' as a date", text)))
        }
        ("Object", "keys") => {
            require_args(&function, args, 1)?;
            let entries = arg_object(&function, args, 0)?;
            let mut keys: Vec<String> = entries.keys().cloned().collect();
            keys.sort();
            Ok(Value::Array(keys.into_iter().map(Value::String).collect()))
        }
        ("Object", "values") => {
            require_args(&function, args, 1)?;
            let entries = arg_object(&function, args, 0)?;
            let mut keys: Vec<&String> = entries.keys().collect();
            keys.sort();
            Ok(Value::Array(
                keys.into_iter().map(|k| entries[k].clone()).collect(),
            ))
        }
        ("JSON", "stringify") => {
            require_args(&function, args, 1)?;
            Ok(Value::String(args[0].to_json().to_string()))
        }
        ("JSON", "parse") => {
            require_args(&function, args, 1)?;
            let text = arg_string(&function, args, 0)?;
            serde_json::from_str::<serde_json::Value>(&text)
                .map(|json| Value::from_json(&json))
                .map_err(|_| RuntimeError::Raised(format!("Cannot parse '{}' as JSON", text)))
        }
        ("Array", "isArray") => {
            require_args(&function, args, 1)?;
            Ok(Value::Bool(matches!(
                args[0],
                Value::Array(_) | Value::Repeated(_)
            )))
        }
        ("Array", "from") => {
            require_args(&function, args, 1)?;
            match &args[0] {
                Value::Array(items) => Ok(Value::Array(items.clone())),
                Value::Repeated(view) => Ok(Value::Array(view.iter().cloned().collect())),
                Value::String(s) => Ok(Value::Array(
                    s.chars().map(|c| Value::String(c.to_string())).collect(),
                )),
                other => Err(RuntimeError::TypeMismatch {
                    operation: function,
                    expected: "Array".to_string(),
                    found: other.clone(),
                }),
            }
        }
        _ => Err(RuntimeError::UnknownMember {
            type_name: namespace.to_string(),
            member: method.to_string(),
        }),
    }
}

fn arg_object<'a>(
    function: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a AHashMap<String, Value>, RuntimeError> {
    match &args[index] {
        Value::Object(entries) => Ok(entries),
        other => Err(RuntimeError::TypeMismatch {
            operation: function.to_string(),
            expected: "Object".to_string(),
            found: other.clone(),
        }),
    }
}

/// Dispatches a bound method call, e.g. `'a,b'.split(',')`.
pub fn call_method(
    receiver: &Value,
    method: &str,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    match receiver {
        Value::String(s) => call_string_method(s, method, args),
        Value::Number(n) => call_number_method(*n, method, args),
        Value::Array(items) => call_array_method(items, method, args),
        Value::Repeated(view) => {
            let items: Vec<Value> = view.iter().cloned().collect();
            call_array_method(&items, method, args)
        }
        Value::DateTime(dt) => call_date_method(dt, method, args),
        other => Err(RuntimeError::UnknownMember {
            type_name: other.type_name().to_string(),
            member: method.to_string(),
        }),
    }
}

fn call_string_method(s: &str, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    match method {
        "toUpperCase" => {
            require_args("toUpperCase", args, 0)?;
            Ok(Value::String(s.to_uppercase()))
        }
        "toLowerCase" => {
            require_args("toLowerCase", args, 0)?;
            Ok(Value::String(s.to_lowercase()))
        }
        "trim" => {
            require_args("trim", args, 0)?;
            Ok(Value::String(s.trim().to_string()))
        }
        "split" => {
            require_args("split", args, 1)?;
            let separator = arg_string("split", args, 0)?;
            let parts: Vec<Value> = if separator.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(&separator)
                    .map(|p| Value::String(p.to_string()))
                    .collect()
            };
            Ok(Value::Array(parts))
        }
        "includes" => {
            require_args("includes", args, 1)?;
            Ok(Value::Bool(s.contains(&arg_string("includes", args, 0)?)))
        }
        "startsWith" => {
            require_args("startsWith", args, 1)?;
            Ok(Value::Bool(
                s.starts_with(&arg_string("startsWith", args, 0)?),
            ))
        }
        "endsWith" => {
            require_args("endsWith", args, 1)?;
            Ok(Value::Bool(s.ends_with(&arg_string("endsWith", args, 0)?)))
        }
        "replace" => {
            require_args("replace", args, 2)?;
            let search = arg_string("replace", args, 0)?;
            let replacement = arg_string("replace", args, 1)?;
            Ok(Value::String(s.replacen(&search, &replacement, 1)))
        }
        "slice" => {
            let chars: Vec<char> = s.chars().collect();
            let (start, end) = slice_bounds("slice", chars.len(), args)?;
            Ok(Value::String(chars[start..end].iter().collect()))
        }
        _ => Err(RuntimeError::UnknownMember {
            type_name: "string".to_string(),
            member: method.to_string(),
        }),
    }
}

fn call_number_method(n: f64, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    match method {
        "toFixed" => {
            require_args("toFixed", args, 1)?;
            let digits = arg_number("toFixed", args, 0)?.max(0.0) as usize;
            Ok(Value::String(format!("{:.*}", digits, n)))
        }
        _ => Err(RuntimeError::UnknownMember {
            type_name: "number".to_string(),
            member: method.to_string(),
        }),
    }
}

fn call_array_method(items: &[Value], method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    match method {
        "join" => {
            require_args("join", args, 1)?;
            let separator = arg_string("join", args, 0)?;
            let joined = items
                .iter()
                .map(Value::coerce_string)
                .collect::<Vec<_>>()
                .join(&separator);
            Ok(Value::String(joined))
        }
        "includes" => {
            require_args("includes", args, 1)?;
            Ok(Value::Bool(items.contains(&args[0])))
        }
        "indexOf" => {
            require_args("indexOf", args, 1)?;
            let index = items
                .iter()
                .position(|v| v == &args[0])
                .map(|i| i as f64)
                .unwrap_or(-1.0);
            Ok(Value::Number(index))
        }
        "slice" => {
            let (start, end) = slice_bounds("slice", items.len(), args)?;
            Ok(Value::Array(items[start..end].to_vec()))
        }
        "concat" => {
            require_args("concat", args, 1)?;
            let mut combined = items.to_vec();
            match &args[0] {
                Value::Array(other) => combined.extend(other.iter().cloned()),
                Value::Repeated(view) => combined.extend(view.iter().cloned()),
                other => combined.push(other.clone()),
            }
            Ok(Value::Array(combined))
        }
        "reverse" => {
            require_args("reverse", args, 0)?;
            let mut reversed = items.to_vec();
            reversed.reverse();
            Ok(Value::Array(reversed))
        }
        _ => Err(RuntimeError::UnknownMember {
            type_name: "array".to_string(),
            member: method.to_string(),
        }),
    }
}

fn call_date_method(
    dt: &DateTime<Utc>,
    method: &str,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    match method {
        "toISOString" => {
            require_args("toISOString", args, 0)?;
            Ok(Value::String(
                dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            ))
        }
        "format" => {
            require_args("format", args, 1)?;
            let pattern = arg_string("format", args, 0)?;
            Ok(Value::String(dt.format(&pattern).to_string()))
        }
        _ => Err(RuntimeError::UnknownMember {
            type_name: "date".to_string(),
            member: method.to_string(),
        }),
    }
}

/// Resolves `slice(start, end?)` arguments to clamped bounds, counting
/// negative positions from the end.
fn slice_bounds(
    function: &str,
    len: usize,
    args: &[Value],
) -> Result<(usize, usize), RuntimeError> {
    if args.is_empty() || args.len() > 2 {
        return Err(RuntimeError::WrongArity {
            function: function.to_string(),
            expected: 1,
            received: args.len(),
        });
    }

    let resolve = |position: f64| -> usize {
        if position < 0.0 {
            len.saturating_sub((-position) as usize)
        } else {
            (position as usize).min(len)
        }
    };

    let start = resolve(arg_number(function, args, 0)?);
    let end = if args.len() == 2 {
        resolve(arg_number(function, args, 1)?)
    } else {
        len
    };

    Ok((start, end.max(start)))
}
