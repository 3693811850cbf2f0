//! # Hinagata - Expression & Template Resolution Engine
//!
//! **Hinagata** is the expression and template resolution engine behind a
//! node-based workflow editor. Nodes reference each other's outputs through
//! small inline expressions embedded in text, e.g.
//! `prefix {{ $('NodeName').outputs.value }} suffix`, and this crate does the
//! heavy lifting around them:
//!
//! 1. **Template parsing**: free text is split into literal and expression
//!    segments around `{{ … }}` regions.
//! 2. **Sandboxed evaluation**: each expression runs against an explicit,
//!    per-call binding set and always comes back as a tagged result — the
//!    evaluator never raises past its boundary.
//! 3. **Graph resolution**: a precedence-respecting walk of the workflow tree
//!    determines which nodes may legally be referenced from a given position.
//! 4. **Mock synthesis**: nodes that have never run get deterministic,
//!    memoized placeholder outputs derived from their declared output schema.
//! 5. **Completion**: partially typed expressions produce documented
//!    candidate continuations for the editing surface.
//!
//! The scope isolation is *soft*: it protects against accidental name
//! collisions and provides a controlled failure surface. It is not a security
//! boundary against deliberately hostile scripts — the evaluator assumes a
//! trusted editor operator.
//!
//! ## Quick Start
//!
//! ```rust
//! use hinagata::prelude::*;
//! use std::rc::Rc;
//!
//! // A workflow with one upstream node declaring a numeric output.
//! let schema = Rc::new(vec![OutputSchemaItem::new("value", "Value", SchemaType::Number)]);
//! let node_a = WorkflowNode {
//!     id: "a".to_string(),
//!     kind: NodeKind::Custom("http".to_string()),
//!     data: NodeData {
//!         name: "A".to_string(),
//!         output_schema: Some(schema),
//!         ..Default::default()
//!     },
//!     children: vec![],
//! };
//! let workflow = Workflow {
//!     id: "wf-1".to_string(),
//!     name: "Demo".to_string(),
//!     vars: Default::default(),
//!     root: WorkflowNode {
//!         id: "root".to_string(),
//!         kind: NodeKind::Start,
//!         data: NodeData::default(),
//!         children: vec![node_a],
//!     },
//! };
//!
//! // Bindings are rebuilt from the document snapshot on every evaluation.
//! let cache = MockCache::new();
//! let bindings = BindingSet::new(&workflow, &cache);
//! let evaluator = Evaluator::new(&bindings);
//!
//! // Node A never ran, so its output is synthesized: number fields mock to 1.
//! let segments = parse_template("Value: {{ $('A').outputs.value + 1 }}", &evaluator);
//! assert_eq!(render(&segments), "Value: 2");
//! ```

pub mod complete;
pub mod error;
pub mod eval;
pub mod expr;
pub mod graph;
pub mod prelude;
pub mod rules;
pub mod schema;
pub mod template;
pub mod value;
