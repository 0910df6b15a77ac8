//! Runtime half of argshape
//!
//! The compiler crate turns structural types into a validator graph;
//! this crate makes that graph usable against real input: a flag
//! tokenizer driven by the compiler's coercion directives, an evaluator
//! that interprets the graph over `serde_json::Value`, and the `Cli`
//! orchestrator composing named and positional validation into a single
//! invocation.

pub mod cli;
pub mod error;
pub mod eval;
pub mod tokenize;

pub use cli::{Cli, CliError, CliOutcome};
pub use error::{RuntimeError, RuntimeResult};
pub use eval::Evaluator;
pub use tokenize::{TokenizerConfig, tokenize, POSITIONAL_KEY};
