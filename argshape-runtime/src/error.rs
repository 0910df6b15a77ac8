//! Internal evaluator faults
//!
//! Validation failures are data, not errors: the evaluator returns them
//! as rendered message strings. An `Err` here means the compiled graph
//! itself is corrupt, which a correct compiler never produces.

use miette::Diagnostic;
use thiserror::Error;

/// Faults raised while interpreting a validator graph
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("validator graph has no function named `{name}`")]
    #[diagnostic(
        code(argshape::runtime::unknown_function),
        help("the graph and the entry name must come from the same compilation run")
    )]
    UnknownFunction { name: String },
}

/// Result alias used throughout the runtime
pub type RuntimeResult<T> = Result<T, RuntimeError>;
