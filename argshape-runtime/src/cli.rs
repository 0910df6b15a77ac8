//! Named + positional composition
//!
//! `Cli::compile` lowers the declared named-arguments shape and the
//! declared positional shape into one shared validator graph, each with
//! its own rendering style. A missing named shape defaults to the empty
//! closed object (every flag is unknown); a missing positional shape
//! defaults to `never[]` (any positional argument is rejected).
//!
//! `Cli::run` tokenizes, applies the recorded coercion directives, runs
//! both validators, and reports at most one combined error while always
//! returning the best-effort parsed values.

use argshape_compiler::{
    CompileOptions, CompileResult, CompiledRoot, Primitive, TargetStyle, ValidatorGraph,
    compile_validator,
};
use argshape_types::{TypeId, TypeTable};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::RuntimeResult;
use crate::eval::Evaluator;
use crate::tokenize::{POSITIONAL_KEY, TokenizerConfig, coerce_token, tokenize};

/// Combined validation failure of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Non-empty failure messages of both validators, newline-joined
    pub message: String,
}

/// Result of one invocation: parsed values are present even on failure
#[derive(Debug, Clone, PartialEq)]
pub struct CliOutcome {
    pub error: Option<CliError>,
    pub named: IndexMap<String, Value>,
    pub positional: Vec<Value>,
}

/// A compiled argument validator pair ready to run against argv
pub struct Cli {
    graph: ValidatorGraph,
    named: CompiledRoot,
    positional: CompiledRoot,
    tokenizer: TokenizerConfig,
}

impl Cli {
    /// Compile the declared shapes into a ready-to-run validator pair
    pub fn compile(
        table: &mut TypeTable,
        named: Option<TypeId>,
        positional: Option<TypeId>,
        options: CompileOptions,
    ) -> CompileResult<Self> {
        let named_ty = named.unwrap_or_else(|| table.object(vec![]));
        let positional_ty = positional.unwrap_or_else(|| {
            let never = table.never();
            table.array(never)
        });

        let mut graph = ValidatorGraph::new();
        let named = compile_validator(table, named_ty, options, TargetStyle::Flags, &mut graph)?;
        let positional = compile_validator(
            table,
            positional_ty,
            options,
            TargetStyle::Positional,
            &mut graph,
        )?;
        let tokenizer = TokenizerConfig::from_sinks([&named.coercion, &positional.coercion]);
        Ok(Self {
            graph,
            named,
            positional,
            tokenizer,
        })
    }

    /// Tokenize and validate one argv-like token list
    pub fn run<S: AsRef<str>>(&self, argv: &[S]) -> RuntimeResult<CliOutcome> {
        let mut flags = tokenize(&self.tokenizer, argv);
        self.apply_directives(&mut flags);

        let positional_value = flags
            .shift_remove(POSITIONAL_KEY)
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let named_value = Value::Object(
            flags
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        );

        let mut evaluator = Evaluator::new(&self.graph);
        let named_failure = evaluator.validate(&self.named.entry, &named_value)?;
        let positional_failure = evaluator.validate(&self.positional.entry, &positional_value)?;

        // Both validators always run so both messages can be joined
        let message = [named_failure, positional_failure]
            .into_iter()
            .flatten()
            .filter(|failure| !failure.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let error = (!message.is_empty()).then_some(CliError { message });

        let positional = match positional_value {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        Ok(CliOutcome {
            error,
            named: flags,
            positional,
        })
    }

    /// Re-coerce values the tokenizer could only see as loose tokens:
    /// tuple positions and array elements with a declared primitive
    fn apply_directives(&self, flags: &mut IndexMap<String, Value>) {
        for sink in [&self.named.coercion, &self.positional.coercion] {
            for directive in &sink.tuples {
                let Some(Value::Array(items)) = flags.get_mut(&directive.key) else {
                    continue;
                };
                for member in &directive.members {
                    if let Some(item) = items.get_mut(member.index) {
                        recoerce(item, member.element);
                    }
                }
            }
            for directive in &sink.arrays {
                let Some(Value::Array(items)) = flags.get_mut(&directive.key) else {
                    continue;
                };
                for item in items {
                    recoerce(item, directive.element);
                }
            }
        }
    }
}

fn recoerce(value: &mut Value, hint: Option<Primitive>) {
    let Some(hint) = hint else { return };
    match (&*value, hint) {
        (Value::String(raw), _) => *value = coerce_token(raw, Some(hint)),
        // Auto-parsed numbers fold back when the position wants a string
        (Value::Number(number), Primitive::String) => {
            *value = Value::String(number.to_string());
        }
        _ => {}
    }
}
