//! Validator function registry and intermediate representation
//!
//! The compiler lowers every distinct structural type into one named,
//! side-effect-free validator. Names are canonical structural signatures,
//! claimed eagerly before the body is compiled so that a self-referential
//! type can call itself by name from inside its own body.

use std::collections::HashSet;

use argshape_types::LiteralNumber;
use indexmap::IndexMap;

use crate::message::ErrorMessage;

/// Primitive kind checked by `typeof`-style validators and used as a
/// coercion hint for the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    BigInt,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::BigInt => "bigint",
        }
    }
}

/// Expected value of a strict-equality validator
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Str(String),
    Number(LiteralNumber),
    Bool(bool),
    Null,
    Undefined,
}

impl LiteralValue {
    /// Rendering used for the `expectedValue` placeholder
    pub fn display_value(&self) -> String {
        match self {
            LiteralValue::Str(value) => format!("\"{value}\""),
            LiteralValue::Number(value) => value.to_string(),
            LiteralValue::Bool(value) => value.to_string(),
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Undefined => "undefined".to_string(),
        }
    }
}

/// One declared property inside an object validator
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyCheck {
    pub name: String,
    /// Validator called when the property is present
    pub function: String,
    /// Absent-and-optional yields no error
    pub optional: bool,
    /// Message produced when a required property is absent
    pub missing: ErrorMessage,
}

/// Unknown-key rejection: the first actual key outside `allowed` fails
#[derive(Debug, Clone, PartialEq)]
pub struct SuperfluousCheck {
    pub allowed: Vec<String>,
}

/// Body of one compiled validator
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorKind {
    /// Always valid (any/unknown, ignored classes and methods)
    Accept,
    /// Always invalid (never)
    Reject { message: ErrorMessage },
    /// `typeof`-style primitive check
    Primitive {
        primitive: Primitive,
        message: ErrorMessage,
    },
    /// Strict equality against a single literal
    Literal {
        value: LiteralValue,
        message: ErrorMessage,
    },
    /// The `object` intrinsic: rejects primitives only
    NonPrimitive { message: ErrorMessage },
    /// Record with declared properties, checked in declaration order
    Object {
        mismatch: ErrorMessage,
        properties: Vec<PropertyCheck>,
        /// Validator applied to every value when an open string-index
        /// signature exists; mutually exclusive with `superfluous`
        string_index: Option<String>,
        superfluous: Option<SuperfluousCheck>,
    },
    /// Homogeneous array; every element runs the same validator
    Array {
        mismatch: ErrorMessage,
        element: String,
    },
    /// Fixed-position tuple with an optional suffix
    Tuple {
        min_length: usize,
        max_length: usize,
        arity: ErrorMessage,
        elements: Vec<String>,
    },
    /// Union: first accepting member wins; all-fail yields one generic message
    Disjunction {
        members: Vec<String>,
        no_alternatives: ErrorMessage,
    },
    /// Intersection: every member must accept
    Conjunction {
        members: Vec<String>,
        /// Combined unknown-key loop over the union of member key sets
        superfluous: Option<SuperfluousCheck>,
    },
}

/// A named validator definition
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    pub name: String,
    pub kind: ValidatorKind,
}

/// Name-keyed validator registry for one compilation run
///
/// A name, once registered, is never redefined: `claim` marks it taken
/// before the body exists, and `define` fills the body in exactly once.
#[derive(Debug, Default)]
pub struct ValidatorGraph {
    functions: IndexMap<String, Validator>,
    claimed: HashSet<String>,
}

impl ValidatorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a name. Returns true when the caller must compile the body;
    /// false when the validator already exists or is being compiled
    /// further up the call stack.
    pub fn claim(&mut self, name: &str) -> bool {
        self.claimed.insert(name.to_string())
    }

    /// Attach the body for a previously claimed name
    pub fn define(&mut self, name: impl Into<String>, kind: ValidatorKind) {
        let name = name.into();
        debug_assert!(self.claimed.contains(&name), "define without claim: {name}");
        self.functions
            .entry(name.clone())
            .or_insert(Validator { name, kind });
    }

    pub fn get(&self, name: &str) -> Option<&Validator> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Definitions in the order they were compiled
    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.functions.values()
    }
}
