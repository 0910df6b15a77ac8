//! Flag tokenizer
//!
//! Flat, configuration-driven parse of argv-like token lists. `--name=value`
//! and `--name value` assign, bare `--name` is `true`, `--no-name` is
//! `false`, and `--` ends flag parsing. Non-flag tokens collect under the
//! reserved key `_`. Flag names are never camel-case expanded. Duplicate
//! flags collect into arrays.
//!
//! The compiler's coercion directives drive everything type-shaped here:
//! declared array flags greedily consume the following non-flag tokens,
//! fixed-arity flags consume exactly that many, and per-key primitive
//! hints decide whether a raw token becomes a number, boolean, or stays
//! a string. Loose values auto-parse to numbers unless the key is
//! declared a string.

use std::collections::HashMap;

use argshape_compiler::{CoercionSink, Primitive};
use indexmap::IndexMap;
use serde_json::Value;

/// Reserved flags-map key holding the positional list
pub const POSITIONAL_KEY: &str = "_";

/// Tokenizer behavior derived from compiled coercion directives
#[derive(Debug, Clone, Default)]
pub struct TokenizerConfig {
    /// Array-valued keys and their element hint
    arrays: HashMap<String, Option<Primitive>>,
    /// Exact token counts for fixed-arity keys
    nargs: HashMap<String, usize>,
    /// Per-key primitive coercion
    keys: HashMap<String, Primitive>,
}

impl TokenizerConfig {
    /// Merge the directives of every compiled root
    pub fn from_sinks<'a>(sinks: impl IntoIterator<Item = &'a CoercionSink>) -> Self {
        let mut config = Self::default();
        for sink in sinks {
            for directive in &sink.arrays {
                config
                    .arrays
                    .insert(directive.key.clone(), directive.element);
            }
            for directive in &sink.lengths {
                config.nargs.insert(directive.key.clone(), directive.length);
            }
            for key in &sink.booleans {
                config.keys.insert(key.clone(), Primitive::Boolean);
            }
            for key in &sink.numbers {
                config.keys.insert(key.clone(), Primitive::Number);
            }
            for key in &sink.strings {
                config.keys.insert(key.clone(), Primitive::String);
            }
        }
        config
    }

    fn hint_for(&self, key: &str) -> Option<Primitive> {
        self.keys.get(key).copied()
    }
}

/// Coerce one raw token according to a primitive hint
///
/// With no hint, numeric-looking tokens auto-parse; everything else
/// stays a string. A hinted token that does not fit its hint also stays
/// a string, so the validator reports the mismatch instead of the
/// tokenizer mangling the value.
pub fn coerce_token(raw: &str, hint: Option<Primitive>) -> Value {
    match hint {
        Some(Primitive::String) => Value::String(raw.to_string()),
        Some(Primitive::Boolean) => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        Some(Primitive::Number) | Some(Primitive::BigInt) | None => parse_number(raw)
            .unwrap_or_else(|| Value::String(raw.to_string())),
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::from(int));
    }
    raw.parse::<f64>().ok().and_then(|float| {
        float.is_finite().then(|| Value::from(float))
    })
}

fn is_flag(token: &str) -> bool {
    token.starts_with("--") && token.len() > 2
}

/// Insert a flag value; duplicates promote the slot to an array
fn insert(flags: &mut IndexMap<String, Value>, key: String, value: Value) {
    match flags.get_mut(&key) {
        None => {
            flags.insert(key, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

/// Parse argv into a flags map; positionals live under [`POSITIONAL_KEY`]
pub fn tokenize<S: AsRef<str>>(config: &TokenizerConfig, argv: &[S]) -> IndexMap<String, Value> {
    let mut flags: IndexMap<String, Value> = IndexMap::new();
    let mut positional: Vec<Value> = Vec::new();
    let mut tokens = argv.iter().map(AsRef::as_ref).peekable();
    let mut flags_done = false;

    while let Some(token) = tokens.next() {
        if flags_done || !is_flag(token) {
            if token == "--" && !flags_done {
                flags_done = true;
                continue;
            }
            positional.push(coerce_token(token, None));
            continue;
        }

        let body = &token[2..];
        if let Some((name, raw)) = body.split_once('=') {
            let value = coerce_token(raw, config.hint_for(name));
            insert(&mut flags, name.to_string(), value);
            continue;
        }

        // `--no-name` negates a bare boolean flag
        if let Some(name) = body.strip_prefix("no-") {
            if config.hint_for(body).is_none() {
                insert(&mut flags, name.to_string(), Value::Bool(false));
                continue;
            }
        }

        let name = body.to_string();
        if let Some(&element) = config.arrays.get(&name) {
            let mut items = Vec::new();
            while let Some(&next) = tokens.peek() {
                if is_flag(next) || next == "--" {
                    break;
                }
                items.push(coerce_token(tokens.next().unwrap_or_default(), element));
            }
            insert(&mut flags, name, Value::Array(items));
            continue;
        }
        if let Some(&count) = config.nargs.get(&name) {
            let mut items = Vec::new();
            while items.len() < count {
                let Some(&next) = tokens.peek() else { break };
                if is_flag(next) || next == "--" {
                    break;
                }
                items.push(coerce_token(tokens.next().unwrap_or_default(), None));
            }
            insert(&mut flags, name, Value::Array(items));
            continue;
        }
        if config.hint_for(&name) == Some(Primitive::Boolean) {
            insert(&mut flags, name, Value::Bool(true));
            continue;
        }
        match tokens.peek() {
            Some(&next) if !is_flag(next) && next != "--" => {
                let raw = tokens.next().unwrap_or_default();
                let value = coerce_token(raw, config.hint_for(&name));
                insert(&mut flags, name, value);
            }
            // Bare flag with no declared type reads as a switch
            _ => insert(&mut flags, name, Value::Bool(true)),
        }
    }

    flags.insert(POSITIONAL_KEY.to_string(), Value::Array(positional));
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn plain(argv: &[&str]) -> IndexMap<String, Value> {
        tokenize(&TokenizerConfig::default(), argv)
    }

    #[test]
    fn inline_and_spaced_values_assign_equally() {
        let flags = plain(&["--host=local", "--port", "8080"]);
        assert_eq!(flags["host"], json!("local"));
        assert_eq!(flags["port"], json!(8080));
    }

    #[test]
    fn bare_flags_are_true_and_negated_flags_false() {
        let flags = plain(&["--verbose", "--no-color"]);
        assert_eq!(flags["verbose"], json!(true));
        assert_eq!(flags["color"], json!(false));
    }

    #[test]
    fn the_terminator_demotes_everything_after_it() {
        let flags = plain(&["--a", "--", "--b", "c"]);
        assert_eq!(flags["a"], json!(true));
        assert_eq!(flags[POSITIONAL_KEY], json!(["--b", "c"]));
        assert!(!flags.contains_key("b"));
    }

    #[test]
    fn duplicates_collect_into_arrays() {
        let flags = plain(&["--tag=a", "--tag=b", "--tag=c"]);
        assert_eq!(flags["tag"], json!(["a", "b", "c"]));
    }

    #[test]
    fn numeric_looking_values_auto_parse_unless_declared_string() {
        let mut config = TokenizerConfig::default();
        config.keys.insert("name".to_string(), Primitive::String);
        let flags = tokenize(&config, &["--name=123", "--count=123", "4.5"]);
        assert_eq!(flags["name"], json!("123"));
        assert_eq!(flags["count"], json!(123));
        assert_eq!(flags[POSITIONAL_KEY], json!([4.5]));
    }

    #[test]
    fn declared_booleans_keep_unparsable_values_for_the_validator() {
        let mut config = TokenizerConfig::default();
        config.keys.insert("hello".to_string(), Primitive::Boolean);
        let flags = tokenize(&config, &["--hello=world"]);
        assert_eq!(flags["hello"], json!("world"));
    }

    #[test]
    fn declared_arrays_consume_greedily() {
        let mut config = TokenizerConfig::default();
        config
            .arrays
            .insert("port".to_string(), Some(Primitive::Number));
        let flags = tokenize(&config, &["--port", "80", "443", "--verbose"]);
        assert_eq!(flags["port"], json!([80, 443]));
        assert_eq!(flags["verbose"], json!(true));
    }

    #[test]
    fn fixed_arity_flags_consume_exactly_their_count() {
        let mut config = TokenizerConfig::default();
        config.nargs.insert("bind".to_string(), 2);
        let flags = tokenize(&config, &["--bind", "host", "80", "extra"]);
        assert_eq!(flags["bind"], json!(["host", 80]));
        assert_eq!(flags[POSITIONAL_KEY], json!(["extra"]));
    }

    #[test]
    fn flag_names_are_never_camel_case_expanded() {
        let flags = plain(&["--dry-run"]);
        assert_eq!(flags["dry-run"], json!(true));
        assert!(!flags.contains_key("dryRun"));
    }
}
