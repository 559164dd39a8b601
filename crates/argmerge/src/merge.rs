//! Flag merging and marker substitution.

use std::collections::HashMap;

use crate::error::MergeError;
use crate::token::tokenize;

/// Substitution context: marker key → replacement value.
///
/// A key `name` is matched by the literal marker `$SC.name` inside any
/// token, quoted or not. Markers without a context entry pass through
/// verbatim.
pub type Context = HashMap<String, String>;

const MARKER_PREFIX: &str = "$SC.";

/// One output slot, recorded at the position of its first occurrence.
enum Slot {
    Flag(String),
    Positional(String),
}

fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

/// Merge two layered argument strings into a final argument vector.
///
/// `default_args` is walked first, then `override_args`. A flag that recurs
/// (across layers or within one) keeps the slot of its first occurrence and
/// the value of its last occurrence: last value wins, first position kept.
/// A flag followed by a non-flag token owns that token as its value;
/// otherwise it is a boolean switch. Positional tokens keep their relative
/// order and are never deduplicated.
///
/// After merging, `$SC.*` markers are substituted from `ctx` in every token.
pub fn merge(
    default_args: &str,
    override_args: &str,
    ctx: &Context,
) -> Result<Vec<String>, MergeError> {
    let mut order: Vec<Slot> = Vec::new();
    let mut values: HashMap<String, Option<String>> = HashMap::new();

    for layer in [default_args, override_args] {
        let mut tokens = tokenize(layer)?.into_iter().peekable();
        while let Some(token) = tokens.next() {
            if is_flag(&token) {
                let has_value = tokens.peek().is_some_and(|next| !is_flag(next));
                let value = if has_value { tokens.next() } else { None };
                if !values.contains_key(&token) {
                    order.push(Slot::Flag(token.clone()));
                }
                values.insert(token, value);
            } else {
                order.push(Slot::Positional(token));
            }
        }
    }

    let mut argv = Vec::new();
    for slot in order {
        match slot {
            Slot::Flag(name) => {
                let value = values.get(&name).cloned().flatten();
                argv.push(name);
                if let Some(value) = value {
                    argv.push(value);
                }
            }
            Slot::Positional(positional) => argv.push(positional),
        }
    }

    Ok(argv.iter().map(|token| substitute(token, ctx)).collect())
}

/// Replace every `$SC.<key>` marker found in `token` with its context value.
///
/// Markers are exact and case-sensitive; unknown markers are left untouched.
pub fn substitute(token: &str, ctx: &Context) -> String {
    if !token.contains(MARKER_PREFIX) {
        return token.to_string();
    }
    let mut out = token.to_string();
    for (key, value) in ctx {
        let marker = format!("{MARKER_PREFIX}{key}");
        if out.contains(&marker) {
            out = out.replace(&marker, value);
        }
    }
    out
}
