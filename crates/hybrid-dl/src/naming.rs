// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Token-wise rewriting of identifiers in dL source text.
//!
//! Specification clauses are written by users as dL text. Parameters are
//! substituted and derivatives renamed per identifier token, so `xs` is left
//! alone when `x` is rewritten.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*'?").unwrap()
});

static ATOMIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.']+$").unwrap());

/// The name standing for `x'` in predicate definitions
pub fn derivative_name(var: &str) -> String {
    format!("{var}der")
}

/// Replace every identifier that is a key of `substitution` by its value.
/// Non-atomic replacements are parenthesized.
pub fn substitute_identifiers(text: &str, substitution: &BTreeMap<String, String>) -> String {
    if substitution.is_empty() {
        return text.to_string();
    }
    IDENTIFIER
        .replace_all(text, |caps: &Captures| {
            let token = &caps[0];
            match substitution.get(token) {
                Some(replacement) if ATOMIC.is_match(replacement) => replacement.clone(),
                Some(replacement) => format!("({replacement})"),
                None => token.to_string(),
            }
        })
        .into_owned()
}

pub fn mentions_identifier(text: &str, name: &str) -> bool {
    IDENTIFIER.find_iter(text).any(|m| m.as_str() == name)
}

/// Replace `x'` by `xder` for every `x` in `vars`
pub fn rename_derivatives(text: &str, vars: &[String]) -> String {
    IDENTIFIER
        .replace_all(text, |caps: &Captures| {
            let token = &caps[0];
            match token.strip_suffix('\'') {
                Some(base) if vars.iter().any(|v| v == base) => derivative_name(base),
                _ => token.to_string(),
            }
        })
        .into_owned()
}
