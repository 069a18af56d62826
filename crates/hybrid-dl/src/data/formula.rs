// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::data::placeholder::PlaceholderId;
use crate::data::program::HybridProgram;
use crate::error::TranslationError;
use crate::naming;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Real-valued dL term
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Var(String),
    Number(String),
    /// Differential symbol `x'`
    Primed(String),
    Binary {
        op: ArithOp,
        lhs: Box<Term>,
        rhs: Box<Term>,
    },
    Neg(Box<Term>),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn number(value: impl ToString) -> Self {
        Term::Number(value.to_string())
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, Term::Var(_) | Term::Number(_) | Term::Primed(_))
    }

    /// Replace `x'` by `xder` for every `x` in `vars`
    pub fn rename_derivatives(self, vars: &[String]) -> Term {
        match self {
            Term::Primed(name) if vars.contains(&name) => Term::Var(naming::derivative_name(&name)),
            Term::Binary { op, lhs, rhs } => Term::Binary {
                op,
                lhs: Box::new(lhs.rename_derivatives(vars)),
                rhs: Box::new(rhs.rename_derivatives(vars)),
            },
            Term::Neg(inner) => Term::Neg(Box::new(inner.rename_derivatives(vars))),
            other => other,
        }
    }
}

/// dL formula.
///
/// Specification clauses written by the user arrive as dL source text and are
/// kept as `Raw`. Placeholders stand for evolution-domain formulas that are only
/// known once the class analysis has run; they must all be resolved before
/// rendering an obligation.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    True,
    False,
    Cmp {
        op: CmpOp,
        lhs: Term,
        rhs: Term,
    },
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    /// `[program]post`
    Box {
        program: Box<HybridProgram>,
        post: Box<Formula>,
    },
    Exists {
        var: String,
        body: Box<Formula>,
    },
    /// Application of a predicate from the `Definitions` block
    Pred {
        name: String,
        args: Vec<Term>,
    },
    Raw(String),
    Placeholder(PlaceholderId),
}

impl Formula {
    pub fn cmp(op: CmpOp, lhs: Term, rhs: Term) -> Self {
        Formula::Cmp { op, lhs, rhs }
    }

    /// `name = value`
    pub fn var_eq(name: &str, value: impl ToString) -> Self {
        Formula::cmp(CmpOp::Eq, Term::var(name), Term::number(value))
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Formula::Raw(text.into())
    }

    /// Conjunction; `true` operands are dropped
    pub fn and(self, other: Formula) -> Formula {
        match (self, other) {
            (Formula::True, other) => other,
            (this, Formula::True) => this,
            (this, other) => Formula::And(Box::new(this), Box::new(other)),
        }
    }

    /// Disjunction; `false` operands are dropped
    pub fn or(self, other: Formula) -> Formula {
        match (self, other) {
            (Formula::False, other) => other,
            (this, Formula::False) => this,
            (this, other) => Formula::Or(Box::new(this), Box::new(other)),
        }
    }

    pub fn not(self) -> Formula {
        Formula::Not(Box::new(self))
    }

    pub fn implies(self, other: Formula) -> Formula {
        Formula::Implies(Box::new(self), Box::new(other))
    }

    pub fn boxed(program: HybridProgram, post: Formula) -> Formula {
        Formula::Box {
            program: Box::new(program),
            post: Box::new(post),
        }
    }

    pub fn exists(var: impl Into<String>, body: Formula) -> Formula {
        Formula::Exists {
            var: var.into(),
            body: Box::new(body),
        }
    }

    /// Conjunction of all formulas, `true` if there are none
    pub fn conj<I: IntoIterator<Item = Formula>>(formulas: I) -> Formula {
        formulas.into_iter().fold(Formula::True, Formula::and)
    }

    /// Disjunction of all formulas, `false` if there are none
    pub fn disj<I: IntoIterator<Item = Formula>>(formulas: I) -> Formula {
        formulas.into_iter().fold(Formula::False, Formula::or)
    }

    /// The top-level conjuncts, `true` contributing none
    pub fn conjuncts(&self) -> Vec<&Formula> {
        match self {
            Formula::True => vec![],
            Formula::And(lhs, rhs) => {
                let mut result = lhs.conjuncts();
                result.extend(rhs.conjuncts());
                result
            }
            other => vec![other],
        }
    }

    pub fn is_trivially_true(&self) -> bool {
        match self {
            Formula::True => true,
            Formula::Raw(text) => text.trim() == "true",
            _ => false,
        }
    }

    /// All placeholders occurring in the formula, including inside box modalities
    pub fn placeholders(&self) -> Vec<PlaceholderId> {
        let mut result = vec![];
        self.collect_placeholders(&mut result);
        result
    }

    pub(crate) fn collect_placeholders(&self, out: &mut Vec<PlaceholderId>) {
        match self {
            Formula::Placeholder(id) => out.push(*id),
            Formula::Not(inner) | Formula::Exists { body: inner, .. } => inner.collect_placeholders(out),
            Formula::And(lhs, rhs) | Formula::Or(lhs, rhs) | Formula::Implies(lhs, rhs) => {
                lhs.collect_placeholders(out);
                rhs.collect_placeholders(out);
            }
            Formula::Box { program, post } => {
                program.collect_placeholders(out);
                post.collect_placeholders(out);
            }
            Formula::True | Formula::False | Formula::Cmp { .. } | Formula::Pred { .. } | Formula::Raw(_) => {}
        }
    }

    /// Replace every placeholder by its resolved formula.
    /// Fails if a placeholder has no resolution.
    pub fn resolve_placeholders(self, resolved: &BTreeMap<PlaceholderId, Formula>) -> anyhow::Result<Formula> {
        Ok(match self {
            Formula::Placeholder(id) => resolved
                .get(&id)
                .cloned()
                .ok_or(TranslationError::UnresolvedPlaceholder(id))?,
            Formula::Not(inner) => Formula::Not(Box::new(inner.resolve_placeholders(resolved)?)),
            Formula::And(lhs, rhs) => Formula::And(
                Box::new(lhs.resolve_placeholders(resolved)?),
                Box::new(rhs.resolve_placeholders(resolved)?),
            ),
            Formula::Or(lhs, rhs) => Formula::Or(
                Box::new(lhs.resolve_placeholders(resolved)?),
                Box::new(rhs.resolve_placeholders(resolved)?),
            ),
            Formula::Implies(lhs, rhs) => Formula::Implies(
                Box::new(lhs.resolve_placeholders(resolved)?),
                Box::new(rhs.resolve_placeholders(resolved)?),
            ),
            Formula::Box { program, post } => Formula::Box {
                program: Box::new(program.resolve_placeholders(resolved)?),
                post: Box::new(post.resolve_placeholders(resolved)?),
            },
            Formula::Exists { var, body } => Formula::Exists {
                var,
                body: Box::new(body.resolve_placeholders(resolved)?),
            },
            other => other,
        })
    }

    /// Replace `x'` by `xder` for every `x` in `vars`, in terms and in raw text
    pub fn rename_derivatives(self, vars: &[String]) -> Formula {
        match self {
            Formula::Cmp { op, lhs, rhs } => Formula::Cmp {
                op,
                lhs: lhs.rename_derivatives(vars),
                rhs: rhs.rename_derivatives(vars),
            },
            Formula::Raw(text) => Formula::Raw(naming::rename_derivatives(&text, vars)),
            Formula::Pred { name, args } => Formula::Pred {
                name,
                args: args.into_iter().map(|a| a.rename_derivatives(vars)).collect(),
            },
            Formula::Not(inner) => Formula::Not(Box::new(inner.rename_derivatives(vars))),
            Formula::And(lhs, rhs) => Formula::And(
                Box::new(lhs.rename_derivatives(vars)),
                Box::new(rhs.rename_derivatives(vars)),
            ),
            Formula::Or(lhs, rhs) => Formula::Or(
                Box::new(lhs.rename_derivatives(vars)),
                Box::new(rhs.rename_derivatives(vars)),
            ),
            Formula::Implies(lhs, rhs) => Formula::Implies(
                Box::new(lhs.rename_derivatives(vars)),
                Box::new(rhs.rename_derivatives(vars)),
            ),
            Formula::Exists { var, body } => Formula::Exists {
                var,
                body: Box::new(body.rename_derivatives(vars)),
            },
            // Derivatives inside programs belong to ODEs and keep their meaning
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ge(var: &str, value: i64) -> Formula {
        Formula::cmp(CmpOp::Ge, Term::var(var), Term::number(value))
    }

    #[test]
    fn test_conj_drops_true() {
        assert_eq!(Formula::conj(vec![]), Formula::True);
        assert_eq!(Formula::conj(vec![Formula::True, ge("x", 0)]), ge("x", 0));
        let both = Formula::conj(vec![ge("x", 0), Formula::True, ge("y", 1)]);
        assert_eq!(both.conjuncts(), vec![&ge("x", 0), &ge("y", 1)]);
        assert_eq!(Formula::disj(vec![]), Formula::False);
    }

    #[test]
    fn test_resolve_every_occurrence() {
        let id = PlaceholderId::new(0);
        let formula = Formula::Placeholder(id).and(Formula::Placeholder(id).not());
        let mut resolved = BTreeMap::new();
        resolved.insert(id, ge("x", 0));
        let result = formula.resolve_placeholders(&resolved).unwrap();
        assert!(result.placeholders().is_empty());
        assert_eq!(result, ge("x", 0).and(ge("x", 0).not()));
    }

    #[test]
    fn test_missing_resolution_is_an_error() {
        let formula = Formula::Placeholder(PlaceholderId::new(3));
        let err = formula.resolve_placeholders(&BTreeMap::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranslationError>(),
            Some(TranslationError::UnresolvedPlaceholder(_))
        ));
    }

    #[test]
    fn test_rename_derivatives() {
        let vars = vec!["x".to_string()];
        let formula = Formula::cmp(CmpOp::Eq, Term::Primed("x".to_string()), Term::Primed("y".to_string()))
            .and(Formula::raw("x' >= 0"));
        let renamed = formula.rename_derivatives(&vars);
        assert_eq!(
            renamed,
            Formula::cmp(CmpOp::Eq, Term::var("xder"), Term::Primed("y".to_string()))
                .and(Formula::raw("xder >= 0"))
        );
    }
}
