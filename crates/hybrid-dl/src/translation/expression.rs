// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Pure expressions and guards to dL terms and formulas.

use crate::data::{ArithOp, CmpOp, Formula, Term, TIME_VAR};
use crate::error::TranslationError;
use hybrid_model::{BinOp, Guard, PureExp, UnOp};

/// Translate an arithmetic expression
pub fn translate_term(exp: &PureExp) -> anyhow::Result<Term> {
    match exp {
        PureExp::IntLiteral(value) | PureExp::FloatLiteral(value) => Ok(Term::Number(value.clone())),
        PureExp::FieldUse(name) | PureExp::VarUse(name) => Ok(Term::Var(name.clone())),
        PureExp::Binary { op, lhs, rhs } => {
            let op = match op {
                BinOp::Add => ArithOp::Add,
                BinOp::Sub => ArithOp::Sub,
                BinOp::Mul => ArithOp::Mul,
                BinOp::Div => ArithOp::Div,
                _ => return Err(TranslationError::unsupported(exp)),
            };
            Ok(Term::Binary {
                op,
                lhs: Box::new(translate_term(lhs)?),
                rhs: Box::new(translate_term(rhs)?),
            })
        }
        PureExp::Unary { op: UnOp::Neg, operand } => Ok(Term::Neg(Box::new(translate_term(operand)?))),
        PureExp::Derivative(inner) => match inner.as_ref() {
            PureExp::FieldUse(name) | PureExp::VarUse(name) => Ok(Term::Primed(name.clone())),
            _ => Err(TranslationError::unsupported(exp)),
        },
        _ => Err(TranslationError::unsupported(exp)),
    }
}

/// Translate a boolean expression
pub fn translate_formula(exp: &PureExp) -> anyhow::Result<Formula> {
    match exp {
        PureExp::Binary { op, lhs, rhs } => {
            let cmp = match op {
                BinOp::Lt => CmpOp::Lt,
                BinOp::Le => CmpOp::Le,
                BinOp::Gt => CmpOp::Gt,
                BinOp::Ge => CmpOp::Ge,
                BinOp::Eq => CmpOp::Eq,
                BinOp::Ne => CmpOp::Ne,
                BinOp::And => {
                    return Ok(Formula::And(
                        Box::new(translate_formula(lhs)?),
                        Box::new(translate_formula(rhs)?),
                    ))
                }
                BinOp::Or => {
                    return Ok(Formula::Or(
                        Box::new(translate_formula(lhs)?),
                        Box::new(translate_formula(rhs)?),
                    ))
                }
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                    return Err(TranslationError::unsupported(exp))
                }
            };
            Ok(Formula::cmp(cmp, translate_term(lhs)?, translate_term(rhs)?))
        }
        PureExp::Unary { op: UnOp::Not, operand } => Ok(translate_formula(operand)?.not()),
        PureExp::DataConstructor { constructor, args } if args.is_empty() => match constructor.as_str() {
            "True" => Ok(Formula::True),
            "False" => Ok(Formula::False),
            _ => Err(TranslationError::unsupported(exp)),
        },
        _ => Err(TranslationError::unsupported(exp)),
    }
}

/// Translate a suspension guard
pub fn translate_guard(guard: &Guard) -> anyhow::Result<Formula> {
    match guard {
        Guard::Exp(exp) | Guard::Differential(exp) => translate_formula(exp),
        Guard::And(lhs, rhs) => Ok(Formula::And(
            Box::new(translate_guard(lhs)?),
            Box::new(translate_guard(rhs)?),
        )),
        Guard::Or(lhs, rhs) => Ok(Formula::Or(
            Box::new(translate_guard(lhs)?),
            Box::new(translate_guard(rhs)?),
        )),
        Guard::Duration { min } => Ok(Formula::cmp(CmpOp::Ge, Term::var(TIME_VAR), translate_term(min)?)),
        Guard::Claim(_) => Ok(Formula::True),
    }
}
