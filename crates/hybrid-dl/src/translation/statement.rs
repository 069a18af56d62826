// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Structural translation of statement blocks into hybrid programs.
//!
//! Besides the program, every step returns the set of self-calls that are
//! guaranteed to be pending afterwards. Suspensions reset that set and mint a
//! placeholder for the region formula, which is filled in by the obligation
//! assembler once the class analysis is known.

use crate::data::{
    CallSet, Formula, HybridProgram, PlaceholderEntry, PlaceholderMap, Term, CONTRACT_VAR, RESULT_VAR,
};
use crate::error::TranslationError;
use crate::naming;
use crate::translation::expression::{translate_formula, translate_guard, translate_term};
use hybrid_model::{
    extract_spec, Annotation, ClassDecl, EffExp, Exp, MethodSig, Model, PureExp, Resolution, SpecTag, Stmt,
};
use log::debug;
use std::collections::BTreeMap;

/// A translated statement together with its must-call summary
#[derive(Debug, Clone, PartialEq)]
pub struct Translated {
    pub program: HybridProgram,
    pub calls: CallSet,
}

impl Translated {
    fn new(program: HybridProgram, calls: CallSet) -> Self {
        Self { program, calls }
    }
}

pub struct StatementTranslator<'a> {
    model: &'a Model,
    /// The class whose code is translated; `None` for the main block
    class: Option<&'a ClassDecl>,
    invariant: Formula,
    /// Variables havocked on resumption after a suspension
    havoc_vars: Vec<String>,
    placeholders: PlaceholderMap,
}

impl<'a> StatementTranslator<'a> {
    pub fn new(model: &'a Model, class: Option<&'a ClassDecl>, invariant: Formula, havoc_vars: Vec<String>) -> Self {
        Self {
            model,
            class,
            invariant,
            havoc_vars,
            placeholders: PlaceholderMap::new(),
        }
    }

    /// The placeholders minted so far
    pub fn into_placeholders(self) -> PlaceholderMap {
        self.placeholders
    }

    /// Translate a sequence of statements, threading the must-call set left to right
    pub fn translate_block(&mut self, stmts: &[Stmt], calls: CallSet) -> anyhow::Result<Translated> {
        let mut programs = Vec::with_capacity(stmts.len());
        let mut calls = calls;
        for stmt in stmts {
            let translated = self.translate_stmt(stmt, calls)?;
            programs.push(translated.program);
            calls = translated.calls;
        }
        Ok(Translated::new(HybridProgram::seq_all(programs), calls))
    }

    pub fn translate_stmt(&mut self, stmt: &Stmt, calls: CallSet) -> anyhow::Result<Translated> {
        match stmt {
            Stmt::Skip => Ok(Translated::new(HybridProgram::Skip, calls)),
            Stmt::Assign { target, value } => self.translate_assign(target.name(), value, calls),
            Stmt::VarDecl { name, init, .. } => match init {
                Some(value) => self.translate_assign(name, value, calls),
                None => Ok(Translated::new(HybridProgram::Havoc(name.clone()), calls)),
            },
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = translate_formula(cond)?;
                let then_part = self.translate_block(&then_branch.stmts, calls.clone())?;
                let else_part = match else_branch {
                    Some(block) => self.translate_block(&block.stmts, calls)?,
                    None => Translated::new(HybridProgram::Skip, calls),
                };
                let program = HybridProgram::choice(
                    HybridProgram::test(cond.clone()).then(then_part.program),
                    HybridProgram::test(cond.not()).then(else_part.program),
                );
                let calls = then_part.calls.intersection(&else_part.calls).cloned().collect();
                Ok(Translated::new(program, calls))
            }
            Stmt::Block(block) => self.translate_block(&block.stmts, calls),
            Stmt::Return(exp) => Ok(Translated::new(
                HybridProgram::assign(RESULT_VAR, translate_term(exp)?),
                calls,
            )),
            Stmt::Expression(Exp::Pure(_)) => Ok(Translated::new(HybridProgram::Skip, calls)),
            Stmt::Expression(Exp::Effect(effect)) => self.translate_effect(effect, calls),
            Stmt::Await(guard) => Ok(self.suspension(translate_guard(guard)?, calls, false)),
            Stmt::While { .. } | Stmt::Case { .. } | Stmt::Duration { .. } | Stmt::Assert(_) => {
                Err(TranslationError::unsupported(stmt))
            }
        }
    }

    fn translate_assign(&mut self, target: &str, value: &Exp, calls: CallSet) -> anyhow::Result<Translated> {
        match value {
            Exp::Pure(exp) => Ok(Translated::new(
                HybridProgram::assign(target, translate_term(exp)?),
                calls,
            )),
            Exp::Effect(effect) => {
                let translated = self.translate_effect(effect, calls)?;
                Ok(Translated::new(
                    translated.program.then(HybridProgram::Havoc(target.to_string())),
                    translated.calls,
                ))
            }
        }
    }

    fn translate_effect(&mut self, effect: &EffExp, mut calls: CallSet) -> anyhow::Result<Translated> {
        match effect {
            EffExp::AsyncCall {
                callee,
                callee_interface,
                method,
                args,
            } => {
                let pre = self.call_precondition(callee, callee_interface.as_deref(), method, args)?;
                if callee.is_this() {
                    calls.insert(method.clone());
                }
                Ok(Translated::new(contract_check(pre), calls))
            }
            EffExp::New { class, args } => {
                let pre = self.creation_precondition(class, args)?;
                Ok(Translated::new(contract_check(pre), calls))
            }
            EffExp::Get(_) => Ok(self.suspension(Formula::True, calls, true)),
            EffExp::SyncCall { .. } => Err(TranslationError::unsupported(effect)),
        }
    }

    /// Resumption after a suspension: either the region assumption held, or the
    /// contract flag records that it did not.
    fn suspension(&mut self, guard: Formula, calls: CallSet, blocking_read: bool) -> Translated {
        let id = self.placeholders.mint(PlaceholderEntry {
            guard: guard.clone(),
            calls,
            blocking_read,
        });
        debug!("minted placeholder {id} for suspension on {guard}");
        let sound = HybridProgram::seq_all([
            HybridProgram::test(Formula::Placeholder(id)),
            HybridProgram::havoc_all(&self.havoc_vars),
            HybridProgram::test(guard.clone().and(self.invariant.clone())),
        ]);
        let unsound = HybridProgram::seq_all([
            HybridProgram::test(Formula::Placeholder(id).not()),
            HybridProgram::havoc_all(&self.havoc_vars),
            HybridProgram::assign(CONTRACT_VAR, Term::number(0)),
            HybridProgram::test(guard),
        ]);
        Translated::new(HybridProgram::choice(sound, unsound), CallSet::new())
    }

    fn call_precondition(
        &self,
        callee: &PureExp,
        callee_interface: Option<&str>,
        method: &MethodSig,
        args: &[PureExp],
    ) -> anyhow::Result<Formula> {
        if callee.is_this() {
            if let Some(class) = self.class {
                // the callee assumes its interface clause if there is one, else its own
                if let Some(declared) = self.model.find_interface_sig(class, method) {
                    if let Some(pre) = instantiate_requires(&declared.annotations, &declared.sig, args)? {
                        return Ok(pre);
                    }
                }
                if let Some(target) = class.method_by_sig(method) {
                    if let Some(pre) = instantiate_requires(&target.annotations, &target.sig, args)? {
                        return Ok(pre);
                    }
                }
            }
        } else if let Some(declared) =
            callee_interface.and_then(|interface| self.model.find_sig_in_interface(interface, method))
        {
            if let Some(pre) = instantiate_requires(&declared.annotations, &declared.sig, args)? {
                return Ok(pre);
            }
        }
        debug!("no precondition found for call to {}", method.name);
        Ok(Formula::True)
    }

    fn creation_precondition(&self, class: &str, args: &[PureExp]) -> anyhow::Result<Formula> {
        let created = self.model.find_class_by_name(class)?;
        let formals: Vec<&str> = created.params.iter().map(|p| p.name.as_str()).collect();
        Ok(substitute_requires(&created.annotations, &formals, args)?.unwrap_or(Formula::True))
    }
}

/// `{ {?pre; skip;} ++ {?!pre; contract := 0;} }`
fn contract_check(pre: Formula) -> HybridProgram {
    HybridProgram::choice(
        HybridProgram::Seq(
            Box::new(HybridProgram::test(pre.clone())),
            Box::new(HybridProgram::Skip),
        ),
        HybridProgram::test(pre.not()).then(HybridProgram::assign(CONTRACT_VAR, Term::number(0))),
    )
}

/// `Requires` of a method signature instantiated with the call arguments
fn instantiate_requires(annotations: &[Annotation], sig: &MethodSig, args: &[PureExp]) -> anyhow::Result<Option<Formula>> {
    let formals: Vec<&str> = sig.params.iter().map(|p| p.name.as_str()).collect();
    substitute_requires(annotations, &formals, args)
}

/// The conjoined `Requires` clauses with formal parameters replaced by actual
/// arguments; `None` if there are none
fn substitute_requires(annotations: &[Annotation], formals: &[&str], args: &[PureExp]) -> anyhow::Result<Option<Formula>> {
    let Some(text) = extract_spec(annotations, SpecTag::Requires, Resolution::Conjoin)? else {
        return Ok(None);
    };
    let mut substitution = BTreeMap::new();
    for (formal, arg) in formals.iter().zip(args) {
        match translate_term(arg) {
            Ok(term) => {
                substitution.insert(formal.to_string(), term.to_string());
            }
            Err(err) if naming::mentions_identifier(&text, formal) => return Err(err),
            Err(_) => {}
        }
    }
    Ok(Some(Formula::Raw(naming::substitute_identifiers(&text, &substitution))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::renderer::{render_program, render_to_string};
    use hybrid_model::{BinOp, Block, Guard, LValue};

    fn translator(model: &Model) -> StatementTranslator<'_> {
        let class = model.find_class("Thermo.Heater").unwrap();
        StatementTranslator::new(
            model,
            Some(class),
            Formula::raw("x >= 0"),
            vec!["count".to_string(), "x".to_string()],
        )
    }

    fn call_names(calls: &CallSet) -> Vec<&str> {
        calls.iter().map(|sig| sig.name.as_str()).collect()
    }

    fn branch(calls: &[&str]) -> Block {
        Block::new(calls.iter().map(|name| self_call(sig(name, &[]), vec![])).collect())
    }

    fn conditional(then_calls: &[&str], else_calls: &[&str]) -> Stmt {
        Stmt::If {
            cond: bin(BinOp::Gt, field("x"), int("1")),
            then_branch: branch(then_calls),
            else_branch: Some(branch(else_calls)),
        }
    }

    #[test]
    fn test_if_intersects_must_calls() {
        let model = thermo_model();
        let mut translator = translator(&model);

        let disjoint = translator.translate_stmt(&conditional(&["f"], &["g"]), CallSet::new()).unwrap();
        assert!(disjoint.calls.is_empty());

        let shared = translator
            .translate_stmt(&conditional(&["f", "g"], &["f"]), CallSet::new())
            .unwrap();
        assert_eq!(call_names(&shared.calls), vec!["f"]);
    }

    #[test]
    fn test_must_calls_thread_through_block() {
        let model = thermo_model();
        let mut translator = translator(&model);
        let stmts = vec![
            self_call(sig("f", &[]), vec![]),
            Stmt::Await(Guard::Exp(bin(BinOp::Gt, field("count"), int("0")))),
            self_call(sig("g", &[]), vec![]),
        ];
        let translated = translator.translate_block(&stmts, CallSet::new()).unwrap();
        assert_eq!(call_names(&translated.calls), vec!["g"]);

        let placeholders = translator.into_placeholders();
        let (_, entry) = placeholders.iter().next().unwrap();
        assert_eq!(call_names(&entry.calls), vec!["f"]);
        assert!(!entry.blocking_read);
    }

    #[test]
    fn test_violated_call_precondition_reaches_contract_reset() {
        let model = thermo_model();
        let mut translator = translator(&model);
        let poke = model.find_class("Thermo.Heater").unwrap().method("poke").unwrap();
        let translated = translator.translate_block(&poke.body.stmts, CallSet::new()).unwrap();
        let text = render_to_string(|w| render_program(&translated.program, w));
        assert_eq!(
            text,
            "{\n  {\n    ?(0 > 0);\n    skip;\n  } ++ {\n    ?!(0 > 0);\n    contract := 0;\n  }\n}"
        );
        assert_eq!(call_names(&translated.calls), vec!["boost"]);
    }

    #[test]
    fn test_self_call_checks_method_requires() {
        let mut model = thermo_model();
        let heater = &mut model.modules[0].classes[0];
        let mut target = method(
            sig("target", &[("k", "Int")]),
            vec![set_field("count", var("k"))],
        );
        target.annotations.push(spec("Requires", "k > 0"));
        heater.methods.push(target);

        let mut translator = translator(&model);
        let call = self_call(sig("target", &[("k", "Int")]), vec![int("0")]);
        let translated = translator.translate_stmt(&call, CallSet::new()).unwrap();
        insta::assert_snapshot!(
            translated.program.to_string(),
            @"{ { ?(0 > 0); skip; } ++ { ?!(0 > 0); contract := 0; } }"
        );
    }

    #[test]
    fn test_interface_requires_wins_over_method_requires() {
        let mut model = thermo_model();
        let heater = &mut model.modules[0].classes[0];
        let boost = heater.methods.iter_mut().find(|m| m.sig.name == "boost").unwrap();
        boost.annotations.push(spec("Requires", "n < 100"));

        let mut translator = translator(&model);
        let call = self_call(sig("boost", &[("n", "Int")]), vec![int("5")]);
        let translated = translator.translate_stmt(&call, CallSet::new()).unwrap();
        let text = translated.program.to_string();
        assert!(text.contains("?(5 > 0);"));
        assert!(!text.contains("100"));
    }

    #[test]
    fn test_await_mints_placeholder() {
        let model = thermo_model();
        let mut translator = translator(&model);
        let stmt = Stmt::Await(Guard::Exp(bin(BinOp::Gt, field("count"), int("0"))));
        let translated = translator.translate_stmt(&stmt, CallSet::new()).unwrap();
        insta::assert_snapshot!(
            translated.program.to_string(),
            @"{ { ?ph0; count := *; x := *; ?count > 0 & (x >= 0); } ++ { ?!ph0; count := *; x := *; contract := 0; ?count > 0; } }"
        );
        assert_eq!(translated.program.placeholders().len(), 2);
    }

    #[test]
    fn test_get_and_effect_assignment() {
        let model = thermo_model();
        let mut translator = translator(&model);
        let stmt = Stmt::Assign {
            target: LValue::Var("v".to_string()),
            value: Exp::Effect(EffExp::Get(var("fut"))),
        };
        let translated = translator.translate_stmt(&stmt, CallSet::new()).unwrap();
        let HybridProgram::Seq(_, havoc) = &translated.program else {
            panic!("expected the read to be followed by a havoc");
        };
        assert_eq!(**havoc, HybridProgram::Havoc("v".to_string()));
        let placeholders = translator.into_placeholders();
        let (_, entry) = placeholders.iter().next().unwrap();
        assert!(entry.blocking_read);
        assert_eq!(entry.guard, Formula::True);
    }

    #[test]
    fn test_unsupported_statements() {
        let model = thermo_model();
        let mut translator = translator(&model);
        let rejected = [
            Stmt::Duration {
                min: int("1"),
                max: int("2"),
            },
            Stmt::While {
                cond: bin(BinOp::Gt, field("x"), int("1")),
                body: Block::default(),
            },
            Stmt::Expression(Exp::Effect(EffExp::SyncCall {
                callee: PureExp::This,
                callee_interface: None,
                method: sig("ctrl", &[]),
                args: vec![],
            })),
        ];
        for stmt in rejected {
            let err = translator.translate_stmt(&stmt, CallSet::new()).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<TranslationError>(),
                Some(TranslationError::Unsupported(_))
            ));
        }
    }
}
