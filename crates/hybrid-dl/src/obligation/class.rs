// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Obligations for the initializer and the methods of a physical class.

use super::{havoc_vars, predicate, program_variables, resolve_all, Obligation, ProofArtifact, DEFAULT_TACTIC};
use crate::analysis::ClassAnalyzer;
use crate::data::{CallSet, CmpOp, Formula, HybridProgram, Term, CONTRACT_VAR, TIME_VAR};
use crate::naming;
use crate::translation::{translate_guard, translate_term, StatementTranslator};
use hybrid_model::{extract_spec, Annotation, MethodImpl, Resolution, SpecTag, Stmt};
use log::{debug, info};
use std::collections::BTreeMap;

/// `Requires` or `Ensures` of a method: the clauses of the implemented interface
/// signature if it has any, else the method's own, else `true`.
pub(crate) fn contract_clause(analyzer: &ClassAnalyzer<'_>, method: &MethodImpl, tag: SpecTag) -> anyhow::Result<Formula> {
    if let Some(declared) = analyzer.model().find_interface_sig(analyzer.class(), &method.sig) {
        if let Some(text) = extract_spec(&declared.annotations, tag, Resolution::Conjoin)? {
            // the interface may name the parameters differently
            let renaming: BTreeMap<String, String> = declared
                .sig
                .params
                .iter()
                .zip(&method.sig.params)
                .filter(|(formal, actual)| formal.name != actual.name)
                .map(|(formal, actual)| (formal.name.clone(), actual.name.clone()))
                .collect();
            return Ok(Formula::Raw(naming::substitute_identifiers(&text, &renaming)));
        }
    }
    spec_or_true(&method.annotations, tag)
}

fn spec_or_true(annotations: &[Annotation], tag: SpecTag) -> anyhow::Result<Formula> {
    Ok(extract_spec(annotations, tag, Resolution::Conjoin)?
        .map(Formula::Raw)
        .unwrap_or(Formula::True))
}

pub(crate) fn tactic(annotations: &[Annotation]) -> anyhow::Result<String> {
    Ok(extract_spec(annotations, SpecTag::Tactic, Resolution::Last)?.unwrap_or_else(|| DEFAULT_TACTIC.to_string()))
}

/// `pre(..) -> [program](post(..) & [region(true, calls)] inv)`
fn assemble(
    analyzer: &ClassAnalyzer<'_>,
    parameters: Vec<String>,
    pre: Formula,
    post: Formula,
    program: HybridProgram,
    tail_calls: &CallSet,
    tactic: String,
) -> anyhow::Result<ProofArtifact> {
    let invariant = analyzer.invariant().clone();
    let tail = Formula::boxed(analyzer.region(Formula::True, tail_calls)?, invariant);
    let problem = ProofArtifact::apply(&parameters, "pre").implies(Formula::boxed(
        program,
        ProofArtifact::apply(&parameters, "post").and(tail),
    ));
    Ok(ProofArtifact {
        predicates: vec![
            predicate("pre", pre, &parameters),
            predicate("post", post, &parameters),
        ],
        variables: parameters.clone(),
        parameters,
        problem,
        tactic,
    })
}

/// The obligation of a single method. Methods that write no field, call no
/// method, create no object and ensure nothing hold trivially.
pub fn method_obligation(analyzer: &ClassAnalyzer<'_>, method: &MethodImpl) -> anyhow::Result<Obligation> {
    let class = analyzer.class();
    let body = &method.body;
    let ensures = contract_clause(analyzer, method, SpecTag::Ensures)?;
    if !body.writes_field() && body.calls().is_empty() && body.creations().is_empty() && ensures.is_trivially_true() {
        info!(
            "skipping {}.{}: it writes no field, calls nothing, creates nothing and ensures nothing",
            class.name, method.sig.name
        );
        return Ok(Obligation::discharged(&class.name, &method.sig.name));
    }

    let requires = contract_clause(analyzer, method, SpecTag::Requires)?;
    let invariant = analyzer.invariant().clone();
    let pre = Formula::conj([
        invariant.clone(),
        Formula::var_eq(CONTRACT_VAR, 1),
        Formula::var_eq(TIME_VAR, 0),
        requires,
    ]);
    let post = Formula::conj([Formula::var_eq(CONTRACT_VAR, 1), invariant.clone(), ensures]);

    let mut translator = StatementTranslator::new(analyzer.model(), Some(class), invariant.clone(), havoc_vars(class));
    let translated = translator.translate_block(method.body_after_guard(), CallSet::new())?;
    let leading = match method.leading_guard() {
        Some(guard) => translate_guard(guard)?,
        None => Formula::True,
    };
    let resolved = resolve_all(translator.into_placeholders(), analyzer, &invariant)?;
    let program = HybridProgram::test(leading)
        .then(translated.program)
        .resolve_placeholders(&resolved)?;
    debug!(
        "{}.{}: {} placeholders resolved, tail calls {:?}",
        class.name,
        method.sig.name,
        resolved.len(),
        translated.calls.iter().map(|sig| &sig.name).collect::<Vec<_>>()
    );

    let parameters = program_variables(
        class
            .field_names()
            .into_iter()
            .chain(body.local_names())
            .chain(method.sig.params.iter().map(|p| p.name.clone())),
    );
    let artifact = assemble(
        analyzer,
        parameters,
        pre,
        post,
        program,
        &translated.calls,
        tactic(&method.annotations)?,
    )?;
    Ok(Obligation::new(&class.name, &method.sig.name, artifact))
}

/// The obligation of the class initializer: starting from the declared initial
/// values, the initializer keeps the contract and the invariant.
pub fn init_obligation(analyzer: &ClassAnalyzer<'_>) -> anyhow::Result<Obligation> {
    let class = analyzer.class();
    let mut initial = vec![Formula::var_eq(CONTRACT_VAR, 1)];
    for field in &class.fields {
        if let Some(init) = &field.init {
            initial.push(Formula::cmp(CmpOp::Eq, Term::var(field.name.as_str()), translate_term(init)?));
        }
    }
    for field in class.physical.iter().flat_map(|p| &p.fields) {
        initial.push(Formula::cmp(
            CmpOp::Eq,
            Term::var(field.name.as_str()),
            translate_term(&field.initial)?,
        ));
    }
    initial.push(analyzer.precondition().clone());
    let pre = Formula::conj(initial);
    let post = Formula::var_eq(CONTRACT_VAR, 1);

    let stmts: &[Stmt] = class.init_block.as_ref().map(|b| b.stmts.as_slice()).unwrap_or_default();
    let invariant = analyzer.invariant().clone();
    let mut translator = StatementTranslator::new(analyzer.model(), Some(class), invariant.clone(), havoc_vars(class));
    let translated = translator.translate_block(stmts, CallSet::new())?;
    let resolved = resolve_all(translator.into_placeholders(), analyzer, &invariant)?;
    let program = translated.program.resolve_placeholders(&resolved)?;
    let mut calls = translated.calls;
    if let Some(run) = class.run_method() {
        calls.insert(run.sig.clone());
    }

    let locals = class.init_block.iter().flat_map(|b| b.local_names());
    let parameters = program_variables(class.field_names().into_iter().chain(locals));
    let artifact = assemble(analyzer, parameters, pre, post, program, &calls, tactic(&class.annotations)?)?;
    Ok(Obligation::new(&class.name, "init", artifact))
}
