// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use super::{program_variables, resolve_all, Obligation, ProofArtifact, DEFAULT_TACTIC};
use crate::analysis::NoRegions;
use crate::data::{CallSet, Formula, CONTRACT_VAR, RESULT_VAR, TIME_VAR};
use crate::translation::StatementTranslator;
use hybrid_model::{Model, ModelError};

/// `contract = 1 -> [main](contract = 1)`: every object created by the main
/// block is created with its class precondition satisfied.
pub fn main_block_obligation(model: &Model) -> anyhow::Result<Obligation> {
    let block = model.main_block().ok_or(ModelError::NoMainBlock)?;
    let havoc = vec![RESULT_VAR.to_string(), TIME_VAR.to_string()];
    let mut translator = StatementTranslator::new(model, None, Formula::True, havoc);
    let translated = translator.translate_block(&block.stmts, CallSet::new())?;
    // no class, hence no dynamics to wait in
    let resolved = resolve_all(translator.into_placeholders(), &NoRegions, &Formula::True)?;
    let program = translated.program.resolve_placeholders(&resolved)?;

    let contract = Formula::var_eq(CONTRACT_VAR, 1);
    let artifact = ProofArtifact {
        parameters: vec![],
        predicates: vec![],
        variables: program_variables(block.local_names()),
        problem: contract.clone().implies(Formula::boxed(program, contract)),
        tactic: DEFAULT_TACTIC.to_string(),
    };
    Ok(Obligation::new("main", "main", artifact))
}
