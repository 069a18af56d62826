// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Zeno-freedom: every controller lets time pass before the controlled region
//! is left again, and no other method disturbs the controlled state.

use super::class::{contract_clause, tactic};
use super::{havoc_vars, predicate, program_variables, resolve_all, Obligation, ProofArtifact};
use crate::analysis::ClassAnalyzer;
use crate::data::{CallSet, CmpOp, Formula, HybridProgram, Term, CONTRACT_VAR, TIME_VAR, ZENO_VAR};
use crate::translation::{translate_guard, StatementTranslator};
use hybrid_model::{MethodImpl, SpecTag};
use log::{info, warn};

/// Outcome of the syntactic part of the Zeno check together with the
/// obligations that remain for the prover
#[derive(Debug, Default)]
pub struct ZenoCheck {
    pub obligations: Vec<Obligation>,
    /// Non-controller methods that write a field or create an object
    pub violations: Vec<String>,
}

impl ZenoCheck {
    pub fn is_violated(&self) -> bool {
        !self.violations.is_empty()
    }
}

pub fn zeno_obligations(analyzer: &ClassAnalyzer<'_>) -> anyhow::Result<ZenoCheck> {
    let class = analyzer.class();
    let mut check = ZenoCheck::default();
    if analyzer.controllers().is_empty() {
        info!("class {} has no controllers, Zeno freedom holds vacuously", class.name);
        return Ok(check);
    }
    for method in &class.methods {
        if analyzer.is_controller(&method.sig) {
            check.obligations.push(zeno_obligation(analyzer, method)?);
        } else if method.body.writes_field() || !method.body.creations().is_empty() {
            warn!(
                "{}.{} is not a controller but changes the object state",
                class.name, method.sig.name
            );
            check.violations.push(method.sig.name.clone());
        }
    }
    Ok(check)
}

/// `pre(..) -> \exists zeno (zeno > 0 & [?g; body; tv := 0; {ode, tv' = 1 & tv <= zeno}] !ctrl)`
fn zeno_obligation(analyzer: &ClassAnalyzer<'_>, method: &MethodImpl) -> anyhow::Result<Obligation> {
    let class = analyzer.class();
    let invariant = analyzer.invariant().clone();
    let pre = Formula::conj([
        invariant.clone(),
        Formula::var_eq(CONTRACT_VAR, 1),
        Formula::var_eq(TIME_VAR, 0),
        contract_clause(analyzer, method, SpecTag::Requires)?,
    ]);

    let mut translator = StatementTranslator::new(analyzer.model(), Some(class), invariant.clone(), havoc_vars(class));
    let translated = translator.translate_block(method.body_after_guard(), CallSet::new())?;
    let leading = match method.leading_guard() {
        Some(guard) => translate_guard(guard)?,
        None => Formula::True,
    };
    let resolved = resolve_all(translator.into_placeholders(), analyzer, &invariant)?;
    let bounded = Formula::cmp(CmpOp::Le, Term::var(TIME_VAR), Term::var(ZENO_VAR));
    let program = HybridProgram::test(leading)
        .then(translated.program)
        .resolve_placeholders(&resolved)?
        .then(HybridProgram::timed_evolution(analyzer.ode(), bounded));

    let positive = Formula::cmp(CmpOp::Gt, Term::var(ZENO_VAR), Term::number(0));
    let leaves_region = Formula::boxed(program, analyzer.controller_region().not());

    let parameters = program_variables(
        class
            .field_names()
            .into_iter()
            .chain(method.body.local_names())
            .chain(method.sig.params.iter().map(|p| p.name.clone())),
    );
    let mut variables = parameters.clone();
    variables.push(ZENO_VAR.to_string());
    let artifact = ProofArtifact {
        problem: ProofArtifact::apply(&parameters, "pre")
            .implies(Formula::exists(ZENO_VAR, positive.and(leaves_region))),
        predicates: vec![predicate("pre", pre, &parameters)],
        parameters,
        variables,
        tactic: tactic(&class.annotations)?,
    };
    Ok(Obligation::new(&class.name, format!("zeno_{}", method.sig.name), artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RegionStrategy;
    use crate::fixtures::*;
    use hybrid_model::BinOp;

    #[test]
    fn test_state_changing_methods_are_violations() {
        let model = thermo_model();
        let class = model.find_class("Thermo.Heater").unwrap();
        let analyzer = ClassAnalyzer::new(&model, class, RegionStrategy::Controlled).unwrap();
        let check = zeno_obligations(&analyzer).unwrap();
        assert!(check.is_violated());
        assert_eq!(check.violations, vec!["boost", "nudge"]);
    }

    #[test]
    fn test_controller_obligation() {
        let mut model = thermo_model();
        model.modules[0].classes[0]
            .methods
            .retain(|m| m.sig.name != "boost" && m.sig.name != "nudge");
        let class = model.find_class("Thermo.Heater").unwrap();
        let analyzer = ClassAnalyzer::new(&model, class, RegionStrategy::Basic).unwrap();
        let check = zeno_obligations(&analyzer).unwrap();
        assert!(!check.is_violated());
        assert_eq!(check.obligations.len(), 1);

        let obligation = &check.obligations[0];
        assert_eq!(obligation.qualified_name(), "Heater.zeno_ctrl");
        let artifact = obligation.artifact.as_ref().unwrap();
        assert_eq!(artifact.predicates.len(), 1);
        assert_eq!(artifact.variables.last().map(String::as_str), Some(ZENO_VAR));

        let text = artifact.render().unwrap();
        assert!(text.contains("\\exists zeno (zeno > 0 & ["));
        assert!(text.contains("{x' = 1, tv' = 1 & tv <= zeno}"));
        assert!(text.contains("]!(x >= 10)"));
        assert!(text.contains("  Real zeno;\n"));
    }

    fn single_controller_claim(model: &hybrid_model::Model) -> String {
        let class = model.find_class("Thermo.Heater").unwrap();
        let analyzer = ClassAnalyzer::new(model, class, RegionStrategy::Basic).unwrap();
        let check = zeno_obligations(&analyzer).unwrap();
        assert!(!check.is_violated());
        assert_eq!(check.obligations.len(), 1);
        let artifact = check.obligations[0].artifact.as_ref().unwrap();
        let Formula::Implies(_, claim) = &artifact.problem else {
            panic!("expected an implication");
        };
        claim.to_string()
    }

    fn controllers_only() -> hybrid_model::Model {
        let mut model = thermo_model();
        model.modules[0].classes[0]
            .methods
            .retain(|m| m.sig.name != "boost" && m.sig.name != "nudge");
        model
    }

    #[test]
    fn test_evolution_follows_resetting_controller() {
        // x is reset to 0 and needs time to reach 10 again
        insta::assert_snapshot!(
            single_controller_claim(&controllers_only()),
            @"\\exists zeno (zeno > 0 & [?x >= 10; x := 0; { { ?true; skip; } ++ { ?!true; contract := 0; } } tv := 0; {x' = 1, tv' = 1 & tv <= zeno}]!(x >= 10))"
        );
    }

    #[test]
    fn test_evolution_follows_zero_time_controller() {
        // the body leaves x >= 10 in place, so the guard fires again at once
        let mut model = controllers_only();
        let ctrl = model.modules[0].classes[0]
            .methods
            .iter_mut()
            .find(|m| m.sig.name == "ctrl")
            .unwrap();
        ctrl.body.stmts[1] = set_field("count", bin(BinOp::Add, field("count"), int("1")));
        insta::assert_snapshot!(
            single_controller_claim(&model),
            @"\\exists zeno (zeno > 0 & [?x >= 10; count := (count + 1); { { ?true; skip; } ++ { ?!true; contract := 0; } } tv := 0; {x' = 1, tv' = 1 & tv <= zeno}]!(x >= 10))"
        );
    }

    #[test]
    fn test_no_controllers_is_vacuous() {
        let mut model = thermo_model();
        let class = &mut model.modules[0].classes[0];
        class.methods.retain(|m| m.sig.name != "run");
        let class = model.find_class("Thermo.Heater").unwrap();
        let analyzer = ClassAnalyzer::new(&model, class, RegionStrategy::Basic).unwrap();
        let check = zeno_obligations(&analyzer).unwrap();
        assert!(check.obligations.is_empty());
        assert!(!check.is_violated());
    }
}
