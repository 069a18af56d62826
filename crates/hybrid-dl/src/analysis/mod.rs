// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Per-class analysis: continuous dynamics, specifications, controller
//! methods and the evolution regions used to resolve placeholders.

mod controllers;
mod region;

pub use controllers::{is_controllable, is_controller, reachable_from_init};
pub use region::{NoRegions, RegionProvider, RegionStrategy};

use crate::data::{CallSet, Formula, HybridProgram, OdeSystem, PlaceholderEntry};
use crate::error::TranslationError;
use crate::translation::{translate_formula, translate_guard, translate_term};
use hybrid_model::{extract_spec, ClassDecl, Guard, MethodSig, Model, ModelError, PureExp, Resolution, SpecTag};
use log::{debug, info};

/// Everything about a class that outlives a single obligation.
/// Built once per class and read-only afterwards.
pub struct ClassAnalyzer<'a> {
    model: &'a Model,
    class: &'a ClassDecl,
    strategy: RegionStrategy,
    ode: OdeSystem,
    invariant: Formula,
    precondition: Formula,
    controllers: Vec<MethodSig>,
    controller_guards: Vec<Formula>,
}

impl<'a> ClassAnalyzer<'a> {
    pub fn new(model: &'a Model, class: &'a ClassDecl, strategy: RegionStrategy) -> anyhow::Result<Self> {
        let physical = class
            .physical
            .as_ref()
            .ok_or_else(|| ModelError::NotPhysical(class.name.clone()))?;

        let mut equations = vec![];
        for field in &physical.fields {
            let defines_own_field = matches!(
                &field.ode.lhs,
                PureExp::Derivative(inner) if matches!(inner.as_ref(), PureExp::FieldUse(name) if *name == field.name)
            );
            if !defines_own_field {
                return Err(TranslationError::Malformed(format!(
                    "the equation of `{}.{}` must define `{}'`, found left side {:?}",
                    class.name, field.name, field.name, field.ode.lhs
                ))
                .into());
            }
            equations.push((field.name.clone(), translate_term(&field.ode.rhs)?));
        }

        let invariant = extract_spec(&physical.annotations, SpecTag::ObjInv, Resolution::Conjoin)?
            .map(Formula::Raw)
            .unwrap_or(Formula::True);
        let precondition = extract_spec(&class.annotations, SpecTag::Requires, Resolution::Conjoin)?
            .map(Formula::Raw)
            .unwrap_or(Formula::True);

        let controllable = is_controllable(class);
        debug!("class {} is controllable: {controllable}", class.name);
        let mut controllers = vec![];
        let mut controller_guards = vec![];
        if controllable {
            let reachable = reachable_from_init(class);
            for method in class.methods.iter().filter(|m| is_controller(m, &reachable)) {
                if let Some(guard) = method.leading_guard() {
                    controllers.push(method.sig.clone());
                    controller_guards.push(translate_guard(guard)?);
                }
            }
        }

        let strategy = match strategy {
            RegionStrategy::Controlled if !controllable => {
                info!("class {} is not controllable, falling back to uniform regions", class.name);
                RegionStrategy::Uniform
            }
            RegionStrategy::Controlled if controllers.is_empty() => {
                info!("class {} has no controller methods, falling back to uniform regions", class.name);
                RegionStrategy::Uniform
            }
            other => other,
        };

        let analyzer = Self {
            model,
            class,
            strategy,
            ode: OdeSystem::new(equations),
            invariant,
            precondition,
            controllers,
            controller_guards,
        };
        if analyzer.strategy == RegionStrategy::Controlled {
            info!("controlled region of {}: {}", class.name, analyzer.controller_region());
        }
        Ok(analyzer)
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn class(&self) -> &'a ClassDecl {
        self.class
    }

    /// The strategy in effect after a possible fallback
    pub fn strategy(&self) -> RegionStrategy {
        self.strategy
    }

    pub fn ode(&self) -> &OdeSystem {
        &self.ode
    }

    /// Conjoined `ObjInv` clauses of the physical block
    pub fn invariant(&self) -> &Formula {
        &self.invariant
    }

    /// Conjoined `Requires` clauses of the class
    pub fn precondition(&self) -> &Formula {
        &self.precondition
    }

    pub fn controllers(&self) -> &[MethodSig] {
        &self.controllers
    }

    pub fn is_controller(&self, sig: &MethodSig) -> bool {
        self.controllers.iter().any(|c| c.matches(sig))
    }

    /// Disjunction of all controller guards
    pub fn controller_region(&self) -> Formula {
        Formula::disj(self.controller_guards.iter().cloned())
    }

    /// Evolution domain for a continuous step with pending self-calls `calls`
    pub fn domain(&self, extra: Formula, calls: &CallSet) -> anyhow::Result<Formula> {
        match self.strategy {
            RegionStrategy::Basic => Ok(Formula::True),
            RegionStrategy::Uniform => self.uniform_domain(extra, calls),
            RegionStrategy::Controlled => {
                Ok(self.uniform_domain(extra, calls)?.and(self.controller_region().not()))
            }
        }
    }

    fn uniform_domain(&self, extra: Formula, calls: &CallSet) -> anyhow::Result<Formula> {
        let mut excluded = vec![];
        for sig in calls {
            let Some(method) = self.class.method_by_sig(sig) else {
                continue;
            };
            if let Some(Guard::Differential(cond)) = method.leading_guard() {
                excluded.push(translate_formula(cond)?.not());
            }
        }
        Ok(Formula::conj(excluded).and(extra))
    }

    /// `tv := 0; {ode, tv' = 1 & domain}`
    pub fn region(&self, extra: Formula, calls: &CallSet) -> anyhow::Result<HybridProgram> {
        Ok(HybridProgram::timed_evolution(&self.ode, self.domain(extra, calls)?))
    }
}

impl RegionProvider for ClassAnalyzer<'_> {
    fn resolve(&self, entry: &PlaceholderEntry, invariant: &Formula) -> anyhow::Result<Formula> {
        Ok(Formula::boxed(
            self.region(entry.guard.clone(), &entry.calls)?,
            invariant.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use hybrid_model::BinOp;

    fn calls(names: &[&str]) -> CallSet {
        names.iter().map(|name| sig(name, &[])).collect()
    }

    fn not_x_ge_10() -> Formula {
        translate_formula(&bin(BinOp::Ge, field("x"), int("10"))).unwrap().not()
    }

    #[test]
    fn test_controlled_region_excludes_controller_guard() {
        let model = thermo_model();
        let class = model.find_class("Thermo.Heater").unwrap();
        let analyzer = ClassAnalyzer::new(&model, class, RegionStrategy::Controlled).unwrap();
        assert_eq!(analyzer.strategy(), RegionStrategy::Controlled);
        assert_eq!(analyzer.controllers(), &[sig("ctrl", &[])]);

        let domain = analyzer.domain(Formula::True, &CallSet::new()).unwrap();
        assert!(domain.conjuncts().contains(&&not_x_ge_10()));

        let region = analyzer.region(Formula::True, &CallSet::new()).unwrap();
        insta::assert_snapshot!(region.to_string(), @"tv := 0; {x' = 1, tv' = 1 & !(x >= 10)}");
    }

    #[test]
    fn test_region_monotonicity() {
        let model = thermo_model();
        let class = model.find_class("Thermo.Heater").unwrap();
        let pending = calls(&["ctrl", "boost"]);
        let domains: Vec<Formula> = [RegionStrategy::Basic, RegionStrategy::Uniform, RegionStrategy::Controlled]
            .into_iter()
            .map(|strategy| {
                ClassAnalyzer::new(&model, class, strategy)
                    .unwrap()
                    .domain(Formula::True, &pending)
                    .unwrap()
            })
            .collect();

        let basic = domains[0].conjuncts();
        let uniform = domains[1].conjuncts();
        let controlled = domains[2].conjuncts();
        assert!(basic.is_empty());
        assert_eq!(uniform, vec![&not_x_ge_10()]);
        assert!(uniform.iter().all(|c| controlled.contains(c)));
        assert!(controlled.len() > uniform.len());
    }

    #[test]
    fn test_fallback_without_controllers() {
        let mut model = thermo_model();
        model.modules[0].classes[0].methods.retain(|m| m.sig.name != "run");
        let class = model.find_class("Thermo.Heater").unwrap();
        let analyzer = ClassAnalyzer::new(&model, class, RegionStrategy::Controlled).unwrap();
        assert_eq!(analyzer.strategy(), RegionStrategy::Uniform);
        assert!(analyzer.controllers().is_empty());
        assert_eq!(analyzer.domain(Formula::True, &CallSet::new()).unwrap(), Formula::True);
    }

    #[test]
    fn test_malformed_ode() {
        let mut model = thermo_model();
        let physical = model.modules[0].classes[0].physical.as_mut().unwrap();
        physical.fields[0].ode.lhs = PureExp::Derivative(Box::new(field("y")));
        let class = model.find_class("Thermo.Heater").unwrap();
        let err = ClassAnalyzer::new(&model, class, RegionStrategy::Basic).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<TranslationError>(),
            Some(TranslationError::Malformed(_))
        ));
    }

    #[test]
    fn test_discrete_class_rejected() {
        let mut model = thermo_model();
        model.modules[0].classes[0].physical = None;
        let class = model.find_class("Thermo.Heater").unwrap();
        let err = ClassAnalyzer::new(&model, class, RegionStrategy::Basic).err().unwrap();
        assert!(matches!(err.downcast_ref::<ModelError>(), Some(ModelError::NotPhysical(_))));
    }

    #[test]
    fn test_placeholder_resolves_to_boxed_region() {
        let model = thermo_model();
        let class = model.find_class("Thermo.Heater").unwrap();
        let analyzer = ClassAnalyzer::new(&model, class, RegionStrategy::Uniform).unwrap();
        let entry = PlaceholderEntry {
            guard: Formula::True,
            calls: calls(&["ctrl"]),
            blocking_read: false,
        };
        let resolved = analyzer.resolve(&entry, analyzer.invariant()).unwrap();
        insta::assert_snapshot!(resolved.to_string(), @"[tv := 0; {x' = 1, tv' = 1 & !(x >= 10)}](x >= 0)");
    }
}
