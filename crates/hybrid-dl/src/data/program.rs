// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::data::formula::{Formula, Term};
use crate::data::placeholder::PlaceholderId;
use crate::data::TIME_VAR;
use std::collections::BTreeMap;

/// Explicit first-order ODEs, one per continuous variable
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OdeSystem {
    pub equations: Vec<(String, Term)>,
}

impl OdeSystem {
    pub fn new(equations: Vec<(String, Term)>) -> Self {
        Self { equations }
    }

    /// The system extended with the ghost clock `tv' = 1`
    pub fn with_clock(&self) -> Self {
        let mut equations = self.equations.clone();
        equations.push((TIME_VAR.to_string(), Term::number(1)));
        Self { equations }
    }
}

/// Hybrid program; immutable and rebuilt by every translation step
#[derive(Debug, Clone, PartialEq)]
pub enum HybridProgram {
    Skip,
    /// `x := *`
    Havoc(String),
    Assign {
        target: String,
        term: Term,
    },
    /// `?f`
    Test(Formula),
    Evolve {
        ode: OdeSystem,
        domain: Formula,
    },
    Seq(Box<HybridProgram>, Box<HybridProgram>),
    /// `a ++ b`
    Choice(Box<HybridProgram>, Box<HybridProgram>),
    /// `{a}`; sequencing binds tighter than `++` in the printed syntax
    Group(Box<HybridProgram>),
}

impl HybridProgram {
    pub fn assign(target: impl Into<String>, term: Term) -> Self {
        HybridProgram::Assign {
            target: target.into(),
            term,
        }
    }

    pub fn test(formula: Formula) -> Self {
        HybridProgram::Test(formula)
    }

    /// Sequential composition; `skip` operands are dropped
    pub fn then(self, next: HybridProgram) -> HybridProgram {
        match (self, next) {
            (HybridProgram::Skip, next) => next,
            (this, HybridProgram::Skip) => this,
            (this, next) => HybridProgram::Seq(Box::new(this), Box::new(next)),
        }
    }

    /// `{a ++ b}`, grouped so that it stays one operand of an enclosing sequence
    pub fn choice(left: HybridProgram, right: HybridProgram) -> HybridProgram {
        HybridProgram::Group(Box::new(HybridProgram::Choice(Box::new(left), Box::new(right))))
    }

    /// Sequential composition of all programs, `skip` if there are none
    pub fn seq_all<I: IntoIterator<Item = HybridProgram>>(programs: I) -> HybridProgram {
        programs.into_iter().fold(HybridProgram::Skip, HybridProgram::then)
    }

    /// `x1 := *; ...; xn := *`
    pub fn havoc_all<S: AsRef<str>>(vars: &[S]) -> HybridProgram {
        HybridProgram::seq_all(vars.iter().map(|v| HybridProgram::Havoc(v.as_ref().to_string())))
    }

    /// `tv := 0; {ode, tv' = 1 & domain}`
    pub fn timed_evolution(ode: &OdeSystem, domain: Formula) -> HybridProgram {
        HybridProgram::assign(TIME_VAR, Term::number(0)).then(HybridProgram::Evolve {
            ode: ode.with_clock(),
            domain,
        })
    }

    pub fn placeholders(&self) -> Vec<PlaceholderId> {
        let mut result = vec![];
        self.collect_placeholders(&mut result);
        result
    }

    pub(crate) fn collect_placeholders(&self, out: &mut Vec<PlaceholderId>) {
        match self {
            HybridProgram::Test(formula) | HybridProgram::Evolve { domain: formula, .. } => {
                formula.collect_placeholders(out)
            }
            HybridProgram::Seq(lhs, rhs) | HybridProgram::Choice(lhs, rhs) => {
                lhs.collect_placeholders(out);
                rhs.collect_placeholders(out);
            }
            HybridProgram::Group(inner) => inner.collect_placeholders(out),
            HybridProgram::Skip | HybridProgram::Havoc(_) | HybridProgram::Assign { .. } => {}
        }
    }

    pub fn resolve_placeholders(self, resolved: &BTreeMap<PlaceholderId, Formula>) -> anyhow::Result<HybridProgram> {
        Ok(match self {
            HybridProgram::Test(formula) => HybridProgram::Test(formula.resolve_placeholders(resolved)?),
            HybridProgram::Evolve { ode, domain } => HybridProgram::Evolve {
                ode,
                domain: domain.resolve_placeholders(resolved)?,
            },
            HybridProgram::Seq(lhs, rhs) => HybridProgram::Seq(
                Box::new(lhs.resolve_placeholders(resolved)?),
                Box::new(rhs.resolve_placeholders(resolved)?),
            ),
            HybridProgram::Choice(lhs, rhs) => HybridProgram::Choice(
                Box::new(lhs.resolve_placeholders(resolved)?),
                Box::new(rhs.resolve_placeholders(resolved)?),
            ),
            HybridProgram::Group(inner) => HybridProgram::Group(Box::new(inner.resolve_placeholders(resolved)?)),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CallSet;
    use crate::data::{PlaceholderEntry, PlaceholderMap};

    #[test]
    fn test_seq_drops_skip() {
        assert_eq!(HybridProgram::seq_all(vec![]), HybridProgram::Skip);
        let single = HybridProgram::seq_all(vec![HybridProgram::Skip, HybridProgram::Havoc("x".into())]);
        assert_eq!(single, HybridProgram::Havoc("x".into()));
    }

    #[test]
    fn test_timed_evolution_resets_clock() {
        let ode = OdeSystem::new(vec![("x".to_string(), Term::number(1))]);
        let program = HybridProgram::timed_evolution(&ode, Formula::True);
        let HybridProgram::Seq(reset, evolve) = program else {
            panic!("expected a sequence");
        };
        assert_eq!(*reset, HybridProgram::assign(TIME_VAR, Term::number(0)));
        let HybridProgram::Evolve { ode, .. } = *evolve else {
            panic!("expected an evolution");
        };
        assert_eq!(ode.equations.last(), Some(&(TIME_VAR.to_string(), Term::number(1))));
    }

    #[test]
    fn test_resolve_program_placeholders() {
        let mut map = PlaceholderMap::new();
        let id = map.mint(PlaceholderEntry {
            guard: Formula::True,
            calls: CallSet::new(),
            blocking_read: false,
        });
        let program = HybridProgram::choice(
            HybridProgram::test(Formula::Placeholder(id)),
            HybridProgram::test(Formula::Placeholder(id).not()),
        );
        assert!(matches!(&program, HybridProgram::Group(inner) if matches!(**inner, HybridProgram::Choice(..))));
        assert_eq!(program.placeholders(), vec![id, id]);
        let resolved = map.resolve_with(|_| Ok(Formula::True)).unwrap();
        let program = program.resolve_placeholders(&resolved).unwrap();
        assert!(program.placeholders().is_empty());
    }
}
