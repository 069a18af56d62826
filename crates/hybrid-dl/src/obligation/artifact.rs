// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The `.kyx` text handed to the prover.

use crate::data::{Formula, Term};
use crate::error::TranslationError;
use crate::naming::derivative_name;
use crate::renderer::{render_formula, DlWriter};
use itertools::Itertools;

pub const DEFAULT_TACTIC: &str = "expandAllDefs; master";

/// `Bool name(Real v.., Real vder..) <-> (body);`
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateDef {
    pub name: String,
    pub body: Formula,
}

/// A complete proof problem: definitions, variables, problem and tactic
#[derive(Debug, Clone, PartialEq)]
pub struct ProofArtifact {
    /// Variables the predicates range over, each followed by its derivative copy
    pub parameters: Vec<String>,
    pub predicates: Vec<PredicateDef>,
    pub variables: Vec<String>,
    pub problem: Formula,
    pub tactic: String,
}

impl ProofArtifact {
    /// Application `name(v.., v'..)` of one of the artifact's predicates
    pub fn apply(parameters: &[String], name: &str) -> Formula {
        let args = parameters
            .iter()
            .map(|p| Term::var(p.as_str()))
            .chain(parameters.iter().map(|p| Term::Primed(p.clone())))
            .collect();
        Formula::Pred {
            name: name.to_string(),
            args,
        }
    }

    /// Fails if a placeholder survived resolution
    pub fn validate(&self) -> anyhow::Result<()> {
        let leftover = self
            .problem
            .placeholders()
            .into_iter()
            .chain(self.predicates.iter().flat_map(|p| p.body.placeholders()))
            .next();
        match leftover {
            Some(id) => Err(TranslationError::UnresolvedPlaceholder(id).into()),
            None => Ok(()),
        }
    }

    pub fn render(&self) -> anyhow::Result<String> {
        self.validate()?;
        let mut w = DlWriter::new(String::new());

        w.write("Definitions");
        w.indent(true);
        w.line("HP skip ::= {?true;};");
        let signature = self
            .parameters
            .iter()
            .map(|p| format!("Real {p}"))
            .chain(self.parameters.iter().map(|p| format!("Real {}", derivative_name(p))))
            .join(", ");
        for predicate in &self.predicates {
            w.write(&format!("Bool {}({signature}) <-> (", predicate.name));
            w.write(&predicate.body.to_string());
            w.line(");");
        }
        w.dedent(false);
        w.line("End.");
        w.newline();

        w.write("ProgramVariables");
        w.indent(true);
        for var in &self.variables {
            w.line(&format!("Real {var};"));
        }
        w.dedent(false);
        w.line("End.");
        w.newline();

        w.write("Problem");
        w.indent(true);
        render_formula(&self.problem, &mut w);
        w.dedent(true);
        w.line("End.");
        w.newline();

        w.write("Tactic \"default\"");
        w.indent(true);
        w.line(&self.tactic);
        w.dedent(false);
        w.line("End.");
        Ok(w.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HybridProgram, PlaceholderId};

    fn artifact(problem: Formula) -> ProofArtifact {
        let parameters = vec!["contract".to_string(), "x".to_string()];
        ProofArtifact {
            predicates: vec![PredicateDef {
                name: "pre".to_string(),
                body: Formula::var_eq("contract", 1).and(Formula::raw("xder >= 0")),
            }],
            variables: parameters.clone(),
            problem,
            tactic: DEFAULT_TACTIC.to_string(),
            parameters,
        }
    }

    #[test]
    fn test_render_blocks() {
        let parameters = vec!["contract".to_string(), "x".to_string()];
        let problem = ProofArtifact::apply(&parameters, "pre").implies(Formula::boxed(
            HybridProgram::assign("x", Term::number(1)),
            Formula::var_eq("contract", 1),
        ));
        let text = artifact(problem).render().unwrap();
        let expected = [
            "Definitions",
            "  HP skip ::= {?true;};",
            "  Bool pre(Real contract, Real x, Real contractder, Real xder) <-> (contract = 1 & (xder >= 0));",
            "End.",
            "",
            "ProgramVariables",
            "  Real contract;",
            "  Real x;",
            "End.",
            "",
            "Problem",
            "  pre(contract, x, contract', x')",
            "  ->",
            "  [",
            "    x := 1;",
            "  ](contract = 1)",
            "End.",
            "",
            "Tactic \"default\"",
            "  expandAllDefs; master",
            "End.",
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_leftover_placeholder_is_rejected() {
        let problem = Formula::boxed(
            HybridProgram::test(Formula::Placeholder(PlaceholderId::new(0))),
            Formula::True,
        );
        let err = artifact(problem).render().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranslationError>(),
            Some(TranslationError::UnresolvedPlaceholder(_))
        ));
    }
}
