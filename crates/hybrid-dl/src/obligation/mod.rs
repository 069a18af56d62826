// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Proof-obligation assembly.
//!
//! Every obligation has the shape `pre(..) -> [program](post(..) & [region] inv)`
//! where `pre` and `post` are predicates of the `Definitions` block. Placeholders
//! minted during translation are resolved against a [`RegionProvider`] before the
//! artifact is built, so a rendered artifact never contains one.

mod artifact;
mod class;
mod main_block;
mod zeno;

pub use artifact::{PredicateDef, ProofArtifact, DEFAULT_TACTIC};
pub use class::{init_obligation, method_obligation};
pub use main_block::main_block_obligation;
pub use zeno::{zeno_obligations, ZenoCheck};

use crate::analysis::RegionProvider;
use crate::data::{Formula, PlaceholderId, PlaceholderMap, GHOST_VARS, RESULT_VAR, TIME_VAR};
use hybrid_model::ClassDecl;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One proof obligation, named after the directory and file it is written to
#[derive(Debug, Clone)]
pub struct Obligation {
    /// Directory of the artifact: the class name, or `main`
    pub group: String,
    /// File stem of the artifact
    pub name: String,
    /// `None` if the obligation holds trivially and needs no prover run
    pub artifact: Option<ProofArtifact>,
}

impl Obligation {
    pub fn new(group: impl Into<String>, name: impl Into<String>, artifact: ProofArtifact) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            artifact: Some(artifact),
        }
    }

    pub fn discharged(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            artifact: None,
        }
    }

    /// `<group>/<name>.kyx`
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.group).join(format!("{}.kyx", self.name))
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.group, self.name)
    }
}

/// Ghost variables followed by `extra`, without duplicates
pub(crate) fn program_variables<I, S>(extra: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    GHOST_VARS
        .iter()
        .map(|g| g.to_string())
        .chain(extra.into_iter().map(Into::into))
        .unique()
        .collect()
}

/// Everything another process may change while this one is suspended
pub(crate) fn havoc_vars(class: &ClassDecl) -> Vec<String> {
    class
        .field_names()
        .into_iter()
        .chain([RESULT_VAR.to_string(), TIME_VAR.to_string()])
        .unique()
        .collect()
}

pub(crate) fn resolve_all(
    placeholders: PlaceholderMap,
    provider: &dyn RegionProvider,
    invariant: &Formula,
) -> anyhow::Result<BTreeMap<PlaceholderId, Formula>> {
    placeholders.resolve_with(|entry| provider.resolve(entry, invariant))
}

/// Predicate body over the artifact parameters, with `x'` spelled `xder`
pub(crate) fn predicate(name: &str, body: Formula, parameters: &[String]) -> PredicateDef {
    PredicateDef {
        name: name.to_string(),
        body: body.rename_derivatives(parameters),
    }
}
