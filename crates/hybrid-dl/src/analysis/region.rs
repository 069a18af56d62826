// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::data::{Formula, PlaceholderEntry};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// How precisely the evolution domain between suspensions is approximated.
/// Selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionStrategy {
    /// Domain `true`
    #[default]
    Basic,
    /// Exclude the guards of the pending self-calls
    Uniform,
    /// Uniform, additionally excluding every controller guard
    Controlled,
}

impl Display for RegionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionStrategy::Basic => write!(f, "basic"),
            RegionStrategy::Uniform => write!(f, "uniform"),
            RegionStrategy::Controlled => write!(f, "controlled"),
        }
    }
}

/// Supplies the formula that replaces a suspension placeholder
pub trait RegionProvider {
    fn resolve(&self, entry: &PlaceholderEntry, invariant: &Formula) -> anyhow::Result<Formula>;
}

/// Regions for code without continuous state: every placeholder becomes `true`
pub struct NoRegions;

impl RegionProvider for NoRegions {
    fn resolve(&self, _entry: &PlaceholderEntry, _invariant: &Formula) -> anyhow::Result<Formula> {
        Ok(Formula::True)
    }
}
