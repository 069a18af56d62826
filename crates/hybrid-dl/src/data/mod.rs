// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Target representation: dL terms, formulas and hybrid programs.

use hybrid_model::MethodSig;
use std::collections::BTreeSet;

pub mod formula;
pub mod placeholder;
pub mod program;

pub use formula::{ArithOp, CmpOp, Formula, Term};
pub use placeholder::{PlaceholderEntry, PlaceholderId, PlaceholderMap};
pub use program::{HybridProgram, OdeSystem};

/// Ghost flag: 1 while no call, creation or wait assumption has been violated.
pub const CONTRACT_VAR: &str = "contract";
/// Ghost slot holding the return value of a method.
pub const RESULT_VAR: &str = "result";
/// Ghost clock: time elapsed since the last continuous evolution started.
pub const TIME_VAR: &str = "tv";
/// Bound quantified in Zeno-freedom obligations.
pub const ZENO_VAR: &str = "zeno";

/// The ghost variables present in every obligation.
pub const GHOST_VARS: [&str; 3] = [CONTRACT_VAR, RESULT_VAR, TIME_VAR];

/// Methods guaranteed to have been called (on `this`) since the last suspension.
pub type CallSet = BTreeSet<MethodSig>;
