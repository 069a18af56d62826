// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Generation of differential dynamic logic proof obligations for hybrid
//! active-object models.
//!
//! A physical class yields one obligation for its initializer and one per
//! method; each shows that the object invariant is kept until the next
//! suspension point. Suspension points are first translated with placeholders
//! that are resolved into evolution regions once the pending self-calls are
//! known (see [`analysis::RegionStrategy`]).

pub mod analysis;
pub mod data;
mod error;
pub mod naming;
pub mod obligation;
pub mod renderer;
pub mod translation;

#[cfg(test)]
mod fixtures;

pub use analysis::{ClassAnalyzer, RegionStrategy};
pub use error::TranslationError;
pub use obligation::{
    init_obligation, main_block_obligation, method_obligation, zeno_obligations, Obligation,
    ProofArtifact, ZenoCheck,
};
