// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Prover backends for generated `.kyx` artifacts.

mod keymaera_wrapper;
pub mod options;
pub mod runner;

pub use keymaera_wrapper::{parse_verdict, KeymaeraBackend};
pub use options::KeymaeraOptions;

use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Proved,
    NotProved,
    /// No prover was available to check the artifact
    Unavailable,
}

impl Verdict {
    pub fn is_proved(&self) -> bool {
        *self == Verdict::Proved
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Proved => write!(f, "proved"),
            Verdict::NotProved => write!(f, "not proved"),
            Verdict::Unavailable => write!(f, "not checked"),
        }
    }
}

/// Anything that can decide a proof obligation stored on disk.
pub trait ProverBackend {
    fn submit(&self, artifact: &Path) -> Verdict;
}

/// Backend used when only artifacts are generated.
pub struct NoBackend;

impl ProverBackend for NoBackend {
    fn submit(&self, _artifact: &Path) -> Verdict {
        Verdict::Unavailable
    }
}
