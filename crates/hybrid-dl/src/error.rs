// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::data::PlaceholderId;
use thiserror::Error;

/// Errors that abort the proof obligation under construction.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The model violates a structural requirement, e.g. an ODE whose left side
    /// is not the derivative of its own field.
    #[error("malformed model: {0}")]
    Malformed(String),

    /// A statement, expression or guard outside the translatable fragment.
    #[error("translation not supported: {0}")]
    Unsupported(String),

    #[error("placeholder {0} has no region entry")]
    UnresolvedPlaceholder(PlaceholderId),
}

impl TranslationError {
    pub fn unsupported(what: impl std::fmt::Debug) -> anyhow::Error {
        TranslationError::Unsupported(format!("{what:?}")).into()
    }
}
