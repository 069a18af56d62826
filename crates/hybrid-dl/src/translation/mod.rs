// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Translation of model code into dL.

pub mod expression;
pub mod statement;

pub use expression::{translate_formula, translate_guard, translate_term};
pub use statement::{StatementTranslator, Translated};
