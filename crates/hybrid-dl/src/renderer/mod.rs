// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! KeYmaera X renderer.
//!
//! The renderer only pattern matches the dL data types and emits text; all
//! decisions about what to emit are taken by the translation and the
//! obligation assembler.

mod dl_writer;
mod render;

pub use dl_writer::{render_to_string, render_to_string_inline, DlWriter};
pub use render::{render_formula, render_ode, render_program, render_term};

use crate::data::{Formula, HybridProgram, Term};
use std::fmt::{Display, Formatter};

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_to_string_inline(|w| render_term(self, w)))
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_to_string_inline(|w| render_formula(self, w)))
    }
}

impl Display for HybridProgram {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_to_string_inline(|w| render_program(self, w)))
    }
}
