// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Renders terms, formulas and hybrid programs to KeYmaera X syntax.
//!
//! Programs under a box modality are laid out one statement per line in
//! multi-line mode. Test formulas always render on a single line.

use super::dl_writer::{render_to_string_inline, DlWriter};
use crate::data::{ArithOp, CmpOp, Formula, HybridProgram, OdeSystem, Term};
use std::fmt::Write;

pub fn render_term<W: Write>(term: &Term, w: &mut DlWriter<W>) {
    match term {
        Term::Var(name) | Term::Number(name) => w.write(name),
        Term::Primed(name) => {
            w.write(name);
            w.write("'");
        }
        Term::Binary { op, lhs, rhs } => {
            w.write("(");
            render_term(lhs, w);
            w.write(arith_symbol(*op));
            render_term(rhs, w);
            w.write(")");
        }
        Term::Neg(inner) => {
            w.write("-");
            if inner.is_atomic() {
                render_term(inner, w);
            } else {
                w.write("(");
                render_term(inner, w);
                w.write(")");
            }
        }
    }
}

pub fn render_formula<W: Write>(formula: &Formula, w: &mut DlWriter<W>) {
    match formula {
        Formula::True => w.write("true"),
        Formula::False => w.write("false"),
        Formula::Cmp { op, lhs, rhs } => {
            render_term(lhs, w);
            w.write(cmp_symbol(*op));
            render_term(rhs, w);
        }
        Formula::Not(inner) => {
            w.write("!");
            render_operand(inner, w, |f| f.is_tight());
        }
        Formula::And(lhs, rhs) => {
            let keep = |f: &Formula| f.is_tight() || matches!(f, Formula::Cmp { .. } | Formula::And(..));
            render_operand(lhs, w, keep);
            w.write(" & ");
            render_operand(rhs, w, keep);
        }
        Formula::Or(lhs, rhs) => {
            let keep = |f: &Formula| f.is_tight() || matches!(f, Formula::Cmp { .. } | Formula::Or(..));
            render_operand(lhs, w, keep);
            w.write(" | ");
            render_operand(rhs, w, keep);
        }
        Formula::Implies(lhs, rhs) => {
            let keep = |f: &Formula| f.is_tight() || matches!(f, Formula::Cmp { .. });
            render_operand(lhs, w, keep);
            if w.is_inline() {
                w.write(" -> ");
            } else {
                w.newline();
                w.line("->");
            }
            render_operand(rhs, w, keep);
        }
        Formula::Box { program, post } => {
            w.write("[");
            if w.is_inline() {
                render_program(program, w);
            } else {
                w.indent(true);
                render_program(program, w);
                w.dedent(true);
            }
            w.write("]");
            render_operand(post, w, |f| f.is_tight());
        }
        Formula::Exists { var, body } => {
            w.write("\\exists ");
            w.write(var);
            w.write(" (");
            render_formula(body, w);
            w.write(")");
        }
        Formula::Pred { name, args } => {
            w.write(name);
            w.write("(");
            w.sep_with(", ", args, |w, arg| render_term(arg, w));
            w.write(")");
        }
        Formula::Raw(text) => {
            w.write("(");
            w.write(text);
            w.write(")");
        }
        Formula::Placeholder(id) => w.write(&id.to_string()),
    }
}

fn render_operand<W: Write>(formula: &Formula, w: &mut DlWriter<W>, keep: impl Fn(&Formula) -> bool) {
    if keep(formula) {
        render_formula(formula, w);
    } else {
        w.write("(");
        render_formula(formula, w);
        w.write(")");
    }
}

impl Formula {
    /// Renders as a single token that never needs parentheses
    fn is_tight(&self) -> bool {
        matches!(
            self,
            Formula::True
                | Formula::False
                | Formula::Not(_)
                | Formula::Box { .. }
                | Formula::Exists { .. }
                | Formula::Pred { .. }
                | Formula::Raw(_)
                | Formula::Placeholder(_)
        )
    }
}

pub fn render_program<W: Write>(program: &HybridProgram, w: &mut DlWriter<W>) {
    match program {
        HybridProgram::Skip => w.write("skip;"),
        HybridProgram::Havoc(var) => {
            w.write(var);
            w.write(" := *;");
        }
        HybridProgram::Assign { target, term } => {
            w.write(target);
            w.write(" := ");
            render_term(term, w);
            w.write(";");
        }
        HybridProgram::Test(formula) => {
            w.write("?");
            w.write(&render_to_string_inline(|w| render_formula(formula, w)));
            w.write(";");
        }
        HybridProgram::Evolve { ode, domain } => {
            w.write("{");
            render_ode(ode, w);
            w.write(" & ");
            w.write(&render_to_string_inline(|w| render_formula(domain, w)));
            w.write("}");
        }
        HybridProgram::Seq(first, second) => {
            render_program(first, w);
            w.newline();
            render_program(second, w);
        }
        HybridProgram::Choice(left, right) => {
            w.write("{");
            w.indent(true);
            render_program(left, w);
            w.dedent(true);
            w.write("} ++ {");
            w.indent(true);
            render_program(right, w);
            w.dedent(true);
            w.write("}");
        }
        HybridProgram::Group(inner) => {
            w.write("{");
            w.indent(true);
            render_program(inner, w);
            w.dedent(true);
            w.write("}");
        }
    }
}

pub fn render_ode<W: Write>(ode: &OdeSystem, w: &mut DlWriter<W>) {
    w.sep_with(", ", &ode.equations, |w, (var, rhs)| {
        w.write(var);
        w.write("' = ");
        render_term(rhs, w);
    });
}

fn arith_symbol(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => " + ",
        ArithOp::Sub => " - ",
        ArithOp::Mul => " * ",
        ArithOp::Div => " / ",
    }
}

fn cmp_symbol(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Lt => " < ",
        CmpOp::Le => " <= ",
        CmpOp::Gt => " > ",
        CmpOp::Ge => " >= ",
        CmpOp::Eq => " = ",
        CmpOp::Ne => " != ",
    }
}
