// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Depth-first traversal of statements and expressions, plus the collection
//! queries the translator needs (field writes, calls, creations, variables).

use crate::ast::{Block, EffExp, Exp, Guard, LValue, MethodSig, PureExp, Stmt};

/// Traverse the child statements of a statement
macro_rules! traverse_statement {
    ($target:expr, $action:expr) => {
        match $target {
            Stmt::If { then_branch, else_branch, .. } => {
                for s in &then_branch.stmts {
                    $action(s);
                }
                if let Some(else_branch) = else_branch {
                    for s in &else_branch.stmts {
                        $action(s);
                    }
                }
            }
            Stmt::While { body, .. } | Stmt::Block(body) => {
                for s in &body.stmts {
                    $action(s);
                }
            }
            Stmt::Case { branches, .. } => {
                for branch in branches {
                    for s in &branch.body.stmts {
                        $action(s);
                    }
                }
            }
            _ => {}
        }
    };
}

impl Stmt {
    /// Iterate over this statement and all nested statements (depth-first)
    pub fn iter(&self) -> StatementIter<'_> {
        StatementIter { stack: vec![self] }
    }

    /// The side effect performed directly by this statement, if any
    pub fn effect(&self) -> Option<&EffExp> {
        match self {
            Stmt::Assign { value: Exp::Effect(eff), .. }
            | Stmt::VarDecl { init: Some(Exp::Effect(eff)), .. }
            | Stmt::Expression(Exp::Effect(eff)) => Some(eff),
            _ => None,
        }
    }

    /// Pure expressions occurring directly in this statement (not in nested statements)
    pub fn pure_expressions(&self) -> Vec<&PureExp> {
        let mut result = vec![];
        match self {
            Stmt::Assign { value, .. } | Stmt::Expression(value) => push_exp(value, &mut result),
            Stmt::VarDecl { init: Some(value), .. } => push_exp(value, &mut result),
            Stmt::If { cond, .. } | Stmt::While { cond, .. } => result.push(cond),
            Stmt::Case { scrutinee, .. } => result.push(scrutinee),
            Stmt::Return(exp) | Stmt::Assert(exp) => result.push(exp),
            Stmt::Await(guard) => push_guard(guard, &mut result),
            Stmt::Duration { min, max } => {
                result.push(min);
                result.push(max);
            }
            Stmt::Skip | Stmt::VarDecl { init: None, .. } | Stmt::Block(_) => {}
        }
        result
    }

    pub fn is_suspension(&self) -> bool {
        matches!(self, Stmt::Await(_)) || matches!(self.effect(), Some(EffExp::Get(_)))
    }
}

fn push_exp<'a>(exp: &'a Exp, out: &mut Vec<&'a PureExp>) {
    match exp {
        Exp::Pure(pure) => out.push(pure),
        Exp::Effect(EffExp::AsyncCall { callee, args, .. } | EffExp::SyncCall { callee, args, .. }) => {
            out.push(callee);
            out.extend(args);
        }
        Exp::Effect(EffExp::New { args, .. }) => out.extend(args),
        Exp::Effect(EffExp::Get(fut)) => out.push(fut),
    }
}

fn push_guard<'a>(guard: &'a Guard, out: &mut Vec<&'a PureExp>) {
    match guard {
        Guard::Exp(exp) | Guard::Differential(exp) | Guard::Claim(exp) => out.push(exp),
        Guard::Duration { min } => out.push(min),
        Guard::And(lhs, rhs) | Guard::Or(lhs, rhs) => {
            push_guard(lhs, out);
            push_guard(rhs, out);
        }
    }
}

impl PureExp {
    /// Iterate over this expression and all subexpressions
    pub fn iter(&self) -> PureExpIter<'_> {
        PureExpIter { stack: vec![self] }
    }
}

impl Block {
    /// Iterate over all statements of the block, including nested ones
    pub fn iter(&self) -> impl Iterator<Item = &Stmt> + '_ {
        self.stmts.iter().flat_map(|s| s.iter())
    }

    /// Whether some statement assigns to a field
    pub fn writes_field(&self) -> bool {
        self.iter().any(|s| {
            matches!(
                s,
                Stmt::Assign {
                    target: LValue::Field(_),
                    ..
                }
            )
        })
    }

    /// Signatures of all calls, synchronous or not, in any position
    pub fn calls(&self) -> Vec<&MethodSig> {
        self.iter()
            .filter_map(|s| match s.effect() {
                Some(EffExp::AsyncCall { method, .. } | EffExp::SyncCall { method, .. }) => {
                    Some(method)
                }
                _ => None,
            })
            .collect()
    }

    /// Signatures of calls whose callee is `this`
    pub fn self_calls(&self) -> Vec<&MethodSig> {
        self.iter()
            .filter_map(|s| match s.effect() {
                Some(EffExp::AsyncCall { callee, method, .. } | EffExp::SyncCall { callee, method, .. })
                    if callee.is_this() =>
                {
                    Some(method)
                }
                _ => None,
            })
            .collect()
    }

    /// Names of all classes instantiated in the block
    pub fn creations(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|s| match s.effect() {
                Some(EffExp::New { class, .. }) => Some(class.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn contains_get(&self) -> bool {
        self.iter().any(|s| matches!(s.effect(), Some(EffExp::Get(_))))
    }

    pub fn contains_sync_call(&self) -> bool {
        self.iter()
            .any(|s| matches!(s.effect(), Some(EffExp::SyncCall { .. })))
    }

    pub fn contains_duration(&self) -> bool {
        self.iter().any(|s| matches!(s, Stmt::Duration { .. }))
    }

    /// Local variable names, declared or used, in order of first occurrence
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = vec![];
        let mut add = |name: &str| {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        };
        for stmt in self.iter() {
            match stmt {
                Stmt::VarDecl { name, .. } => add(name),
                Stmt::Assign {
                    target: LValue::Var(name),
                    ..
                } => add(name),
                _ => {}
            }
            for exp in stmt.pure_expressions().into_iter().flat_map(|e| e.iter()) {
                if let PureExp::VarUse(name) = exp {
                    add(name);
                }
            }
        }
        names
    }
}

pub struct StatementIter<'a> {
    stack: Vec<&'a Stmt>,
}

impl<'a> Iterator for StatementIter<'a> {
    type Item = &'a Stmt;

    fn next(&mut self) -> Option<Self::Item> {
        let statement = self.stack.pop()?;
        traverse_statement!(statement, |s| self.stack.push(s));
        Some(statement)
    }
}

pub struct PureExpIter<'a> {
    stack: Vec<&'a PureExp>,
}

impl<'a> Iterator for PureExpIter<'a> {
    type Item = &'a PureExp;

    fn next(&mut self) -> Option<Self::Item> {
        let exp = self.stack.pop()?;
        self.stack.extend(exp.children());
        Some(exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;

    fn call(name: &str) -> Stmt {
        Stmt::Expression(Exp::Effect(EffExp::AsyncCall {
            callee: PureExp::This,
            callee_interface: None,
            method: MethodSig {
                name: name.to_string(),
                params: vec![],
            },
            args: vec![],
        }))
    }

    #[test]
    fn test_nested_queries() {
        let block = Block::new(vec![
            Stmt::If {
                cond: PureExp::Binary {
                    op: BinOp::Gt,
                    lhs: Box::new(PureExp::VarUse("n".to_string())),
                    rhs: Box::new(PureExp::IntLiteral("0".to_string())),
                },
                then_branch: Block::new(vec![Stmt::Assign {
                    target: LValue::Field("x".to_string()),
                    value: Exp::Pure(PureExp::VarUse("n".to_string())),
                }]),
                else_branch: Some(Block::new(vec![call("reset")])),
            },
            Stmt::VarDecl {
                name: "y".to_string(),
                ty: "Int".to_string(),
                init: Some(Exp::Effect(EffExp::New {
                    class: "Tank".to_string(),
                    args: vec![],
                })),
            },
        ]);

        assert!(block.writes_field());
        assert_eq!(block.calls().len(), 1);
        assert_eq!(block.self_calls()[0].name, "reset");
        assert_eq!(block.creations(), vec!["Tank"]);
        assert_eq!(block.local_names(), vec!["n".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_expression_iter_reaches_leaves() {
        let exp = PureExp::Binary {
            op: BinOp::Add,
            lhs: Box::new(PureExp::FieldUse("x".to_string())),
            rhs: Box::new(PureExp::Unary {
                op: crate::ast::UnOp::Neg,
                operand: Box::new(PureExp::VarUse("v".to_string())),
            }),
        };
        let leaves: Vec<_> = exp
            .iter()
            .filter(|e| matches!(e, PureExp::FieldUse(_) | PureExp::VarUse(_)))
            .collect();
        assert_eq!(leaves.len(), 2);
    }
}
