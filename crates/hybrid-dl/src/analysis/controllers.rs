// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Controllability of a class and classification of controller methods.

use hybrid_model::{Block, ClassDecl, EffExp, Exp, MethodImpl, MethodSig, Stmt};

/// A class is controllable if its `run` method only issues asynchronous calls
/// and no other method, past its leading guard, blocks on a future, advances
/// time, calls synchronously or calls `run`.
pub fn is_controllable(class: &ClassDecl) -> bool {
    let Some(run) = class.run_method() else {
        return false;
    };
    let run_is_dispatch = run.body.stmts.iter().all(|stmt| {
        matches!(
            stmt,
            Stmt::Expression(Exp::Effect(EffExp::AsyncCall { .. }))
        )
    });
    if !run_is_dispatch {
        return false;
    }
    class
        .methods
        .iter()
        .filter(|m| !m.sig.matches(&run.sig))
        .all(|m| {
            let rest = Block::new(m.body_after_guard().to_vec());
            !rest.contains_get()
                && !rest.contains_duration()
                && !rest.contains_sync_call()
                && !rest.calls().iter().any(|sig| sig.matches(&run.sig))
        })
}

/// Signatures called on `this` by the initializer, directly or through `run`
pub fn reachable_from_init(class: &ClassDecl) -> Vec<MethodSig> {
    let mut result: Vec<MethodSig> = vec![];
    let init_calls = class.init_block.iter().flat_map(|b| b.self_calls());
    let run_calls = class.run_method().into_iter().flat_map(|m| m.body.self_calls());
    for sig in init_calls.chain(run_calls) {
        if !result.iter().any(|s| s.matches(sig)) {
            result.push(sig.clone());
        }
    }
    result
}

/// A controller starts with a leading guard, is reached from the initializer,
/// does not suspend in its middle part and ends by calling itself on `this`.
pub fn is_controller(method: &MethodImpl, reachable: &[MethodSig]) -> bool {
    if method.leading_guard().is_none() {
        return false;
    }
    if !reachable.iter().any(|sig| sig.matches(&method.sig)) {
        return false;
    }
    let stmts = &method.body.stmts;
    let Some(Stmt::Expression(Exp::Effect(EffExp::AsyncCall { callee, method: called, .. }))) = stmts.last() else {
        return false;
    };
    if !callee.is_this() || !called.matches(&method.sig) {
        return false;
    }
    let middle = stmts.get(1..stmts.len() - 1).unwrap_or_default();
    !middle.iter().any(|stmt| stmt.iter().any(|s| s.is_suspension()))
}
