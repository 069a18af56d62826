// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Model builders shared by the unit tests.

use hybrid_model::*;

pub fn int(value: &str) -> PureExp {
    PureExp::IntLiteral(value.to_string())
}

pub fn field(name: &str) -> PureExp {
    PureExp::FieldUse(name.to_string())
}

pub fn var(name: &str) -> PureExp {
    PureExp::VarUse(name.to_string())
}

pub fn bin(op: BinOp, lhs: PureExp, rhs: PureExp) -> PureExp {
    PureExp::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn sig(name: &str, params: &[(&str, &str)]) -> MethodSig {
    MethodSig {
        name: name.to_string(),
        params: params
            .iter()
            .map(|(name, ty)| Param {
                name: name.to_string(),
                ty: ty.to_string(),
            })
            .collect(),
    }
}

pub fn spec(tag: &str, content: &str) -> Annotation {
    Annotation {
        ty: "ABS.DC.HybridSpec".to_string(),
        value: PureExp::DataConstructor {
            constructor: tag.to_string(),
            args: vec![PureExp::StringLiteral(content.to_string())],
        },
    }
}

pub fn self_call(method: MethodSig, args: Vec<PureExp>) -> Stmt {
    Stmt::Expression(Exp::Effect(EffExp::AsyncCall {
        callee: PureExp::This,
        callee_interface: None,
        method,
        args,
    }))
}

pub fn set_field(name: &str, value: PureExp) -> Stmt {
    Stmt::Assign {
        target: LValue::Field(name.to_string()),
        value: Exp::Pure(value),
    }
}

pub fn await_diff(cond: PureExp) -> Stmt {
    Stmt::Await(Guard::Differential(cond))
}

pub fn method(sig: MethodSig, stmts: Vec<Stmt>) -> MethodImpl {
    MethodImpl {
        sig,
        body: Block::new(stmts),
        annotations: vec![],
    }
}

/// A heater whose temperature `x` rises with `x' = 1` and is reset by a
/// controller once it reaches 10.
pub fn heater() -> ClassDecl {
    ClassDecl {
        name: "Heater".to_string(),
        params: vec![],
        fields: vec![FieldDecl {
            name: "count".to_string(),
            ty: "Int".to_string(),
            init: Some(int("0")),
        }],
        physical: Some(PhysicalBlock {
            fields: vec![PhysicalField {
                name: "x".to_string(),
                initial: int("0"),
                ode: Ode {
                    lhs: PureExp::Derivative(Box::new(field("x"))),
                    rhs: int("1"),
                },
            }],
            annotations: vec![spec("ObjInv", "x >= 0")],
        }),
        init_block: None,
        methods: vec![
            method(sig("run", &[]), vec![self_call(sig("ctrl", &[]), vec![])]),
            method(
                sig("ctrl", &[]),
                vec![
                    await_diff(bin(BinOp::Ge, field("x"), int("10"))),
                    set_field("x", int("0")),
                    self_call(sig("ctrl", &[]), vec![]),
                ],
            ),
            method(
                sig("boost", &[("n", "Int")]),
                vec![set_field("count", bin(BinOp::Add, field("count"), var("n")))],
            ),
            method(
                sig("poke", &[]),
                vec![self_call(sig("boost", &[("m", "Int")]), vec![int("0")])],
            ),
            method(
                sig("idle", &[]),
                vec![Stmt::VarDecl {
                    name: "y".to_string(),
                    ty: "Int".to_string(),
                    init: Some(Exp::Pure(int("1"))),
                }],
            ),
            method(
                sig("nudge", &[]),
                vec![set_field("count", int("1")), self_call(sig("ctrl", &[]), vec![])],
            ),
        ],
        implements: vec!["IHeater".to_string()],
        annotations: vec![],
    }
}

pub fn thermo_model() -> Model {
    Model {
        modules: vec![ModuleDecl {
            name: "Thermo".to_string(),
            interfaces: vec![InterfaceDecl {
                name: "IHeater".to_string(),
                extends: vec![],
                methods: vec![
                    InterfaceMethod {
                        sig: sig("ctrl", &[]),
                        annotations: vec![],
                    },
                    InterfaceMethod {
                        sig: sig("boost", &[("n", "Int")]),
                        annotations: vec![spec("Requires", "n > 0")],
                    },
                ],
            }],
            classes: vec![heater()],
            main_block: Some(Block::new(vec![Stmt::VarDecl {
                name: "h".to_string(),
                ty: "IHeater".to_string(),
                init: Some(Exp::Effect(EffExp::New {
                    class: "Heater".to_string(),
                    args: vec![],
                })),
            }])),
        }],
    }
}
