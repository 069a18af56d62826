// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Abstract syntax of type-checked models.
//!
//! The front end owns parsing and type checking; this crate only mirrors the
//! resulting tree. Every node is plain data and deserializes from the JSON
//! document the front end emits.

use serde::{Deserialize, Serialize};

/// A complete model: every module of every loaded file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Model {
    #[serde(default)]
    pub modules: Vec<ModuleDecl>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleDecl {
    pub name: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
    /// The module's main block, if it has one.
    #[serde(default)]
    pub main_block: Option<Block>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterfaceDecl {
    pub name: String,
    /// Names of the interfaces this one extends.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub methods: Vec<InterfaceMethod>,
}

/// A method signature as declared in an interface, with its contract annotations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterfaceMethod {
    pub sig: MethodSig,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassDecl {
    pub name: String,
    /// Class parameters; they behave like discrete fields without initializer.
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// The `physical` block with continuous fields; absent for discrete classes.
    #[serde(default)]
    pub physical: Option<PhysicalBlock>,
    #[serde(default)]
    pub init_block: Option<Block>,
    #[serde(default)]
    pub methods: Vec<MethodImpl>,
    /// Names of the implemented interfaces.
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(default)]
    pub ty: String,
    #[serde(default)]
    pub init: Option<PureExp>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PhysicalBlock {
    #[serde(default)]
    pub fields: Vec<PhysicalField>,
    /// Object invariants (`ObjInv`) are attached here.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// A continuous field: `Real x = initial : ode`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhysicalField {
    pub name: String,
    pub initial: PureExp,
    pub ode: Ode,
}

/// A defining differential equation `lhs = rhs`; well-formed models use `x'` as `lhs`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ode {
    pub lhs: PureExp,
    pub rhs: PureExp,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct MethodSig {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
}

impl MethodSig {
    /// Signatures match if they agree on the name and on the parameter types.
    /// Parameter names are irrelevant.
    pub fn matches(&self, other: &MethodSig) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MethodImpl {
    pub sig: MethodSig,
    pub body: Block,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl MethodImpl {
    /// The leading suspension guard: the condition of an `await` in first
    /// position, provided it is a continuous-state or a duration guard.
    pub fn leading_guard(&self) -> Option<&Guard> {
        match self.body.stmts.first() {
            Some(Stmt::Await(guard @ (Guard::Differential(_) | Guard::Duration { .. }))) => {
                Some(guard)
            }
            _ => None,
        }
    }

    /// The statements that follow the leading guard (all of them if there is none).
    pub fn body_after_guard(&self) -> &[Stmt] {
        let skip = usize::from(self.leading_guard().is_some());
        &self.body.stmts[skip..]
    }
}

/// A model annotation such as `[HybridSpec: Requires("x > 0")]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Annotation {
    /// Qualified annotation type, e.g. `ABS.DC.HybridSpec`.
    pub ty: String,
    pub value: PureExp,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum Stmt {
    Skip,
    Assign {
        target: LValue,
        value: Exp,
    },
    VarDecl {
        name: String,
        #[serde(default)]
        ty: String,
        #[serde(default)]
        init: Option<Exp>,
    },
    If {
        cond: PureExp,
        then_branch: Block,
        #[serde(default)]
        else_branch: Option<Block>,
    },
    While {
        cond: PureExp,
        body: Block,
    },
    Case {
        scrutinee: PureExp,
        branches: Vec<CaseBranch>,
    },
    Block(Block),
    Return(PureExp),
    Expression(Exp),
    Await(Guard),
    /// `duration(min, max)`: advance time without suspending other objects.
    Duration {
        min: PureExp,
        max: PureExp,
    },
    Assert(PureExp),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaseBranch {
    pub pattern: String,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum LValue {
    Field(String),
    Var(String),
}

impl LValue {
    pub fn name(&self) -> &str {
        match self {
            LValue::Field(name) | LValue::Var(name) => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum Exp {
    Pure(PureExp),
    Effect(EffExp),
}

/// Side-effecting expressions; they only occur at the top of a statement.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum EffExp {
    AsyncCall {
        callee: PureExp,
        /// Static interface type of the callee, filled in by the type checker.
        #[serde(default)]
        callee_interface: Option<String>,
        method: MethodSig,
        #[serde(default)]
        args: Vec<PureExp>,
    },
    SyncCall {
        callee: PureExp,
        #[serde(default)]
        callee_interface: Option<String>,
        method: MethodSig,
        #[serde(default)]
        args: Vec<PureExp>,
    },
    New {
        class: String,
        #[serde(default)]
        args: Vec<PureExp>,
    },
    Get(PureExp),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum PureExp {
    IntLiteral(String),
    FloatLiteral(String),
    StringLiteral(String),
    FieldUse(String),
    VarUse(String),
    This,
    Binary {
        op: BinOp,
        lhs: Box<PureExp>,
        rhs: Box<PureExp>,
    },
    Unary {
        op: UnOp,
        operand: Box<PureExp>,
    },
    /// `x'`
    Derivative(Box<PureExp>),
    DataConstructor {
        constructor: String,
        #[serde(default)]
        args: Vec<PureExp>,
    },
    FnApp {
        name: String,
        #[serde(default)]
        args: Vec<PureExp>,
    },
}

impl PureExp {
    pub fn is_this(&self) -> bool {
        matches!(self, PureExp::This)
    }

    /// Direct subexpressions.
    pub fn children(&self) -> Vec<&PureExp> {
        match self {
            PureExp::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            PureExp::Unary { operand, .. } => vec![operand.as_ref()],
            PureExp::Derivative(inner) => vec![inner.as_ref()],
            PureExp::DataConstructor { args, .. } | PureExp::FnApp { args, .. } => {
                args.iter().collect()
            }
            PureExp::IntLiteral(_)
            | PureExp::FloatLiteral(_)
            | PureExp::StringLiteral(_)
            | PureExp::FieldUse(_)
            | PureExp::VarUse(_)
            | PureExp::This => vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum UnOp {
    Not,
    Neg,
}

/// Suspension guards.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Guard {
    Exp(PureExp),
    /// A guard over continuous state, `await diff e`.
    Differential(PureExp),
    And(Box<Guard>, Box<Guard>),
    Or(Box<Guard>, Box<Guard>),
    /// `await duration(min)`: at least `min` time has elapsed.
    Duration {
        min: PureExp,
    },
    /// `await f?`
    Claim(PureExp),
}
