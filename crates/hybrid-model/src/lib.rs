// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Hybrid active-object models.
//!
//! This crate mirrors the type-checked syntax tree produced by the front end
//! and offers the lookups the proof-obligation generator needs. It does not
//! parse source text; models arrive as JSON documents.

pub mod ast;
mod lookup;
pub mod spec;
mod visit;

use anyhow::Context;
use log::debug;
use std::path::Path;
use thiserror::Error;

pub use ast::*;
pub use spec::{extract_spec, Resolution, SpecTag};
pub use visit::{PureExpIter, StatementIter};

/// Errors raised while resolving names or reading annotations.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("module `{0}` not found")]
    ModuleNotFound(String),

    #[error("class `{0}` not found")]
    ClassNotFound(String),

    #[error("method `{0}` not found")]
    MethodNotFound(String),

    #[error("invalid qualified name `{0}`")]
    InvalidPath(String),

    #[error("class `{0}` has no physical block; discrete classes are not supported")]
    NotPhysical(String),

    #[error("model contains no main block")]
    NoMainBlock,

    #[error("malformed annotation: {0}")]
    MalformedAnnotation(String),
}

impl Model {
    pub fn from_json_str(content: &str) -> anyhow::Result<Model> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Load and merge the models stored in the given files
pub fn load_model<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<Model> {
    let mut model = Model::default();
    for path in paths {
        let path = path.as_ref();
        debug!("loading model file {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read model file {}", path.display()))?;
        let part = Model::from_json_str(&content)
            .with_context(|| format!("cannot parse model file {}", path.display()))?;
        model.modules.extend(part.modules);
    }
    Ok(model)
}
