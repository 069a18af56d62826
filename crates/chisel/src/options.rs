// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use anyhow::Context;
use hybrid_dl::RegionStrategy;
use keymaera_backend::KeymaeraOptions;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Represents options provided to the tool. Most of those options are configured via a toml
/// source; some over the command line flags.
///
/// NOTE: any fields carrying structured data must appear at the end for making
/// toml printing work.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Directory the `.kyx` artifacts are written to.
    pub output_dir: PathBuf,
    /// Verbosity level for logging.
    pub verbosity_level: LevelFilter,
    /// How evolution domains at suspension points are computed.
    pub regions: RegionStrategy,

    /// BEGIN OF STRUCTURED OPTIONS. DO NOT ADD VALUE FIELDS AFTER THIS
    /// Options for the prover.
    pub keymaera: KeymaeraOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("chisel-out"),
            verbosity_level: LevelFilter::Info,
            regions: RegionStrategy::default(),
            keymaera: KeymaeraOptions::default(),
        }
    }
}

impl Options {
    pub fn from_toml(content: &str) -> anyhow::Result<Options> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Options> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config file {}", path.display()))
    }
}
