// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::driver::{Driver, Report, Target};
use crate::options::Options;
use clap::Args;
use hybrid_dl::RegionStrategy;
use hybrid_model::load_model;
use keymaera_backend::{KeymaeraBackend, NoBackend, ProverBackend};
use log::{info, LevelFilter};
use std::path::PathBuf;

/// Run target; exactly one must be given
#[derive(Args, Debug, Default)]
#[clap(next_help_heading = "Run Targets")]
#[group(required = true, multiple = false)]
pub struct TargetConfig {
    /// Verify a single method
    #[clap(long, short = 'm', value_name = "MODULE.CLASS.METHOD")]
    pub method: Option<String>,

    /// Verify the initializer of a class
    #[clap(long, short = 'i', value_name = "MODULE.CLASS")]
    pub init: Option<String>,

    /// Verify the initializer and all methods of a class
    #[clap(long, short = 'c', value_name = "MODULE.CLASS")]
    pub class: Option<String>,

    /// Verify that the controllers of a class are Zeno-free
    #[clap(long, short = 'z', value_name = "MODULE.CLASS")]
    pub zeno: Option<String>,

    /// Verify the main block
    #[clap(long)]
    pub main: bool,

    /// Verify every class and the main block
    #[clap(long)]
    pub full: bool,
}

impl TargetConfig {
    pub fn target(&self) -> anyhow::Result<Target> {
        let target = match self {
            TargetConfig { method: Some(path), .. } => Target::Method(qualified(path, 3)?),
            TargetConfig { init: Some(path), .. } => Target::Init(qualified(path, 2)?),
            TargetConfig { class: Some(path), .. } => Target::Class(qualified(path, 2)?),
            TargetConfig { zeno: Some(path), .. } => Target::Zeno(qualified(path, 2)?),
            TargetConfig { main: true, .. } => Target::Main,
            TargetConfig { full: true, .. } => Target::Full,
            _ => anyhow::bail!("no run target given"),
        };
        Ok(target)
    }
}

/// Qualified names have at least `parts` dot-separated components; module names may contain dots.
fn qualified(path: &str, parts: usize) -> anyhow::Result<String> {
    if path.split('.').filter(|p| !p.is_empty()).count() < parts {
        return Err(hybrid_model::ModelError::InvalidPath(path.to_string()).into());
    }
    Ok(path.to_string())
}

/// General options
#[derive(Args, Debug, Default)]
#[clap(next_help_heading = "General Options")]
pub struct GeneralConfig {
    /// How evolution regions at suspension points are computed (default: basic)
    #[clap(long, value_enum)]
    pub regions: Option<RegionStrategy>,

    /// Directory the .kyx files are written to
    #[clap(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Path to the KeYmaera X jar; without it the obligations are only generated
    #[clap(long)]
    pub keymaera: Option<String>,

    /// Hard timeout per obligation in seconds (default: 60)
    #[clap(long, short = 't')]
    pub timeout: Option<u64>,

    /// TOML file with further options
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity, may be repeated
    #[clap(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GeneralConfig {
    /// Options from the config file, overridden by the command line
    pub fn options(&self) -> anyhow::Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::from_toml_file(path)?,
            None => Options::default(),
        };
        if let Some(regions) = self.regions {
            options.regions = regions;
        }
        if let Some(out) = &self.out {
            options.output_dir = out.clone();
        }
        if let Some(jar) = &self.keymaera {
            options.keymaera.keymaera_jar = jar.clone();
        }
        if let Some(timeout) = self.timeout {
            options.keymaera.hard_timeout_secs = timeout;
        }
        options.verbosity_level = match self.verbose {
            0 => options.verbosity_level,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        Ok(options)
    }
}

pub fn execute(files: &[PathBuf], target: Target, options: &Options) -> anyhow::Result<Report> {
    let model = load_model(files)?;
    let backend: Box<dyn ProverBackend> = if options.keymaera.is_configured() {
        Box::new(KeymaeraBackend::new(options.keymaera.clone()))
    } else {
        info!("no KeYmaera X jar given, obligations are generated only");
        Box::new(NoBackend)
    };
    info!("writing obligations to {}", options.output_dir.display());
    Driver::new(&model, options, backend.as_ref()).run(&target)
}
