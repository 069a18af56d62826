// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use chisel::prove::{execute, GeneralConfig, TargetConfig};
use clap::*;
use colored::Colorize;
use log::debug;
use simplelog::{ConfigBuilder, LevelFilter, SimpleLogger};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = env!("CARGO_BIN_NAME"),
    about = "Generates differential dynamic logic proof obligations for hybrid active-object models and checks them with KeYmaera X",
    rename_all = "kebab-case",
    author,
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Args {
    /// Model files (JSON) produced by the front end
    #[clap(required = true)]
    pub files: Vec<PathBuf>,

    #[clap(flatten)]
    pub target_config: TargetConfig,

    #[clap(flatten)]
    pub general_config: GeneralConfig,
}

fn run(args: Args) -> anyhow::Result<bool> {
    let target = args.target_config.target()?;
    let options = args.general_config.options()?;
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    // fails only if a logger is already installed
    let _ = SimpleLogger::init(options.verbosity_level, config);
    debug!("Chisel CLI version: {}", env!("CARGO_PKG_VERSION"));

    let report = execute(&args.files, target, &options)?;
    println!("{report}");
    Ok(report.is_success())
}

fn main() {
    #[cfg(windows)]
    let _ = colored::control::set_virtual_terminal(true);

    match run(Args::parse()) {
        Ok(true) => (),
        Ok(false) => std::process::exit(1),
        Err(err) => {
            let err = format!("{:?}", err);
            println!("{}", err.bold().red());
            std::process::exit(1);
        }
    }
}
