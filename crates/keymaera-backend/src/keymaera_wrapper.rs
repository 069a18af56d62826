// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::options::KeymaeraOptions;
use crate::runner::{run_isolated, RunOutcome};
use crate::{ProverBackend, Verdict};
use itertools::Itertools;
use log::{debug, info, warn};
use std::path::Path;
use std::time::Duration;

/// Runs the KeYmaera X jar on each submitted artifact.
pub struct KeymaeraBackend {
    pub options: KeymaeraOptions,
}

impl KeymaeraBackend {
    pub fn new(options: KeymaeraOptions) -> Self {
        Self { options }
    }

    fn call_keymaera(&self, artifact: &Path) -> std::io::Result<RunOutcome> {
        let args = self.options.get_keymaera_command(artifact);
        info!("running KeYmaera X on {}", artifact.display());
        debug!("command line: {}", args.iter().join(" "));
        let timeout = (self.options.hard_timeout_secs > 0).then(|| Duration::from_secs(self.options.hard_timeout_secs));
        run_isolated(&args, timeout)
    }
}

/// `Proved` iff the second-to-last line of the prover output reports `PROVED`.
pub fn parse_verdict(stdout: &str) -> Verdict {
    let lines = stdout.lines().collect::<Vec<_>>();
    match lines.len().checked_sub(2).map(|i| lines[i]) {
        Some(line) if line.trim_start().starts_with("PROVED") => Verdict::Proved,
        _ => Verdict::NotProved,
    }
}

impl ProverBackend for KeymaeraBackend {
    fn submit(&self, artifact: &Path) -> Verdict {
        if !self.options.is_configured() {
            warn!("no KeYmaera X jar configured, {} is not checked", artifact.display());
            return Verdict::Unavailable;
        }
        let output = match self.call_keymaera(artifact) {
            Ok(RunOutcome::Finished(output)) => output,
            Ok(RunOutcome::TimedOut) => {
                warn!(
                    "KeYmaera X exceeded hard timeout of {}s on {}",
                    self.options.hard_timeout_secs,
                    artifact.display()
                );
                return Verdict::NotProved;
            }
            Err(err) => {
                warn!("cannot execute KeYmaera X: {err}");
                return Verdict::NotProved;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if self.options.keep_logs {
            let log_file = self.options.get_keymaera_log_file(artifact);
            debug!("writing prover log to {log_file}");
            let stderr = String::from_utf8_lossy(&output.stderr);
            if let Err(err) = std::fs::write(&log_file, format!("{stdout}{stderr}")) {
                warn!("cannot write {log_file}: {err}");
            }
        }
        if !output.status.success() {
            warn!("KeYmaera X exited with {} on {}", output.status, artifact.display());
            return Verdict::NotProved;
        }
        parse_verdict(&stdout)
    }
}
