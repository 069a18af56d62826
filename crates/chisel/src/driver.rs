// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Batch driver: generates the obligations of a run target, writes them to
//! the output directory and submits them to the prover backend.

use crate::options::Options;
use colored::Colorize;
use hybrid_dl::{
    init_obligation, main_block_obligation, method_obligation, zeno_obligations, ClassAnalyzer, Obligation,
};
use hybrid_model::{ClassDecl, MethodImpl, Model, ModelError};
use keymaera_backend::{ProverBackend, Verdict};
use log::{debug, error, info, warn};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// What a single run verifies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `<module>.<class>.<method>`
    Method(String),
    /// Initializer of `<module>.<class>`
    Init(String),
    /// Initializer and all methods of `<module>.<class>`
    Class(String),
    /// Zeno-freedom of `<module>.<class>`
    Zeno(String),
    Main,
    /// Every class of every user module, then the main block
    Full,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub name: String,
    pub verdict: Verdict,
    /// Where the artifact was written; `None` for trivial or failed obligations
    pub artifact: Option<PathBuf>,
}

/// Verdicts of all obligations of a run
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
}

impl Report {
    /// Conjunction of all verdicts; only `proved` counts
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.verdict.is_proved())
    }

    fn push(&mut self, name: String, verdict: Verdict, artifact: Option<PathBuf>) {
        info!("verification result for {name}: {verdict}");
        self.outcomes.push(Outcome { name, verdict, artifact });
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for outcome in &self.outcomes {
            let verdict = match outcome.verdict {
                Verdict::Proved => outcome.verdict.to_string().green(),
                Verdict::NotProved => outcome.verdict.to_string().red(),
                Verdict::Unavailable => outcome.verdict.to_string().yellow(),
            };
            writeln!(f, "{}: {}", outcome.name, verdict)?;
        }
        let summary = if self.is_success() {
            "all obligations proved".green()
        } else {
            "some obligations are not proved".red()
        };
        write!(f, "{}", summary.bold())
    }
}

pub struct Driver<'a> {
    model: &'a Model,
    options: &'a Options,
    backend: &'a dyn ProverBackend,
}

impl<'a> Driver<'a> {
    pub fn new(model: &'a Model, options: &'a Options, backend: &'a dyn ProverBackend) -> Self {
        Self { model, options, backend }
    }

    /// Lookup failures abort the run; failures of a single obligation are
    /// logged and make its verdict `not proved`.
    pub fn run(&self, target: &Target) -> anyhow::Result<Report> {
        let mut report = Report::default();
        match target {
            Target::Method(path) => {
                let (class, method) = self.model.find_method(path)?;
                let analyzer = self.analyzer(class)?;
                self.check_method(&analyzer, method, &mut report);
            }
            Target::Init(path) => {
                let analyzer = self.analyzer(self.model.find_class(path)?)?;
                self.check_init(&analyzer, &mut report);
            }
            Target::Class(path) => {
                let analyzer = self.analyzer(self.model.find_class(path)?)?;
                self.check_class(&analyzer, &mut report);
            }
            Target::Zeno(path) => {
                let analyzer = self.analyzer(self.model.find_class(path)?)?;
                self.check_zeno(&analyzer, &mut report);
            }
            Target::Main => {
                if self.model.main_block().is_none() {
                    return Err(ModelError::NoMainBlock.into());
                }
                self.check_main(&mut report);
            }
            Target::Full => self.check_full(&mut report),
        }
        Ok(report)
    }

    fn analyzer(&self, class: &'a ClassDecl) -> anyhow::Result<ClassAnalyzer<'a>> {
        ClassAnalyzer::new(self.model, class, self.options.regions)
    }

    fn check_full(&self, report: &mut Report) {
        for module in self.model.user_modules() {
            for class in &module.classes {
                if !class.is_physical() {
                    warn!("skipping discrete class {}.{}", module.name, class.name);
                    continue;
                }
                match self.analyzer(class) {
                    Ok(analyzer) => self.check_class(&analyzer, report),
                    Err(err) => {
                        error!("cannot analyze class {}.{}: {err:#}", module.name, class.name);
                        report.push(format!("{}.{}", module.name, class.name), Verdict::NotProved, None);
                    }
                }
            }
        }
        if self.model.main_block().is_some() {
            self.check_main(report);
        } else {
            warn!("model contains no main block");
        }
    }

    fn check_class(&self, analyzer: &ClassAnalyzer<'_>, report: &mut Report) {
        self.check_init(analyzer, report);
        for method in &analyzer.class().methods {
            self.check_method(analyzer, method, report);
        }
    }

    fn check_init(&self, analyzer: &ClassAnalyzer<'_>, report: &mut Report) {
        let name = format!("{}.<init>", analyzer.class().name);
        self.check(name, init_obligation(analyzer), report);
    }

    fn check_method(&self, analyzer: &ClassAnalyzer<'_>, method: &MethodImpl, report: &mut Report) {
        let name = format!("{}.{}", analyzer.class().name, method.sig.name);
        self.check(name, method_obligation(analyzer, method), report);
    }

    fn check_main(&self, report: &mut Report) {
        self.check("<main>".to_string(), main_block_obligation(self.model), report);
    }

    fn check_zeno(&self, analyzer: &ClassAnalyzer<'_>, report: &mut Report) {
        let class = &analyzer.class().name;
        let check = match zeno_obligations(analyzer) {
            Ok(check) => check,
            Err(err) => {
                error!("cannot generate Zeno obligations for {class}: {err:#}");
                report.push(format!("{class}.<zeno>"), Verdict::NotProved, None);
                return;
            }
        };
        if check.is_violated() {
            error!(
                "{class} is not Zeno-free: {} change the state outside of controllers",
                check.violations.join(", ")
            );
            report.push(format!("{class}.<zeno>"), Verdict::NotProved, None);
        }
        for obligation in check.obligations {
            let name = obligation.qualified_name();
            self.check(name, Ok(obligation), report);
        }
    }

    fn check(&self, name: String, obligation: anyhow::Result<Obligation>, report: &mut Report) {
        match obligation.and_then(|o| self.discharge(o)) {
            Ok((verdict, artifact)) => report.push(name, verdict, artifact),
            Err(err) => {
                error!("cannot generate the obligation for {name}: {err:#}");
                report.push(name, Verdict::NotProved, None);
            }
        }
    }

    /// Write the artifact and hand it to the backend. Obligations without an
    /// artifact hold trivially.
    fn discharge(&self, obligation: Obligation) -> anyhow::Result<(Verdict, Option<PathBuf>)> {
        let Some(artifact) = &obligation.artifact else {
            return Ok((Verdict::Proved, None));
        };
        let path = self.options.output_dir.join(obligation.relative_path());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, artifact.render()?)?;
        debug!("wrote {}", path.display());
        Ok((self.backend.submit(&path), Some(path)))
    }
}
