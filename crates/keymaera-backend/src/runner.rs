// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The prover runs in its own process group, so that a timeout also takes
//! down the helper processes it forks.

use std::io::{Error, ErrorKind, Result};
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[derive(Debug)]
pub enum RunOutcome {
    Finished(Output),
    /// The process group was killed after the timeout elapsed
    TimedOut,
}

/// Run `args[0]` with the remaining arguments, capturing its output.
/// Without a timeout the call blocks until the process exits.
pub fn run_isolated(args: &[String], timeout: Option<Duration>) -> Result<RunOutcome> {
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "empty command line"))?;
    let mut command = Command::new(program);
    command.args(rest).stdout(Stdio::piped()).stderr(Stdio::piped());
    new_process_group(&mut command);
    let child = command.spawn()?;

    let Some(timeout) = timeout else {
        return child.wait_with_output().map(RunOutcome::Finished);
    };
    let pid = child.id();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(child.wait_with_output());
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result.map(RunOutcome::Finished),
        Err(_) => {
            kill_process_group(pid);
            Ok(RunOutcome::TimedOut)
        }
    }
}

#[cfg(unix)]
fn new_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;
    let _ = signal::killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
}

#[cfg(windows)]
fn new_process_group(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;
    command.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

#[cfg(windows)]
fn kill_process_group(pid: u32) {
    let _ = Command::new("taskkill")
        .args(["/F", "/T", "/PID", &pid.to_string()])
        .output();
}
