// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

pub mod driver;
pub mod options;
pub mod prove;

pub use driver::{Driver, Outcome, Report, Target};
pub use options::Options;
