// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::data::formula::Formula;
use crate::data::CallSet;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Token standing for an evolution-domain formula that is not yet known
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaceholderId(usize);

impl PlaceholderId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }
}

impl Display for PlaceholderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ph{}", self.0)
    }
}

/// What is known at a suspension point when its placeholder is minted
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderEntry {
    /// The condition the suspension waits for (`true` for a blocking read)
    pub guard: Formula,
    /// Self-calls guaranteed to be pending when the suspension is reached
    pub calls: CallSet,
    /// `get` on a future rather than an explicit `await`
    pub blocking_read: bool,
}

/// Placeholders of one obligation, minted by a local counter
#[derive(Debug, Default)]
pub struct PlaceholderMap {
    next: usize,
    entries: BTreeMap<PlaceholderId, PlaceholderEntry>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, entry: PlaceholderEntry) -> PlaceholderId {
        let id = PlaceholderId(self.next);
        self.next += 1;
        self.entries.insert(id, entry);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlaceholderId, &PlaceholderEntry)> {
        self.entries.iter()
    }

    /// Resolve every entry exactly once with `resolve`
    pub fn resolve_with<F>(self, mut resolve: F) -> anyhow::Result<BTreeMap<PlaceholderId, Formula>>
    where
        F: FnMut(&PlaceholderEntry) -> anyhow::Result<Formula>,
    {
        self.entries
            .into_iter()
            .map(|(id, entry)| Ok((id, resolve(&entry)?)))
            .collect()
    }
}
