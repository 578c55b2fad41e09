//! Proposal entries returned to the editor and the sorted sets used to
//! assemble them.

use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What a proposal label denotes. Editors typically map this to an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ProposalKind {
    Keyword,
    Schema,
    Table,
    View,
    Column,
    /// Stored procedure or stored function.
    Routine,
    /// Built-in runtime function or UDF; labels carry a trailing `()`.
    Function,
    Trigger,
    Event,
    Engine,
    LogfileGroup,
    Tablespace,
    Charset,
    Collation,
    SystemVar,
    UserVar,
}

/// One completion proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEntry {
    pub kind: ProposalKind,
    pub label: String,
}

impl ProposalEntry {
    pub fn new(kind: ProposalKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

/// Case-insensitive label comparison used for ordering and deduplication.
pub(crate) fn compare_labels(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// A proposal group kept sorted by case-insensitive label.
///
/// Labels that collide case-insensitively are collapsed; the first entry
/// seen wins, so insertion order decides casing ties.
#[derive(Debug, Default)]
pub struct CompletionSet {
    entries: Vec<ProposalEntry>,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ProposalKind, label: impl Into<String>) {
        let label = label.into();
        match self
            .entries
            .binary_search_by(|entry| compare_labels(&entry.label, &label))
        {
            Ok(_) => {}
            Err(pos) => self.entries.insert(pos, ProposalEntry { kind, label }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends the sorted entries to an output list.
    pub fn drain_into(self, out: &mut Vec<ProposalEntry>) {
        out.extend(self.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_case_insensitive_order() {
        let mut set = CompletionSet::new();
        set.insert(ProposalKind::Table, "Orders");
        set.insert(ProposalKind::Table, "account");
        set.insert(ProposalKind::Table, "Billing");

        let mut out = Vec::new();
        set.drain_into(&mut out);
        let labels: Vec<_> = out.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["account", "Billing", "Orders"]);
    }

    #[test]
    fn first_seen_wins_on_case_ties() {
        let mut set = CompletionSet::new();
        set.insert(ProposalKind::Column, "Id");
        set.insert(ProposalKind::Column, "id");
        set.insert(ProposalKind::Column, "ID");

        let mut out = Vec::new();
        set.drain_into(&mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "Id");
    }
}
