//! Roster Index: resolves free-text names to publicador ids
//!
//! The roster is a read-only list of `{id, nome}` entries supplied by the
//! caller (loaded from a JSON file in the service, built from fixtures in
//! tests). It is never mutated after construction, so a single instance can
//! be shared across concurrent imports behind an `Arc`.
//!
//! # Matching
//! 1. Case-insensitive exact match on the trimmed name
//! 2. Case-insensitive substring match in either direction; first entry in
//!    roster order wins
//!
//! Matching is exposed through [`NameMatcher`] so a stricter strategy
//! ([`SimilarityMatcher`]) can be swapped in without touching the cleaners.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// One known publicador
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Stable identifier owned by the roster provider
    pub id: String,
    /// Display name
    pub nome: String,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, nome: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nome: nome.into(),
        }
    }
}

/// Name → roster entry resolution strategy
pub trait NameMatcher: Send + Sync {
    /// Resolve a free-text name, `None` when nothing matches
    fn find_by_name(&self, nome: &str) -> Option<&RosterEntry>;

    /// Exact id lookup, used to recognise values that are already resolved
    fn find_by_id(&self, id: &str) -> Option<&RosterEntry>;
}

/// Trim and case-fold a name for comparison
fn fold(nome: &str) -> String {
    nome.trim().to_lowercase()
}

fn check_ids(entries: &[RosterEntry]) -> Result<()> {
    let mut seen = HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        let id = entry.id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput(format!("roster entry {} has a blank id", i)));
        }
        if !seen.insert(id) {
            return Err(Error::InvalidInput(format!("duplicate roster id '{}'", id)));
        }
    }
    Ok(())
}

/// Default substring-based roster index
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    entries: Vec<RosterEntry>,
    /// Folded names, parallel to `entries`
    folded: Vec<String>,
}

impl RosterIndex {
    /// Build an index over the given entries (order is significant for ties)
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        let folded = entries.iter().map(|e| fold(&e.nome)).collect();
        Self { entries, folded }
    }

    /// Parse a JSON array of `{"id": ..., "nome": ...}` objects
    ///
    /// Ids must be non-blank and unique, otherwise resolved references would
    /// be ambiguous.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<RosterEntry> = serde_json::from_str(json)?;
        check_ids(&entries)?;
        Ok(Self::new(entries))
    }

    /// Load the roster from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let index = Self::from_json_str(&content)?;
        info!(path = %path.display(), entries = index.len(), "Roster loaded");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive exact match only
    pub fn find_exact(&self, nome: &str) -> Option<&RosterEntry> {
        let query = fold(nome);
        if query.is_empty() {
            return None;
        }
        self.folded
            .iter()
            .position(|n| *n == query)
            .map(|i| &self.entries[i])
    }
}

impl NameMatcher for RosterIndex {
    fn find_by_name(&self, nome: &str) -> Option<&RosterEntry> {
        let query = fold(nome);
        if query.is_empty() {
            return None;
        }

        if let Some(entry) = self.find_exact(&query) {
            return Some(entry);
        }

        // Substring in either direction, first in roster order.
        // "Célio" vs "Célio Horn" is resolved purely by declaration order.
        let found = self
            .folded
            .iter()
            .position(|n| !n.is_empty() && (n.contains(&query) || query.contains(n.as_str())))
            .map(|i| &self.entries[i]);

        if let Some(entry) = found {
            debug!(query = %nome, matched = %entry.nome, "Roster substring match");
        }
        found
    }

    fn find_by_id(&self, id: &str) -> Option<&RosterEntry> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        self.entries.iter().find(|e| e.id == id)
    }
}

/// Stricter matcher: exact match, then best normalized Levenshtein score
///
/// Candidates scoring below `threshold` are rejected, so partial names that
/// only share a substring no longer resolve.
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    roster: RosterIndex,
    threshold: f64,
}

impl SimilarityMatcher {
    /// Default similarity threshold
    pub const DEFAULT_THRESHOLD: f64 = 0.85;

    pub fn new(roster: RosterIndex) -> Self {
        Self::with_threshold(roster, Self::DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(roster: RosterIndex, threshold: f64) -> Self {
        Self {
            roster,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }
}

impl NameMatcher for SimilarityMatcher {
    fn find_by_name(&self, nome: &str) -> Option<&RosterEntry> {
        let query = fold(nome);
        if query.is_empty() {
            return None;
        }
        if let Some(entry) = self.roster.find_exact(&query) {
            return Some(entry);
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in self.roster.folded.iter().enumerate() {
            let score = strsim::normalized_levenshtein(&query, candidate);
            if score < self.threshold {
                continue;
            }
            // Strictly greater keeps the first entry on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        best.map(|(i, score)| {
            let entry = &self.roster.entries[i];
            debug!(query = %nome, matched = %entry.nome, score, "Roster similarity match");
            entry
        })
    }

    fn find_by_id(&self, id: &str) -> Option<&RosterEntry> {
        self.roster.find_by_id(id)
    }
}
