//! Ordered priority tiers. The first tier is solved first and gets first pick
//! of every unit.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIERS: [&str; 4] = ["Immediate", "Urgent", "Routine", "Non-Urgent"];

/// Position of a tier in its [TierList]; lower is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierIndex(pub usize);

/// Normalize a priority label for lookup: lowercase, collapse spaces, `_` and `-`.
/// `"NON URGENT"`, `"non_urgent"` and `"Non-Urgent"` all become `"non_urgent"`.
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierList {
    labels: Vec<String>,
}

impl Default for TierList {
    fn default() -> Self {
        Self::new(DEFAULT_TIERS.iter().map(|label| label.to_string()).collect())
    }
}

impl TierList {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, tier: TierIndex) -> &str {
        self.labels.get(tier.0).map(String::as_str).unwrap_or("unknown")
    }

    /// Resolve a priority label against the list, ignoring case and separators.
    pub fn resolve(&self, label: &str) -> Option<TierIndex> {
        let wanted = normalize_label(label);
        self.labels
            .iter()
            .position(|candidate| normalize_label(candidate) == wanted)
            .map(TierIndex)
    }

    /// Tiers in solve order.
    pub fn iter(&self) -> impl Iterator<Item = (TierIndex, &str)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(index, label)| (TierIndex(index), label.as_str()))
    }
}
