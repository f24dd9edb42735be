use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::schema::Schema;

/// One row of the researcher list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearcherEntry {
    pub id: u64,
    /// Remaining columns of the row, unchanged.
    pub passthrough: Vec<String>,
}

/// Drop repeated IDs, keeping the first occurrence and the original order.
pub fn dedup_researchers(entries: Vec<ResearcherEntry>) -> Vec<ResearcherEntry> {
    let mut seen = HashSet::new();
    let before = entries.len();
    let unique: Vec<ResearcherEntry> = entries.into_iter().filter(|e| seen.insert(e.id)).collect();
    if unique.len() != before {
        debug!(removed = before - unique.len(), "dropped repeated researcher IDs");
    }
    unique
}

/// Metrics for one researcher over the annotated corpus.
///
/// Ratio metrics are `None` when they have no data: a researcher with no
/// documents, or (for `collaboration_index`) no multi-author documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearcherMetrics {
    pub id: u64,
    #[serde(skip)]
    pub passthrough: Vec<String>,
    pub whole_fullcount: usize,
    pub straight_firstauthor: usize,
    pub straight_lastauthor: usize,
    /// Summed credit per applied schema; 0 when the researcher never appears.
    pub schema_credits: BTreeMap<Schema, f64>,
    pub first_last_author_proportion: Option<f64>,
    pub single_author_publications: usize,
    pub degree_of_collaboration: Option<f64>,
    pub collaboration_index: Option<f64>,
    pub collaboration_coefficient: Option<f64>,
    pub number_of_unique_coauthors: usize,
}

impl ResearcherMetrics {
    pub fn credit(&self, schema: Schema) -> Option<f64> {
        self.schema_credits.get(&schema).copied()
    }

    pub fn has_documents(&self) -> bool {
        self.whole_fullcount > 0
    }
}
