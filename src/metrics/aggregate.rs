use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

use super::researcher::{ResearcherEntry, ResearcherMetrics};
use crate::annotate::{AnnotatedCorpus, AnnotatedDocument};
use crate::schema::Schema;

/// Compute metrics for every researcher, in list order.
///
/// The list should already be deduplicated. Each researcher is computed
/// independently from a read-only index of the documents they appear on.
pub fn aggregate_researchers(researchers: &[ResearcherEntry], corpus: &AnnotatedCorpus) -> Vec<ResearcherMetrics> {
    let index = index_by_author(researchers, corpus);
    let empty = Vec::new();

    let metrics: Vec<ResearcherMetrics> = researchers
        .par_iter()
        .map(|entry| {
            let documents: Vec<&AnnotatedDocument> = index
                .get(&entry.id)
                .unwrap_or(&empty)
                .iter()
                .map(|&idx| &corpus.documents()[idx])
                .collect();
            let mut metrics = aggregate_researcher(entry.id, &documents, corpus.schemas());
            metrics.passthrough = entry.passthrough.clone();
            metrics
        })
        .collect();

    let found = metrics.iter().filter(|m| m.has_documents()).count();
    info!(researchers = metrics.len(), with_documents = found, "aggregated researcher metrics");
    metrics
}

// Document indices per target researcher, in corpus order.
fn index_by_author(researchers: &[ResearcherEntry], corpus: &AnnotatedCorpus) -> HashMap<u64, Vec<usize>> {
    let targets: HashSet<u64> = researchers.iter().map(|e| e.id).collect();
    let mut index: HashMap<u64, Vec<usize>> = HashMap::new();
    for (idx, annotated) in corpus.documents().iter().enumerate() {
        let mut on_byline: Vec<u64> = annotated
            .document
            .author_ids()
            .iter()
            .copied()
            .filter(|id| targets.contains(id))
            .collect();
        on_byline.sort_unstable();
        on_byline.dedup();
        for id in on_byline {
            index.entry(id).or_default().push(idx);
        }
    }
    index
}

/// Metrics for one researcher from the documents whose byline includes them.
///
/// `documents` must contain only documents listing `id`; `schemas` are the
/// schemas to sum credit for.
pub fn aggregate_researcher(id: u64, documents: &[&AnnotatedDocument], schemas: &[Schema]) -> ResearcherMetrics {
    let whole = documents.len();
    let first = documents
        .iter()
        .filter(|d| d.document.first_author() == id)
        .count();
    let last = documents
        .iter()
        .filter(|d| d.document.last_author() == Some(id))
        .count();
    let single = documents
        .iter()
        .filter(|d| d.document.is_single_authored())
        .count();

    let schema_credits: BTreeMap<Schema, f64> = schemas
        .iter()
        .map(|&schema| {
            let contributions = documents
                .iter()
                .filter_map(|d| d.author_credit(schema, id))
                .collect();
            (schema, order_independent_sum(contributions))
        })
        .collect();

    let equal_share = order_independent_sum(
        documents
            .iter()
            .map(|d| {
                let positions = d.document.author_ids().iter().filter(|&&a| a == id).count();
                positions as f64 / d.document.author_count() as f64
            })
            .collect(),
    );

    let multi_author_counts: Vec<usize> = documents
        .iter()
        .map(|d| d.document.author_count())
        .filter(|&n| n > 1)
        .collect();
    let collaboration_index = if multi_author_counts.is_empty() {
        None
    } else {
        Some(multi_author_counts.iter().sum::<usize>() as f64 / multi_author_counts.len() as f64)
    };

    let coauthors: HashSet<u64> = documents
        .iter()
        .flat_map(|d| d.document.author_ids().iter().copied())
        .collect();

    let ratio = |numerator: f64| (whole > 0).then(|| numerator / whole as f64);

    if whole == 0 {
        debug!(researcher = id, "researcher has no documents in the corpus");
    }

    ResearcherMetrics {
        id,
        passthrough: Vec::new(),
        whole_fullcount: whole,
        straight_firstauthor: first,
        straight_lastauthor: last,
        schema_credits,
        first_last_author_proportion: ratio((first + last) as f64),
        single_author_publications: single,
        degree_of_collaboration: ratio((whole - single) as f64),
        collaboration_index,
        collaboration_coefficient: ratio(equal_share).map(|share| 1.0 - share),
        number_of_unique_coauthors: coauthors.len().saturating_sub(1),
    }
}

// Float addition is not associative; summing in sorted order makes the
// result independent of document order.
fn order_independent_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    // `Sum` for f64 starts at -0.0; an author with no documents must print 0.
    values.iter().fold(0.0, |acc, v| acc + v)
}
