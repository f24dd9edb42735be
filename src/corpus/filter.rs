use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use super::document::Document;

/// Publication year selection.
///
/// Format: "<N", "<=N", ">N", ">=N", "N-M" (inclusive) or a single year "N".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearRange {
    Before(i32),
    UpTo(i32),
    After(i32),
    From(i32),
    Exactly(i32),
    Between(i32, i32),
}

impl YearRange {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let range = if let Some(val) = s.strip_prefix(">=") {
            YearRange::From(val.trim().parse()?)
        } else if let Some(val) = s.strip_prefix("<=") {
            YearRange::UpTo(val.trim().parse()?)
        } else if let Some(val) = s.strip_prefix('>') {
            YearRange::After(val.trim().parse()?)
        } else if let Some(val) = s.strip_prefix('<') {
            YearRange::Before(val.trim().parse()?)
        } else if let Some((low, high)) = s.split_once('-') {
            let low: i32 = low.trim().parse()?;
            let high: i32 = high.trim().parse()?;
            if low > high {
                bail!("Year range {} starts after it ends", s)
            }
            YearRange::Between(low, high)
        } else {
            YearRange::Exactly(s.parse()?)
        };
        Ok(range)
    }

    pub fn matches(&self, year: i32) -> bool {
        match *self {
            YearRange::Before(n) => year < n,
            YearRange::UpTo(n) => year <= n,
            YearRange::After(n) => year > n,
            YearRange::From(n) => year >= n,
            YearRange::Exactly(n) => year == n,
            YearRange::Between(low, high) => (low..=high).contains(&year),
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearRange::Before(n) => write!(f, "<{}", n),
            YearRange::UpTo(n) => write!(f, "<={}", n),
            YearRange::After(n) => write!(f, ">{}", n),
            YearRange::From(n) => write!(f, ">={}", n),
            YearRange::Exactly(n) => write!(f, "{}", n),
            YearRange::Between(low, high) => write!(f, "{}-{}", low, high),
        }
    }
}

/// Which documents to keep after normalization.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Document types to keep, compared case-insensitively. `None` keeps all.
    pub document_types: Option<Vec<String>>,
    pub years: Option<YearRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub before: usize,
    pub after: usize,
}

impl DocumentFilter {
    pub fn is_empty(&self) -> bool {
        self.document_types.is_none() && self.years.is_none()
    }

    pub fn matches(&self, document: &Document) -> bool {
        let type_ok = self.document_types.as_ref().map_or(true, |types| {
            types
                .iter()
                .any(|t| t.trim().eq_ignore_ascii_case(&document.document_type))
        });
        let year_ok = self.years.map_or(true, |range| range.matches(document.year));
        type_ok && year_ok
    }

    /// Keep matching documents, preserving order.
    pub fn apply(&self, documents: Vec<Document>) -> (Vec<Document>, FilterReport) {
        let before = documents.len();
        let kept: Vec<Document> = documents.into_iter().filter(|d| self.matches(d)).collect();
        let report = FilterReport {
            before,
            after: kept.len(),
        };
        if !self.is_empty() {
            info!(before = report.before, after = report.after, "applied document filter");
        }
        (kept, report)
    }
}

/// Summary of a normalized corpus for the `inspect` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusSummary {
    pub documents: usize,
    pub document_types: BTreeMap<String, usize>,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub distinct_authors: usize,
}

pub fn summarize(documents: &[Document]) -> CorpusSummary {
    let mut document_types = BTreeMap::new();
    let mut authors = std::collections::HashSet::new();
    for document in documents {
        *document_types.entry(document.document_type.clone()).or_insert(0) += 1;
        authors.extend(document.author_ids().iter().copied());
    }
    CorpusSummary {
        documents: documents.len(),
        document_types,
        first_year: documents.iter().map(|d| d.year).min(),
        last_year: documents.iter().map(|d| d.year).max(),
        distinct_authors: authors.len(),
    }
}
