use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

use super::document::{Document, DocumentMeta};
use super::record::{non_empty, RawRecord};

/// Why a single record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid author ID '{token}' at position {position}")]
    InvalidAuthorId { token: String, position: usize },

    #[error("invalid year '{0}'")]
    InvalidYear(String),

    #[error("author ID list is empty")]
    EmptyAuthorList,
}

/// Record counts from one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub total: usize,
    pub retained: usize,
    pub missing_fields: usize,
    pub duplicates: usize,
    pub parse_failures: usize,
}

impl NormalizeReport {
    pub fn dropped(&self) -> usize {
        self.total - self.retained
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedCorpus {
    pub documents: Vec<Document>,
    pub report: NormalizeReport,
}

/// Split an author-ID field into integers, keeping byline order.
///
/// A single trailing delimiter is tolerated (`"1;2;"`); any other empty or
/// non-integer token rejects the whole field.
pub fn parse_author_ids(field: &str, delimiter: &str) -> Result<Vec<u64>, RecordError> {
    let field = field.trim();
    let field = field.strip_suffix(delimiter).unwrap_or(field);
    if field.trim().is_empty() {
        return Err(RecordError::EmptyAuthorList);
    }

    field
        .split(delimiter)
        .enumerate()
        .map(|(position, token)| {
            let token = token.trim();
            token.parse::<u64>().map_err(|_| RecordError::InvalidAuthorId {
                token: token.to_string(),
                position,
            })
        })
        .collect()
}

/// Turn one raw record into a document.
pub fn normalize_record(record: &RawRecord, delimiter: &str) -> Result<Document, RecordError> {
    let ids_field = non_empty(&record.author_ids).ok_or(RecordError::MissingField("author_ids"))?;
    let document_type =
        non_empty(&record.document_type).ok_or(RecordError::MissingField("document_type"))?;
    let year_field = non_empty(&record.year).ok_or(RecordError::MissingField("year"))?;

    let author_ids = parse_author_ids(ids_field, delimiter)?;
    let year = year_field
        .parse::<i32>()
        .map_err(|_| RecordError::InvalidYear(year_field.to_string()))?;

    let meta = DocumentMeta {
        eid: non_empty(&record.eid).map(str::to_string),
        title: non_empty(&record.title).map(str::to_string),
        source_title: non_empty(&record.source_title).map(str::to_string),
        authors: non_empty(&record.authors).map(str::to_string),
        author_full_names: non_empty(&record.author_full_names).map(str::to_string),
    };

    Document::new(author_ids, document_type.to_string(), year, meta).ok_or(RecordError::EmptyAuthorList)
}

fn has_required_fields(record: &RawRecord) -> bool {
    non_empty(&record.author_ids).is_some()
        && non_empty(&record.document_type).is_some()
        && non_empty(&record.year).is_some()
}

/// Filter, deduplicate and parse a whole corpus.
///
/// Records missing a required field are dropped first, then duplicates after
/// the first occurrence, then records whose IDs or year fail to parse.
/// Document order follows record order.
pub fn normalize_corpus(records: Vec<RawRecord>, delimiter: &str) -> NormalizedCorpus {
    let mut report = NormalizeReport {
        total: records.len(),
        ..Default::default()
    };

    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for (row, record) in records.into_iter().enumerate() {
        if !has_required_fields(&record) {
            debug!(row, "dropping record with missing required field");
            report.missing_fields += 1;
            continue;
        }
        if !seen.insert(record.dedup_key()) {
            debug!(row, "dropping duplicate record");
            report.duplicates += 1;
            continue;
        }
        unique.push((row, record));
    }

    let parsed: Vec<_> = unique
        .par_iter()
        .map(|(row, record)| (*row, normalize_record(record, delimiter)))
        .collect();

    let mut documents = Vec::with_capacity(parsed.len());
    for (row, result) in parsed {
        match result {
            Ok(document) => documents.push(document),
            Err(e) => {
                debug!(row, error = %e, "dropping unparseable record");
                report.parse_failures += 1;
            }
        }
    }
    report.retained = documents.len();

    info!(
        total = report.total,
        retained = report.retained,
        missing = report.missing_fields,
        duplicates = report.duplicates,
        unparseable = report.parse_failures,
        "normalized corpus"
    );

    NormalizedCorpus { documents, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ids: &str, doc_type: &str, year: &str, title: &str) -> RawRecord {
        RawRecord {
            author_ids: Some(ids.to_string()),
            document_type: Some(doc_type.to_string()),
            year: Some(year.to_string()),
            title: Some(title.to_string()),
            source_title: Some("Journal".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_author_ids_keeps_order() {
        assert_eq!(parse_author_ids("30; 10;20", ";").unwrap(), vec![30, 10, 20]);
    }

    #[test]
    fn test_parse_author_ids_trailing_delimiter() {
        assert_eq!(parse_author_ids("57194541600;7004138211;", ";").unwrap(), vec![57194541600, 7004138211]);
    }

    #[test]
    fn test_parse_author_ids_rejects_bad_token() {
        let err = parse_author_ids("1;abc;3", ";").unwrap_err();
        assert_eq!(
            err,
            RecordError::InvalidAuthorId {
                token: "abc".to_string(),
                position: 1
            }
        );
    }

    #[test]
    fn test_parse_author_ids_rejects_inner_empty_token() {
        assert!(matches!(
            parse_author_ids("1;;3", ";"),
            Err(RecordError::InvalidAuthorId { position: 1, .. })
        ));
    }

    #[test]
    fn test_parse_author_ids_empty() {
        assert_eq!(parse_author_ids(";", ";").unwrap_err(), RecordError::EmptyAuthorList);
    }

    #[test]
    fn test_parse_author_ids_custom_delimiter() {
        assert_eq!(parse_author_ids("1|2", "|").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_normalize_record() {
        let doc = normalize_record(&record("1;2;3", "Article", "2021", "T"), ";").unwrap();
        assert_eq!(doc.author_ids(), &[1, 2, 3]);
        assert_eq!(doc.year, 2021);
        assert_eq!(doc.document_type, "Article");
        assert_eq!(doc.meta.title.as_deref(), Some("T"));
    }

    #[test]
    fn test_normalize_record_missing_year() {
        let err = normalize_record(&record("1", "Article", " ", "T"), ";").unwrap_err();
        assert_eq!(err, RecordError::MissingField("year"));
    }

    #[test]
    fn test_normalize_record_invalid_year() {
        let err = normalize_record(&record("1", "Article", "20x0", "T"), ";").unwrap_err();
        assert_eq!(err, RecordError::InvalidYear("20x0".to_string()));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let doc = normalize_record(&record("5;6", "Review", "2019", "T"), ";").unwrap();
        let again = normalize_record(&doc.to_record(";"), ";").unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_normalize_corpus_counts() {
        let mut missing_type = record("9", "", "2020", "C");
        missing_type.document_type = None;
        let records = vec![
            record("1;2", "Article", "2020", "A"),
            record("1;2", "Article", "2020", "A"), // duplicate
            record("3;x", "Article", "2020", "B"), // parse failure
            missing_type,
            record("4", "Review", "2021", "D"),
        ];

        let normalized = normalize_corpus(records, ";");
        let report = &normalized.report;
        assert_eq!(report.total, 5);
        assert_eq!(report.retained, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.parse_failures, 1);
        assert_eq!(report.missing_fields, 1);
        assert_eq!(report.dropped(), 3);

        assert_eq!(normalized.documents[0].author_ids(), &[1, 2]);
        assert_eq!(normalized.documents[1].author_ids(), &[4]);
    }

    #[test]
    fn test_duplicate_first_occurrence_kept() {
        let mut first = record("1;2", "Article", "2020", "A");
        first.eid = Some("first".to_string());
        let mut second = record("1;2", "Article", "2020", "A");
        second.eid = Some("second".to_string());

        let normalized = normalize_corpus(vec![first, second], ";");
        assert_eq!(normalized.documents.len(), 1);
        assert_eq!(normalized.documents[0].meta.eid.as_deref(), Some("first"));
    }

    #[test]
    fn test_same_authors_different_year_not_duplicate() {
        let records = vec![
            record("1;2", "Article", "2020", "A"),
            record("1;2", "Article", "2021", "A"),
        ];
        assert_eq!(normalize_corpus(records, ";").report.retained, 2);
    }

    #[test]
    fn test_missing_field_does_not_consume_dedup_key() {
        let mut incomplete = record("1;2", "Article", "2020", "A");
        incomplete.year = Some(String::new());
        let complete = record("1;2", "Article", "2020", "A");

        let normalized = normalize_corpus(vec![incomplete, complete], ";");
        assert_eq!(normalized.report.missing_fields, 1);
        assert_eq!(normalized.report.duplicates, 0);
        assert_eq!(normalized.report.retained, 1);
    }
}
