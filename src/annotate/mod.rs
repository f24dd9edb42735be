//! Per-document credit vectors for every selected schema.
//!
//! Annotation never mutates a [`Document`]; it wraps each one in an
//! [`AnnotatedDocument`] that owns the credit vectors alongside it. A schema
//! that fails for one document is recorded as an [`AnnotationFailure`] and
//! the document simply carries no vector for that schema.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::corpus::Document;
use crate::schema::{Schema, SchemaError};

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedDocument {
    pub document: Document,
    credits: BTreeMap<Schema, Vec<f64>>,
}

impl AnnotatedDocument {
    /// Credit vector for `schema`, in byline order. `None` if the schema failed
    /// for this document or was not selected.
    pub fn credits(&self, schema: Schema) -> Option<&[f64]> {
        self.credits.get(&schema).map(Vec::as_slice)
    }

    /// Schemas with a vector on this document.
    pub fn schemas(&self) -> impl Iterator<Item = Schema> + '_ {
        self.credits.keys().copied()
    }

    /// `(author, credit)` pairs for `schema`, one per byline position.
    pub fn contributions(&self, schema: Schema) -> impl Iterator<Item = (u64, f64)> + '_ {
        let credits = self.credits(schema).unwrap_or_default();
        self.document.author_ids().iter().copied().zip(credits.iter().copied())
    }

    /// Total credit `author` receives under `schema`, summed over every
    /// position the author holds. `None` if the schema has no vector here.
    pub fn author_credit(&self, schema: Schema, author: u64) -> Option<f64> {
        self.credits(schema)?;
        Some(
            self.contributions(schema)
                .filter(|(id, _)| *id == author)
                .map(|(_, credit)| credit)
                .fold(0.0, |acc, credit| acc + credit),
        )
    }
}

/// A schema that could not be applied to one document.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationFailure {
    /// Index of the document in the annotated corpus.
    pub document: usize,
    pub label: String,
    pub schema: Schema,
    pub error: SchemaError,
}

#[derive(Debug, Clone, Default)]
pub struct AnnotatedCorpus {
    documents: Vec<AnnotatedDocument>,
    schemas: Vec<Schema>,
    failures: Vec<AnnotationFailure>,
}

impl AnnotatedCorpus {
    pub fn documents(&self) -> &[AnnotatedDocument] {
        &self.documents
    }

    pub fn document(&self, index: usize) -> Option<&AnnotatedDocument> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Schemas that were applied, in selection order.
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn failures(&self) -> &[AnnotationFailure] {
        &self.failures
    }

    /// Failure count per schema; schemas without failures are absent.
    pub fn failure_counts(&self) -> BTreeMap<Schema, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.schema).or_insert(0) += 1;
        }
        counts
    }

    /// Documents whose byline includes `author`.
    pub fn documents_with_author(&self, author: u64) -> impl Iterator<Item = &AnnotatedDocument> + '_ {
        self.documents.iter().filter(move |d| d.document.has_author(author))
    }

    /// `(document index, credit)` for every document `author` appears on.
    pub fn author_credits(&self, author: u64, schema: Schema) -> Vec<(usize, f64)> {
        self.documents
            .iter()
            .enumerate()
            .filter_map(|(idx, d)| {
                if !d.document.has_author(author) {
                    return None;
                }
                d.author_credit(schema, author).map(|credit| (idx, credit))
            })
            .collect()
    }
}

/// Apply every schema to every document.
pub fn annotate_corpus(documents: Vec<Document>, schemas: &[Schema]) -> AnnotatedCorpus {
    annotate_with(documents, schemas, |schema, n| schema.credits(n))
}

fn annotate_with<F>(documents: Vec<Document>, schemas: &[Schema], credit_fn: F) -> AnnotatedCorpus
where
    F: Fn(Schema, usize) -> Result<Vec<f64>, SchemaError> + Sync,
{
    let annotated: Vec<(AnnotatedDocument, Vec<AnnotationFailure>)> = documents
        .into_par_iter()
        .enumerate()
        .map(|(index, document)| {
            let n = document.author_count();
            let mut credits = BTreeMap::new();
            let mut failures = Vec::new();

            for &schema in schemas {
                let result = credit_fn(schema, n).and_then(|vector| {
                    if vector.len() == n {
                        Ok(vector)
                    } else {
                        Err(SchemaError::LengthMismatch {
                            schema,
                            expected: n,
                            actual: vector.len(),
                        })
                    }
                });
                match result {
                    Ok(vector) => {
                        credits.insert(schema, vector);
                    }
                    Err(error) => {
                        debug!(document = %document.label(), %schema, %error, "schema failed for document");
                        failures.push(AnnotationFailure {
                            document: index,
                            label: document.label(),
                            schema,
                            error,
                        });
                    }
                }
            }

            (AnnotatedDocument { document, credits }, failures)
        })
        .collect();

    let mut corpus = AnnotatedCorpus {
        documents: Vec::with_capacity(annotated.len()),
        schemas: schemas.to_vec(),
        failures: Vec::new(),
    };
    for (document, failures) in annotated {
        corpus.documents.push(document);
        corpus.failures.extend(failures);
    }

    for (schema, count) in corpus.failure_counts() {
        warn!(%schema, documents = count, "schema could not be applied to some documents");
    }

    corpus
}
