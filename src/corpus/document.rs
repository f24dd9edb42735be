use serde::{Deserialize, Serialize};

use super::record::RawRecord;

/// Passthrough metadata; carried along, never computed upon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub eid: Option<String>,
    pub title: Option<String>,
    pub source_title: Option<String>,
    pub authors: Option<String>,
    pub author_full_names: Option<String>,
}

/// A normalized publication.
///
/// `author_ids` is in byline order and never empty; the constructor is the
/// only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    author_ids: Vec<u64>,
    pub document_type: String,
    pub year: i32,
    pub meta: DocumentMeta,
}

impl Document {
    /// Returns `None` when `author_ids` is empty.
    pub fn new(
        author_ids: Vec<u64>,
        document_type: String,
        year: i32,
        meta: DocumentMeta,
    ) -> Option<Self> {
        if author_ids.is_empty() {
            return None;
        }
        Some(Self {
            author_ids,
            document_type,
            year,
            meta,
        })
    }

    pub fn author_ids(&self) -> &[u64] {
        &self.author_ids
    }

    pub fn author_count(&self) -> usize {
        self.author_ids.len()
    }

    pub fn first_author(&self) -> u64 {
        self.author_ids[0]
    }

    /// Last author, or `None` for single-author documents.
    pub fn last_author(&self) -> Option<u64> {
        match self.author_ids.as_slice() {
            [_] => None,
            [.., last] => Some(*last),
            [] => None,
        }
    }

    pub fn has_author(&self, id: u64) -> bool {
        self.author_ids.contains(&id)
    }

    pub fn is_single_authored(&self) -> bool {
        self.author_ids.len() == 1
    }

    /// Render back into a raw record using `delimiter` between IDs.
    pub fn to_record(&self, delimiter: &str) -> RawRecord {
        let ids = self
            .author_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(delimiter);
        RawRecord {
            author_ids: Some(ids),
            document_type: Some(self.document_type.clone()),
            year: Some(self.year.to_string()),
            title: self.meta.title.clone(),
            source_title: self.meta.source_title.clone(),
            eid: self.meta.eid.clone(),
            authors: self.meta.authors.clone(),
            author_full_names: self.meta.author_full_names.clone(),
        }
    }

    /// Short label for logs and tables: the EID when known.
    pub fn label(&self) -> String {
        match &self.meta.eid {
            Some(eid) => eid.clone(),
            None => format!("{}:{}", self.year, self.first_author()),
        }
    }
}
