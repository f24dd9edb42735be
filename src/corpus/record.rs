use serde::{Deserialize, Serialize};

/// One corpus row as read from an export file.
///
/// Fields are `None` when the column is absent from the file; an empty
/// cell is `Some("")`. Normalization decides what counts as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub author_ids: Option<String>,
    pub document_type: Option<String>,
    pub year: Option<String>,
    pub title: Option<String>,
    pub source_title: Option<String>,
    pub eid: Option<String>,
    pub authors: Option<String>,
    pub author_full_names: Option<String>,
}

impl RawRecord {
    /// Key under which two records count as the same publication.
    pub fn dedup_key(&self) -> (String, String, String, String) {
        (
            trimmed(&self.author_ids),
            trimmed(&self.title),
            trimmed(&self.source_title),
            trimmed(&self.year),
        )
    }
}

/// Trimmed field value; `None` when the field is absent or blank.
pub(crate) fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn trimmed(field: &Option<String>) -> String {
    field.as_deref().map(str::trim).unwrap_or_default().to_string()
}
