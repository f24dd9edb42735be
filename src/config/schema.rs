use serde::{Deserialize, Serialize};

use crate::corpus::DocumentFilter;
use crate::output::OutputFormat;
use crate::schema::Schema;

/// Analysis configuration file.
///
/// Example YAML:
/// ```yaml
/// schemas: [fractional_equal, harmonic_standard, golden_share]
/// document_types: [Article, Review]
/// years: "2010-2020"
/// threads: 4
/// output: csv
/// columns:
///   author_ids: "Author(s) ID"
///   author_id_delimiter: ";"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema names to compute (default: all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Vec<String>>,

    /// Document types to keep, case-insensitive (default: all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_types: Option<Vec<String>>,

    /// Publication year range: "<N", "<=N", ">N", ">=N", "N-M" or "N"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<String>,

    /// Worker threads (default: one per core)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    /// Default output format: table, tsv, csv or json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default)]
    pub columns: ColumnConfig,
}

/// Corpus column names. Defaults match a Scopus CSV export.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    pub author_ids: String,
    pub author_id_delimiter: String,
    pub document_type: String,
    pub year: String,
    pub title: String,
    pub source_title: String,
    pub eid: String,
    pub authors: String,
    pub author_full_names: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            author_ids: "Author(s) ID".to_string(),
            author_id_delimiter: ";".to_string(),
            document_type: "Document Type".to_string(),
            year: "Year".to_string(),
            title: "Title".to_string(),
            source_title: "Source title".to_string(),
            eid: "EID".to_string(),
            authors: "Authors".to_string(),
            author_full_names: "Author full names".to_string(),
        }
    }
}

/// Validated, parsed configuration used by the pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    pub schemas: Vec<Schema>,
    pub filter: DocumentFilter,
    pub threads: Option<usize>,
    pub output: OutputFormat,
    pub columns: ColumnConfig,
}
