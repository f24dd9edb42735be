pub mod export;
pub mod formatter;
pub mod report;

pub use export::{emit, write_atomic};
pub use formatter::{
    format_comparison_table, format_corpus_summary, format_metrics_detail, format_metrics_table,
    format_model_table, format_pipeline_summary, format_schema_list, should_use_colors,
};
pub use report::{
    annotation_rows, format_annotations, format_comparison_delimited, format_metrics, format_model_delimited,
    AnnotationRow, MetricsReport, RunSummary,
};

use std::fmt;
use std::str::FromStr;

/// How a report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned, optionally colored text for a terminal.
    #[default]
    Table,
    Tsv,
    Csv,
    Json,
}

impl OutputFormat {
    /// Field delimiter for the delimited formats.
    pub fn delimiter(self) -> Option<u8> {
        match self {
            OutputFormat::Tsv => Some(b'\t'),
            OutputFormat::Csv => Some(b','),
            OutputFormat::Table | OutputFormat::Json => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected table, tsv, csv or json)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        };
        write!(f, "{}", name)
    }
}
