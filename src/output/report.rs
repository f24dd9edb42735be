//! Machine-readable reports: delimited rows and JSON documents.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::formatter::{format_annotation_table, format_metrics_table};
use super::OutputFormat;
use crate::annotate::AnnotatedCorpus;
use crate::corpus::{Document, FilterReport, NormalizeReport};
use crate::metrics::ResearcherMetrics;
use crate::schema::{AuthorCountComparison, Schema, SchemaModel};

/// Placeholder for a metric with no data.
pub const MISSING: &str = "NA";

/// What happened to the input on its way to the report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub corpus_files: Vec<String>,
    pub normalize: NormalizeReport,
    pub filter: FilterReport,
    /// Documents each schema could not be applied to.
    pub schema_failures: BTreeMap<Schema, usize>,
    /// Researcher rows skipped for a non-integer ID.
    pub researchers_skipped: usize,
}

/// Everything needed to render the per-researcher metrics table.
#[derive(Debug, Clone, Copy)]
pub struct MetricsReport<'a> {
    pub id_column: &'a str,
    pub passthrough_headers: &'a [String],
    pub schemas: &'a [Schema],
    pub metrics: &'a [ResearcherMetrics],
    pub summary: &'a RunSummary,
}

/// Column names after the researcher ID and passthrough columns.
pub fn metric_columns(schemas: &[Schema]) -> Vec<String> {
    let mut columns = vec![
        "whole_fullcount".to_string(),
        "straight_firstauthor".to_string(),
        "straight_lastauthor".to_string(),
    ];
    columns.extend(schemas.iter().map(|s| s.name().to_string()));
    columns.extend(
        [
            "first_last_author_proportion",
            "single_author_publications",
            "degree_of_collaboration",
            "collaboration_index",
            "collaboration_coefficient",
            "number_of_unique_coauthors",
        ]
        .map(str::to_string),
    );
    columns
}

pub fn metrics_header(report: &MetricsReport) -> Vec<String> {
    let mut header = vec![report.id_column.to_string()];
    header.extend(report.passthrough_headers.iter().cloned());
    header.extend(metric_columns(report.schemas));
    header
}

/// Metric cells for one researcher, in [`metric_columns`] order.
pub fn metric_cells(m: &ResearcherMetrics, schemas: &[Schema], number: impl Fn(f64) -> String) -> Vec<String> {
    let optional = |value: Option<f64>| value.map_or_else(|| MISSING.to_string(), &number);
    let mut cells = vec![
        m.whole_fullcount.to_string(),
        m.straight_firstauthor.to_string(),
        m.straight_lastauthor.to_string(),
    ];
    cells.extend(schemas.iter().map(|&s| optional(m.credit(s))));
    cells.push(optional(m.first_last_author_proportion));
    cells.push(m.single_author_publications.to_string());
    cells.push(optional(m.degree_of_collaboration));
    cells.push(optional(m.collaboration_index));
    cells.push(optional(m.collaboration_coefficient));
    cells.push(m.number_of_unique_coauthors.to_string());
    cells
}

/// One row per researcher: ID, passthrough values, then metrics.
pub fn metrics_rows(report: &MetricsReport, number: impl Fn(f64) -> String + Copy) -> Vec<Vec<String>> {
    report
        .metrics
        .iter()
        .map(|m| {
            let mut row = vec![m.id.to_string()];
            row.extend(padded(&m.passthrough, report.passthrough_headers.len()));
            row.extend(metric_cells(m, report.schemas, number));
            row
        })
        .collect()
}

// Short researcher rows are padded so every row matches the header.
fn padded(values: &[String], width: usize) -> Vec<String> {
    (0..width)
        .map(|i| values.get(i).cloned().unwrap_or_default())
        .collect()
}

/// Full-precision number for machine-readable output.
pub fn exact(value: f64) -> String {
    value.to_string()
}

pub fn write_delimited(header: &[String], rows: &[Vec<String>], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(header).context("Failed to write header")?;
    for row in rows {
        writer.write_record(row).context("Failed to write row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush output: {}", e))?;
    String::from_utf8(bytes).context("Output is not valid UTF-8")
}

#[derive(Serialize)]
struct ResearcherJson<'a> {
    /// Passthrough columns keyed by header.
    fields: BTreeMap<&'a str, &'a str>,
    #[serde(flatten)]
    metrics: &'a ResearcherMetrics,
}

#[derive(Serialize)]
struct MetricsJson<'a> {
    generated_at: DateTime<Utc>,
    summary: &'a RunSummary,
    schemas: &'a [Schema],
    researchers: Vec<ResearcherJson<'a>>,
}

fn metrics_json(report: &MetricsReport, generated_at: DateTime<Utc>) -> Result<String> {
    let researchers = report
        .metrics
        .iter()
        .map(|m| ResearcherJson {
            fields: report
                .passthrough_headers
                .iter()
                .map(String::as_str)
                .zip(m.passthrough.iter().map(String::as_str))
                .collect(),
            metrics: m,
        })
        .collect();
    let json = MetricsJson {
        generated_at,
        summary: report.summary,
        schemas: report.schemas,
        researchers,
    };
    serde_json::to_string_pretty(&json).context("Failed to serialize metrics report")
}

/// Render the metrics report in `format`.
pub fn format_metrics(report: &MetricsReport, format: OutputFormat, use_colors: bool) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_metrics_table(report, use_colors)),
        OutputFormat::Json => metrics_json(report, Utc::now()),
        OutputFormat::Tsv | OutputFormat::Csv => {
            let delimiter = format.delimiter().unwrap_or(b',');
            write_delimited(&metrics_header(report), &metrics_rows(report, exact), delimiter)
        }
    }
}

/// One credit assignment in the long annotation layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationRow {
    /// Document EID, or a year/first-author label when the corpus has none.
    pub eid: String,
    pub author_id: u64,
    /// 1-based byline position.
    pub position: usize,
    pub schema: Schema,
    pub credit: f64,
}

pub const ANNOTATION_COLUMNS: [&str; 5] = ["eid", "author_id", "position", "schema", "credit"];

/// Long-format credit assignments, optionally restricted to one author.
pub fn annotation_rows(corpus: &AnnotatedCorpus, author: Option<u64>) -> Vec<AnnotationRow> {
    let mut rows = Vec::new();
    for annotated in corpus.documents() {
        let label = annotated.document.label();
        for &schema in corpus.schemas() {
            for (position, (author_id, credit)) in annotated.contributions(schema).enumerate() {
                if author.is_some_and(|wanted| wanted != author_id) {
                    continue;
                }
                rows.push(AnnotationRow {
                    eid: label.clone(),
                    author_id,
                    position: position + 1,
                    schema,
                    credit,
                });
            }
        }
    }
    rows
}

#[derive(Serialize)]
struct AnnotatedDocumentJson<'a> {
    #[serde(flatten)]
    document: &'a Document,
    credits: BTreeMap<Schema, &'a [f64]>,
}

#[derive(Serialize)]
struct AnnotationsJson<'a> {
    generated_at: DateTime<Utc>,
    summary: &'a RunSummary,
    schemas: &'a [Schema],
    documents: Vec<AnnotatedDocumentJson<'a>>,
}

fn annotations_json(
    corpus: &AnnotatedCorpus,
    author: Option<u64>,
    summary: &RunSummary,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let documents = corpus
        .documents()
        .iter()
        .filter(|d| author.map_or(true, |id| d.document.has_author(id)))
        .map(|d| AnnotatedDocumentJson {
            document: &d.document,
            credits: d
                .schemas()
                .filter_map(|s| d.credits(s).map(|credits| (s, credits)))
                .collect(),
        })
        .collect();
    let json = AnnotationsJson {
        generated_at,
        summary,
        schemas: corpus.schemas(),
        documents,
    };
    serde_json::to_string_pretty(&json).context("Failed to serialize annotated corpus")
}

/// Render the annotated corpus in `format`.
pub fn format_annotations(
    corpus: &AnnotatedCorpus,
    author: Option<u64>,
    summary: &RunSummary,
    format: OutputFormat,
    use_colors: bool,
) -> Result<String> {
    match format {
        OutputFormat::Json => annotations_json(corpus, author, summary, Utc::now()),
        OutputFormat::Table => Ok(format_annotation_table(&annotation_rows(corpus, author), use_colors)),
        OutputFormat::Tsv | OutputFormat::Csv => {
            let header: Vec<String> = ANNOTATION_COLUMNS.iter().map(|c| c.to_string()).collect();
            let rows: Vec<Vec<String>> = annotation_rows(corpus, author)
                .into_iter()
                .map(|r| {
                    vec![
                        r.eid,
                        r.author_id.to_string(),
                        r.position.to_string(),
                        r.schema.to_string(),
                        exact(r.credit),
                    ]
                })
                .collect();
            write_delimited(&header, &rows, format.delimiter().unwrap_or(b','))
        }
    }
}

/// Model table as delimited text: one row per byline position.
pub fn format_model_delimited(model: &SchemaModel, delimiter: u8) -> Result<String> {
    let mut header = vec!["position".to_string()];
    header.extend(model.columns.iter().map(|c| c.schema.to_string()));
    let rows: Vec<Vec<String>> = (0..model.author_count)
        .map(|i| {
            let mut row = vec![(i + 1).to_string()];
            row.extend(model.columns.iter().map(|c| exact(c.credits[i])));
            row
        })
        .collect();
    write_delimited(&header, &rows, delimiter)
}

pub fn format_comparison_delimited(comparison: &AuthorCountComparison, delimiter: u8) -> Result<String> {
    let (n1, first) = &comparison.first;
    let (n2, second) = &comparison.second;
    let header = vec![
        "position".to_string(),
        format!("{} (n={})", comparison.schema, n1),
        format!("{} (n={})", comparison.schema, n2),
    ];
    let cell = |credits: &[f64], i: usize| credits.get(i).map(|&c| exact(c)).unwrap_or_default();
    let rows: Vec<Vec<String>> = (0..comparison.rows())
        .map(|i| vec![(i + 1).to_string(), cell(first, i), cell(second, i)])
        .collect();
    write_delimited(&header, &rows, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate_corpus;
    use crate::corpus::DocumentMeta;
    use crate::metrics::{aggregate_researchers, ResearcherEntry};
    use crate::schema::{compare_author_counts, model_schemas};

    fn doc(ids: &[u64], eid: &str) -> Document {
        let meta = DocumentMeta {
            eid: Some(eid.to_string()),
            ..Default::default()
        };
        Document::new(ids.to_vec(), "Article".to_string(), 2020, meta).unwrap()
    }

    fn sample() -> (AnnotatedCorpus, Vec<ResearcherMetrics>) {
        let corpus = annotate_corpus(
            vec![doc(&[1, 2], "e-1"), doc(&[2], "e-2")],
            &[Schema::FractionalEqual, Schema::GoldenShare],
        );
        let entries = vec![
            ResearcherEntry {
                id: 2,
                passthrough: vec!["Bo".to_string(), "Physics, Applied".to_string()],
            },
            ResearcherEntry {
                id: 9,
                passthrough: vec!["Nobody".to_string()],
            },
        ];
        let metrics = aggregate_researchers(&entries, &corpus);
        (corpus, metrics)
    }

    fn report<'a>(metrics: &'a [ResearcherMetrics], headers: &'a [String], summary: &'a RunSummary) -> MetricsReport<'a> {
        MetricsReport {
            id_column: "Scopus ID",
            passthrough_headers: headers,
            schemas: &[Schema::FractionalEqual, Schema::GoldenShare],
            metrics,
            summary,
        }
    }

    #[test]
    fn test_metrics_header_order() {
        let (_, metrics) = sample();
        let headers = vec!["Name".to_string(), "Dept".to_string()];
        let summary = RunSummary::default();
        let header = metrics_header(&report(&metrics, &headers, &summary));
        assert_eq!(header[0], "Scopus ID");
        assert_eq!(header[1], "Name");
        assert_eq!(header[3], "whole_fullcount");
        assert_eq!(header[6], "fractional_equal");
        assert_eq!(header[7], "golden_share");
        assert_eq!(header.last().unwrap(), "number_of_unique_coauthors");
        assert_eq!(header.len(), 3 + metric_columns(&[Schema::FractionalEqual, Schema::GoldenShare]).len());
    }

    #[test]
    fn test_csv_quotes_and_marks_missing() {
        let (_, metrics) = sample();
        let headers = vec!["Name".to_string(), "Dept".to_string()];
        let summary = RunSummary::default();
        let csv = format_metrics(&report(&metrics, &headers, &summary), OutputFormat::Csv, false).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2,Bo,\"Physics, Applied\",2,1,1,1.5,"));
        // researcher 9 has one passthrough value; the second is padded
        assert!(lines[2].starts_with("9,Nobody,,0,0,0,0,0,NA,0,NA,NA,NA,0"));
    }

    #[test]
    fn test_tsv_uses_tabs() {
        let (_, metrics) = sample();
        let headers = vec!["Name".to_string(), "Dept".to_string()];
        let summary = RunSummary::default();
        let tsv = format_metrics(&report(&metrics, &headers, &summary), OutputFormat::Tsv, false).unwrap();
        let first = tsv.lines().next().unwrap();
        assert!(first.starts_with("Scopus ID\tName\tDept\twhole_fullcount"));
    }

    #[test]
    fn test_metrics_json() {
        let (_, metrics) = sample();
        let headers = vec!["Name".to_string(), "Dept".to_string()];
        let summary = RunSummary {
            researchers_skipped: 1,
            ..Default::default()
        };
        let json = metrics_json(&report(&metrics, &headers, &summary), Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["summary"]["researchers_skipped"], 1);
        assert_eq!(value["schemas"][1], "golden_share");
        let first = &value["researchers"][0];
        assert_eq!(first["id"], 2);
        assert_eq!(first["fields"]["Name"], "Bo");
        assert_eq!(first["schema_credits"]["fractional_equal"], 1.5);
        assert!(value["researchers"][1]["degree_of_collaboration"].is_null());
    }

    #[test]
    fn test_annotation_rows_long_format() {
        let (corpus, _) = sample();
        let rows = annotation_rows(&corpus, None);
        // two schemas: 2 positions + 1 position each
        assert_eq!(rows.len(), 6);
        assert_eq!(
            rows[0],
            AnnotationRow {
                eid: "e-1".to_string(),
                author_id: 1,
                position: 1,
                schema: Schema::FractionalEqual,
                credit: 0.5,
            }
        );
        let only_one = annotation_rows(&corpus, Some(1));
        assert_eq!(only_one.len(), 2);
        assert!(only_one.iter().all(|r| r.author_id == 1));
    }

    #[test]
    fn test_annotations_csv() {
        let (corpus, _) = sample();
        let csv = format_annotations(&corpus, Some(2), &RunSummary::default(), OutputFormat::Csv, false).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "eid,author_id,position,schema,credit");
        assert_eq!(lines[1], "e-1,2,2,fractional_equal,0.5");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_annotations_json_filters_documents() {
        let (corpus, _) = sample();
        let json = annotations_json(&corpus, Some(1), &RunSummary::default(), Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let documents = value["documents"].as_array().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0]["credits"]["fractional_equal"][0], 0.5);
    }

    #[test]
    fn test_model_delimited() {
        let model = model_schemas(3, &[Schema::FractionalEqual, Schema::FractionalFae]).unwrap();
        let tsv = format_model_delimited(&model, b'\t').unwrap();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "position\tfractional_equal\tfractional_FAE");
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("3\t"));
    }

    #[test]
    fn test_comparison_delimited_pads_shorter_byline() {
        let comparison = compare_author_counts(Schema::FractionalEqual, 2, 4).unwrap();
        let csv = format_comparison_delimited(&comparison, b',').unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "position,fractional_equal (n=2),fractional_equal (n=4)");
        assert_eq!(lines[1], "1,0.5,0.25");
        assert_eq!(lines[4], "4,,0.25");
    }
}
