use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use super::report::{
    metric_cells, metric_columns, metrics_header, metrics_rows, AnnotationRow, MetricsReport, RunSummary,
    ANNOTATION_COLUMNS, MISSING,
};
use crate::corpus::CorpusSummary;
use crate::schema::{AuthorCountComparison, Schema, SchemaModel};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Four decimals: enough to tell schemas apart at a glance.
fn fixed(value: f64) -> String {
    format!("{:.4}", value)
}

const SEPARATOR: &str = "  ";

fn column_widths(header: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    widths
}

fn table_width(widths: &[usize]) -> usize {
    widths.iter().sum::<usize>() + SEPARATOR.len() * widths.len().saturating_sub(1)
}

/// Align `rows` under `header`. Columns from `numeric_from` on are
/// right-aligned; `NA` cells are dimmed when colored.
fn render_table(header: &[String], rows: &[Vec<String>], numeric_from: usize, use_colors: bool) -> String {
    let widths = column_widths(header, rows);
    let pad = |i: usize, cell: &str| {
        let width = widths.get(i).copied().unwrap_or(0);
        if i >= numeric_from {
            format!("{:>width$}", cell, width = width)
        } else {
            format!("{:<width$}", cell, width = width)
        }
    };

    let header_line = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let padded = pad(i, h);
            if use_colors {
                padded.bold().to_string()
            } else {
                padded
            }
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    let mut lines = vec![header_line.trim_end().to_string()];
    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let padded = pad(i, cell);
                if !use_colors {
                    padded
                } else if cell == MISSING {
                    padded.dimmed().to_string()
                } else if i == 0 {
                    padded.cyan().to_string()
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Per-researcher metrics as an aligned table.
///
/// Falls back to [`format_metrics_detail`] when the table is wider than the
/// terminal. Pipes get the full table.
pub fn format_metrics_table(report: &MetricsReport, use_colors: bool) -> String {
    if report.metrics.is_empty() {
        return "No researchers to report.".to_string();
    }

    let header = metrics_header(report);
    let rows = metrics_rows(report, fixed);
    let width = table_width(&column_widths(&header, &rows));

    match get_terminal_width() {
        Some(term_width) if width > term_width => format_metrics_detail(report, use_colors),
        _ => render_table(&header, &rows, 1 + report.passthrough_headers.len(), use_colors),
    }
}

/// One block per researcher, one metric per line.
pub fn format_metrics_detail(report: &MetricsReport, use_colors: bool) -> String {
    let labels = metric_columns(report.schemas);
    let label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);

    report
        .metrics
        .iter()
        .map(|m| {
            let title = format!("{} {}", report.id_column, m.id);
            let mut block = if use_colors {
                title.bold().to_string()
            } else {
                title
            };
            let extras: Vec<String> = report
                .passthrough_headers
                .iter()
                .zip(&m.passthrough)
                .filter(|(_, value)| !value.is_empty())
                .map(|(header, value)| format!("{}: {}", header, value))
                .collect();
            if !extras.is_empty() {
                block.push_str(&format!("  ({})", extras.join(", ")));
            }

            for (label, value) in labels.iter().zip(metric_cells(m, report.schemas, fixed)) {
                let value = if use_colors && value == MISSING {
                    value.dimmed().to_string()
                } else {
                    value
                };
                block.push_str(&format!("\n  {:<width$}  {}", label, value, width = label_width));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_annotation_table(rows: &[AnnotationRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No credit assignments to report.".to_string();
    }
    let header: Vec<String> = ANNOTATION_COLUMNS.iter().map(|c| c.to_string()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.eid.clone(),
                r.author_id.to_string(),
                r.position.to_string(),
                r.schema.to_string(),
                fixed(r.credit),
            ]
        })
        .collect();
    render_table(&header, &cells, 4, use_colors)
}

/// Credit vectors of several schemas: rows are byline positions.
pub fn format_model_table(model: &SchemaModel, use_colors: bool) -> String {
    let mut header = vec!["position".to_string()];
    header.extend(model.columns.iter().map(|c| c.schema.to_string()));

    let mut rows: Vec<Vec<String>> = (0..model.author_count)
        .map(|i| {
            let mut row = vec![(i + 1).to_string()];
            row.extend(model.columns.iter().map(|c| fixed(c.credits[i])));
            row
        })
        .collect();

    let mut total = vec!["sum".to_string()];
    total.extend(model.columns.iter().map(|c| fixed(c.credits.iter().sum())));
    rows.push(total);

    format!(
        "Credit per position for {} author(s)\n\n{}",
        model.author_count,
        render_table(&header, &rows, 1, use_colors)
    )
}

/// One schema at two author counts, side by side.
pub fn format_comparison_table(comparison: &AuthorCountComparison, use_colors: bool) -> String {
    let (n1, first) = &comparison.first;
    let (n2, second) = &comparison.second;
    let header = vec!["position".to_string(), format!("n={}", n1), format!("n={}", n2)];
    let cell = |credits: &[f64], i: usize| credits.get(i).map(|&c| fixed(c)).unwrap_or_default();
    let rows: Vec<Vec<String>> = (0..comparison.rows())
        .map(|i| vec![(i + 1).to_string(), cell(first, i), cell(second, i)])
        .collect();

    format!(
        "{} for {} and {} authors\n\n{}",
        comparison.schema,
        n1,
        n2,
        render_table(&header, &rows, 1, use_colors)
    )
}

/// The schema catalogue with one-line descriptions.
pub fn format_schema_list(use_colors: bool) -> String {
    let width = Schema::ALL.iter().map(|s| s.name().len()).max().unwrap_or(0);
    Schema::ALL
        .iter()
        .map(|s| {
            let name = format!("{:<width$}", s.name(), width = width);
            let name = if use_colors { name.cyan().to_string() } else { name };
            let note = if s.sums_to_one() { "" } else { " (not normalized)" };
            format!("{}  {}{}", name, s.description(), note)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-paragraph account of what the pipeline kept and dropped.
pub fn format_pipeline_summary(summary: &RunSummary) -> String {
    let n = &summary.normalize;
    let mut lines = vec![
        format!(
            "{} file(s), {} record(s) read, {} retained",
            summary.corpus_files.len(),
            n.total,
            n.retained
        ),
        format!(
            "  dropped {}: {} missing a required field, {} duplicate(s), {} unparseable",
            n.dropped(),
            n.missing_fields,
            n.duplicates,
            n.parse_failures
        ),
    ];
    if summary.filter.before != summary.filter.after {
        lines.push(format!(
            "  selection kept {} of {} document(s)",
            summary.filter.after, summary.filter.before
        ));
    }
    for (schema, count) in &summary.schema_failures {
        lines.push(format!("  {} could not be applied to {} document(s)", schema, count));
    }
    if summary.researchers_skipped > 0 {
        lines.push(format!(
            "  skipped {} researcher row(s) without an integer ID",
            summary.researchers_skipped
        ));
    }
    lines.join("\n")
}

/// Report for the `inspect` command.
pub fn format_corpus_summary(summary: &RunSummary, corpus: &CorpusSummary, use_colors: bool) -> String {
    let mut out = format_pipeline_summary(summary);

    let years = match (corpus.first_year, corpus.last_year) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "none".to_string(),
    };
    out.push_str(&format!(
        "\n\n{} document(s), {} distinct author(s), years {}",
        corpus.documents, corpus.distinct_authors, years
    ));

    if !corpus.document_types.is_empty() {
        let header = vec!["document type".to_string(), "count".to_string()];
        let mut counts: Vec<(&String, &usize)> = corpus.document_types.iter().collect();
        // Most common first; ties keep alphabetical order.
        counts.sort_by(|a, b| b.1.cmp(a.1));
        let rows: Vec<Vec<String>> = counts
            .into_iter()
            .map(|(t, count)| vec![t.clone(), count.to_string()])
            .collect();
        out.push_str("\n\n");
        out.push_str(&render_table(&header, &rows, 1, use_colors));
    }
    out
}
