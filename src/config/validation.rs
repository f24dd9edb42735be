use super::schema::{ColumnConfig, Config, Settings};
use crate::corpus::{DocumentFilter, YearRange};
use crate::output::OutputFormat;
use crate::schema::{parse_schemas, Schema};

/// Validate configuration at startup and resolve it into [`Settings`].
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<Settings, Vec<String>> {
    let mut errors = Vec::new();

    let schemas = match config.schemas.as_deref() {
        None => Schema::ALL.to_vec(),
        Some([]) => {
            errors.push("schemas: must name at least one schema".to_string());
            Vec::new()
        }
        Some(names) => parse_schemas(names).unwrap_or_else(|unknown| {
            for name in unknown {
                errors.push(format!("schemas: {} (run `author-credit schemas` for the list)", name));
            }
            Vec::new()
        }),
    };

    if let Some(types) = &config.document_types {
        if types.is_empty() {
            errors.push("document_types: must name at least one type, or be omitted".to_string());
        }
        for (i, t) in types.iter().enumerate() {
            if t.trim().is_empty() {
                errors.push(format!("document_types[{}]: must not be blank", i));
            }
        }
    }

    let years = config.years.as_deref().and_then(|years| match YearRange::parse(years) {
        Ok(range) => Some(range),
        Err(e) => {
            errors.push(format!("years: invalid range '{}' - {}", years, e));
            None
        }
    });

    if config.threads == Some(0) {
        errors.push("threads: must be at least 1".to_string());
    }

    let output = match config.output.as_deref() {
        None => OutputFormat::default(),
        Some(name) => name.parse().unwrap_or_else(|e| {
            errors.push(format!("output: {}", e));
            OutputFormat::default()
        }),
    };

    validate_columns(&config.columns, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Settings {
        schemas,
        filter: DocumentFilter {
            document_types: config.document_types.clone(),
            years,
        },
        threads: config.threads,
        output,
        columns: config.columns.clone(),
    })
}

fn validate_columns(columns: &ColumnConfig, errors: &mut Vec<String>) {
    let named = [
        ("author_ids", &columns.author_ids),
        ("document_type", &columns.document_type),
        ("year", &columns.year),
        ("title", &columns.title),
        ("source_title", &columns.source_title),
        ("eid", &columns.eid),
        ("authors", &columns.authors),
        ("author_full_names", &columns.author_full_names),
    ];
    for (key, value) in named {
        if value.trim().is_empty() {
            errors.push(format!("columns.{}: must not be empty", key));
        }
    }
    if columns.author_id_delimiter.is_empty() {
        errors.push("columns.author_id_delimiter: must not be empty".to_string());
    }
}
