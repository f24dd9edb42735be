use anyhow::{bail, Result};
use serde::Serialize;

use super::catalogue::Schema;

/// Largest byline the modelers render. Corpus documents are not bounded by this.
pub const MAX_MODEL_AUTHORS: usize = 50;

/// Credit vectors of several schemas for one author count.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaModel {
    pub author_count: usize,
    pub columns: Vec<SchemaColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaColumn {
    pub schema: Schema,
    pub credits: Vec<f64>,
}

/// One schema evaluated at two different author counts.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorCountComparison {
    pub schema: Schema,
    pub first: (usize, Vec<f64>),
    pub second: (usize, Vec<f64>),
}

impl AuthorCountComparison {
    /// Number of table rows: the longer of the two bylines.
    pub fn rows(&self) -> usize {
        self.first.0.max(self.second.0)
    }
}

/// Evaluate every given schema for a byline of `n` authors.
pub fn model_schemas(n: usize, schemas: &[Schema]) -> Result<SchemaModel> {
    check_model_size(n)?;
    let columns = schemas
        .iter()
        .map(|&schema| {
            Ok(SchemaColumn {
                schema,
                credits: schema.credits(n)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SchemaModel {
        author_count: n,
        columns,
    })
}

/// Evaluate one schema at two author counts. The counts must differ.
pub fn compare_author_counts(schema: Schema, n1: usize, n2: usize) -> Result<AuthorCountComparison> {
    if n1 == n2 {
        bail!("Author counts must differ (both are {})", n1);
    }
    check_model_size(n1)?;
    check_model_size(n2)?;
    Ok(AuthorCountComparison {
        schema,
        first: (n1, schema.credits(n1)?),
        second: (n2, schema.credits(n2)?),
    })
}

fn check_model_size(n: usize) -> Result<()> {
    if n > MAX_MODEL_AUTHORS {
        bail!("Author count {} exceeds the modeler limit of {}", n, MAX_MODEL_AUTHORS);
    }
    Ok(())
}
