use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::formulas;

/// A credit-allocation schema.
///
/// Each variant maps to exactly one formula in [`formulas`] through
/// [`Schema::formula`]; the match there is the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Schema {
    #[serde(rename = "fractional_equal")]
    FractionalEqual,
    #[serde(rename = "fractional_LAE")]
    FractionalLae,
    #[serde(rename = "fractional_FAE")]
    FractionalFae,
    #[serde(rename = "fractional_FLAE")]
    FractionalFlae,
    #[serde(rename = "arithmetic_standard")]
    ArithmeticStandard,
    #[serde(rename = "arithmetic_V")]
    ArithmeticV,
    #[serde(rename = "golden_share")]
    GoldenShare,
    #[serde(rename = "geometric_standard")]
    GeometricStandard,
    #[serde(rename = "geometric_adaptive")]
    GeometricAdaptive,
    #[serde(rename = "harmonic_standard")]
    HarmonicStandard,
    #[serde(rename = "harmonic_FLAE")]
    HarmonicFlae,
    #[serde(rename = "harmonic_parabolic")]
    HarmonicParabolic,
    #[serde(rename = "harmonic_LAB")]
    HarmonicLab,
}

/// Errors raised while computing a credit vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{schema} is undefined for {n} author(s); needs at least {min}")]
    Domain { schema: Schema, n: usize, min: usize },

    #[error("{schema} produced {actual} credits for {expected} author(s)")]
    LengthMismatch {
        schema: Schema,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown schema '{0}'")]
pub struct UnknownSchema(pub String);

impl Schema {
    /// Every schema, in report column order.
    pub const ALL: [Schema; 13] = [
        Schema::FractionalEqual,
        Schema::FractionalLae,
        Schema::FractionalFae,
        Schema::FractionalFlae,
        Schema::ArithmeticStandard,
        Schema::ArithmeticV,
        Schema::GoldenShare,
        Schema::GeometricStandard,
        Schema::GeometricAdaptive,
        Schema::HarmonicStandard,
        Schema::HarmonicFlae,
        Schema::HarmonicParabolic,
        Schema::HarmonicLab,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Schema::FractionalEqual => "fractional_equal",
            Schema::FractionalLae => "fractional_LAE",
            Schema::FractionalFae => "fractional_FAE",
            Schema::FractionalFlae => "fractional_FLAE",
            Schema::ArithmeticStandard => "arithmetic_standard",
            Schema::ArithmeticV => "arithmetic_V",
            Schema::GoldenShare => "golden_share",
            Schema::GeometricStandard => "geometric_standard",
            Schema::GeometricAdaptive => "geometric_adaptive",
            Schema::HarmonicStandard => "harmonic_standard",
            Schema::HarmonicFlae => "harmonic_FLAE",
            Schema::HarmonicParabolic => "harmonic_parabolic",
            Schema::HarmonicLab => "harmonic_LAB",
        }
    }

    /// One-line description for the `schemas` listing.
    pub fn description(self) -> &'static str {
        match self {
            Schema::FractionalEqual => "every author gets 1/n",
            Schema::FractionalLae => "last author 0.5, the rest split 0.5 equally",
            Schema::FractionalFae => "first author 0.5, the rest split 0.5 equally",
            Schema::FractionalFlae => "first and last 0.4 each, middle authors split 0.2",
            Schema::ArithmeticStandard => "credit falls linearly with rank",
            Schema::ArithmeticV => "linear credit, highest at both ends of the byline",
            Schema::GoldenShare => "powers of 0.618 (sums to just under 1)",
            Schema::GeometricStandard => "each author gets twice the next author's credit",
            Schema::GeometricAdaptive => "geometric ratio n^(1/(n-1)) shrinking with byline length",
            Schema::HarmonicStandard => "credit proportional to 1/rank",
            Schema::HarmonicFlae => "harmonic with first and last authors sharing the top terms",
            Schema::HarmonicParabolic => "harmonic mirrored around the middle author",
            Schema::HarmonicLab => "harmonic with a fitted last-author bonus",
        }
    }

    /// Smallest author count the schema accepts.
    ///
    /// All current formulas special-case a single author, so this is 1 across
    /// the board; formulas dividing by `n - 1` without such a branch would
    /// raise it to 2.
    pub fn min_authors(self) -> usize {
        1
    }

    fn formula(self) -> fn(usize) -> Vec<f64> {
        match self {
            Schema::FractionalEqual => formulas::fractional_equal,
            Schema::FractionalLae => formulas::fractional_lae,
            Schema::FractionalFae => formulas::fractional_fae,
            Schema::FractionalFlae => formulas::fractional_flae,
            Schema::ArithmeticStandard => formulas::arithmetic_standard,
            Schema::ArithmeticV => formulas::arithmetic_v,
            Schema::GoldenShare => formulas::golden_share,
            Schema::GeometricStandard => formulas::geometric_standard,
            Schema::GeometricAdaptive => formulas::geometric_adaptive,
            Schema::HarmonicStandard => formulas::harmonic_standard,
            Schema::HarmonicFlae => formulas::harmonic_flae,
            Schema::HarmonicParabolic => formulas::harmonic_parabolic,
            Schema::HarmonicLab => formulas::harmonic_lab,
        }
    }

    /// Credit vector for a byline of `n` authors, indexed by rank.
    pub fn credits(self, n: usize) -> Result<Vec<f64>, SchemaError> {
        let min = self.min_authors();
        if n < min {
            return Err(SchemaError::Domain { schema: self, n, min });
        }
        let credits = (self.formula())(n);
        if credits.len() != n {
            return Err(SchemaError::LengthMismatch {
                schema: self,
                expected: n,
                actual: credits.len(),
            });
        }
        Ok(credits)
    }

    /// Whether the vector is normalized to 1 by construction.
    pub fn sums_to_one(self) -> bool {
        !matches!(self, Schema::GoldenShare)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Schema {
    type Err = UnknownSchema;

    /// Case-insensitive match on the schema name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Schema::ALL
            .into_iter()
            .find(|schema| schema.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSchema(wanted.to_string()))
    }
}

/// Parse a list of schema names, collecting every unknown name.
pub fn parse_schemas<S: AsRef<str>>(names: &[S]) -> Result<Vec<Schema>, Vec<UnknownSchema>> {
    let mut schemas = Vec::new();
    let mut unknown = Vec::new();
    for name in names {
        match name.as_ref().parse::<Schema>() {
            Ok(schema) if !schemas.contains(&schema) => schemas.push(schema),
            Ok(_) => {}
            Err(e) => unknown.push(e),
        }
    }
    if unknown.is_empty() {
        Ok(schemas)
    } else {
        Err(unknown)
    }
}
