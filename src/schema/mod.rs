pub mod catalogue;
pub mod formulas;
pub mod model;

pub use catalogue::{parse_schemas, Schema, SchemaError, UnknownSchema};
pub use model::{
    compare_author_counts, model_schemas, AuthorCountComparison, SchemaColumn, SchemaModel, MAX_MODEL_AUTHORS,
};
