pub mod annotate;
pub mod config;
pub mod corpus;
pub mod metrics;
pub mod output;
pub mod schema;
