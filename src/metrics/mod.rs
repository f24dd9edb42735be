pub mod aggregate;
pub mod researcher;

pub use aggregate::{aggregate_researcher, aggregate_researchers};
pub use researcher::{dedup_researchers, ResearcherEntry, ResearcherMetrics};
