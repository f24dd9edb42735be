pub mod document;
pub mod filter;
pub mod normalize;
pub mod reader;
pub mod record;

pub use document::{Document, DocumentMeta};
pub use filter::{summarize, CorpusSummary, DocumentFilter, FilterReport, YearRange};
pub use normalize::{normalize_corpus, normalize_record, parse_author_ids, NormalizeReport, NormalizedCorpus, RecordError};
pub use reader::{expand_corpus_paths, read_corpus, read_researchers, ResearcherList};
pub use record::RawRecord;
