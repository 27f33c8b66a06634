pub mod dedup;
pub mod discovery;
pub mod error;
pub mod incremental;
pub mod parallel_processing;
pub mod patterns;
pub mod pipeline;
pub mod reader;
pub mod resolver;
pub mod restart_log;
pub mod segmenter;
pub mod selection;
pub mod span;

// Re-export main types for convenient access
pub use dedup::{Match, MatchDeduplicator, MatchOrder};
pub use error::{CatalogConstructionError, DocumentParseError};
pub use patterns::{Category, PatternCatalog, RawMatch};
pub use pipeline::{ExtractionPipeline, ExtractionResult, SentenceResult};
pub use resolver::{DocumentShape, DocumentTextResolver};
pub use segmenter::{Sentence, SentenceSegmenter};
pub use span::Span;

// Re-export batch processing types and functions
pub use incremental::{generate_candidates_path, CandidatesFile};
pub use parallel_processing::{process_files_parallel, FileStats, ProcessingConfig, RunStats};
pub use selection::{parse_selection_reply, run_selection, SelectionRequest, SelectionResponse, SentenceSelector};
