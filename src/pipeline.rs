// WHY: Orchestrates document -> text -> sentences -> matches for one document
// Malformed documents degrade to a best-effort result; nothing here returns an error

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::dedup::{Match, MatchDeduplicator, MatchOrder};
use crate::error::CatalogConstructionError;
use crate::patterns::PatternCatalog;
use crate::resolver::DocumentTextResolver;
use crate::segmenter::SentenceSegmenter;
use crate::span::Span;

/// A sentence with at least one deduplicated match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceResult {
    pub sentence: String,
    pub matches: Vec<Match>,
    /// Byte span of the sentence within the resolved document text
    #[serde(skip)]
    pub span: Span,
}

/// Sentences with matches, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub total_sentences_found: usize,
    pub sentences: Vec<SentenceResult>,
}

impl ExtractionResult {
    fn from_sentences(sentences: Vec<SentenceResult>) -> Self {
        Self {
            total_sentences_found: sentences.len(),
            sentences,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Total matches across all sentences
    pub fn match_count(&self) -> usize {
        self.sentences.iter().map(|s| s.matches.len()).sum()
    }
}

/// Runs resolver, segmenter, catalog and deduplicator over one document
///
/// Holds the catalog behind an `Arc` so one compiled catalog serves every
/// pipeline and every thread.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    catalog: Arc<PatternCatalog>,
    resolver: DocumentTextResolver,
    segmenter: SentenceSegmenter,
    deduplicator: MatchDeduplicator,
}

impl ExtractionPipeline {
    /// Build a pipeline around a shared catalog
    ///
    /// Fails only if the sentence boundary patterns do not compile.
    pub fn new(catalog: Arc<PatternCatalog>) -> Result<Self, CatalogConstructionError> {
        Ok(Self {
            catalog,
            resolver: DocumentTextResolver::new(),
            segmenter: SentenceSegmenter::with_default_rules()?,
            deduplicator: MatchDeduplicator::default(),
        })
    }

    pub fn with_match_order(mut self, order: MatchOrder) -> Self {
        self.deduplicator = MatchDeduplicator::new(order);
        self
    }

    /// Resolve the document text, as the first stage of [`Self::extract`] does
    pub fn resolve_text(&self, document: &Value) -> String {
        self.resolver.resolve(document)
    }

    /// Extract every sentence referencing the target date from a document
    pub fn extract(&self, document: &Value) -> ExtractionResult {
        let text = self.resolve_text(document);
        self.extract_text(&text)
    }

    /// Extract from already-resolved text
    pub fn extract_text(&self, text: &str) -> ExtractionResult {
        let sentences: Vec<SentenceResult> = self
            .segmenter
            .segment(text)
            .into_iter()
            .filter_map(|sentence| {
                let raw_matches = self.catalog.find_raw_matches(sentence.text);
                let matches = self.deduplicator.deduplicate(raw_matches);
                (!matches.is_empty()).then(|| SentenceResult {
                    sentence: sentence.text.to_string(),
                    matches,
                    span: sentence.span,
                })
            })
            .collect();

        debug!("Found {} sentences with date references", sentences.len());
        ExtractionResult::from_sentences(sentences)
    }
}
