// WHY: Abbreviation-safe sentence segmentation over resolved document text
// Boundaries are lexical only: terminal punctuation, line breaks, paragraph breaks

use regex_automata::meta::Regex;
use tracing::debug;

pub mod abbreviations;

pub use abbreviations::{AbbreviationProtector, SENTINEL};

use crate::error::CatalogConstructionError;
use crate::span::Span;

/// A trimmed sentence borrowed from the text it was segmented from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub index: usize,
    /// Display form: the fragment with surrounding whitespace removed
    pub text: &'a str,
    /// Location of `text` within the segmented text
    pub span: Span,
}

/// Configuration for sentence boundary detection
#[derive(Debug, Clone)]
pub struct SegmentationRules {
    /// Characters that can end a sentence
    pub terminal_punctuation: Vec<char>,
    /// Consecutive line feeds that split even without terminal punctuation
    pub paragraph_break_len: usize,
}

impl Default for SegmentationRules {
    fn default() -> Self {
        Self {
            terminal_punctuation: vec!['.', '!', '?'],
            paragraph_break_len: 2,
        }
    }
}

impl SegmentationRules {
    /// Boundary patterns, in priority order for matches starting at the same byte
    fn boundary_patterns(&self) -> [String; 3] {
        let terminal: String = self
            .terminal_punctuation
            .iter()
            .map(|c| format!("\\x{{{:X}}}", u32::from(*c)))
            .collect();
        [
            format!(r"[{terminal}]\s+\p{{Lu}}"),
            format!(r"[{terminal}]\s*\n"),
            format!(r"\n{{{},}}", self.paragraph_break_len.max(1)),
        ]
    }
}

// Indices into `SegmentationRules::boundary_patterns`
const BEFORE_UPPERCASE: usize = 0;
const BEFORE_LINE_BREAK: usize = 1;

/// Splits text into sentence-like units
///
/// A boundary is any of:
/// - terminal punctuation, whitespace, then an upper-case letter
/// - terminal punctuation followed (after optional whitespace) by line breaks
/// - a run of at least `paragraph_break_len` line feeds
///
/// "Upper-case" is any Unicode upper-case letter, so `Él` or `Ñ` open a sentence.
/// Periods belonging to known abbreviations are masked first so they never
/// act as terminal punctuation.
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    boundaries: Regex,
    protector: AbbreviationProtector,
}

impl SentenceSegmenter {
    pub fn new(rules: &SegmentationRules, protector: AbbreviationProtector) -> Result<Self, CatalogConstructionError> {
        let patterns = rules.boundary_patterns();
        let boundaries = Regex::new_many(&patterns).map_err(|source| {
            CatalogConstructionError::InvalidBoundaryPattern {
                source: Box::new(source),
            }
        })?;
        debug!("Compiled sentence boundary patterns: {:?}", patterns);
        Ok(Self { boundaries, protector })
    }

    /// Create segmenter with default rules and abbreviation sets
    pub fn with_default_rules() -> Result<Self, CatalogConstructionError> {
        Self::new(&SegmentationRules::default(), AbbreviationProtector::default())
    }

    /// Segment text into ordered, trimmed, non-empty sentences
    ///
    /// Text with no boundary yields a single sentence equal to the trimmed input,
    /// or nothing if the input is blank.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<Sentence<'a>> {
        // WHY: the protected copy has identical byte offsets, so fragments found in it
        // are sliced out of the original text and sentinels never reach the output
        let protected = self.protector.protect(text);
        debug_assert_eq!(protected.len(), text.len());

        let mut sentences = Vec::new();
        let mut fragment_start = 0;

        for found in self.boundaries.find_iter(protected.as_str()) {
            // Punctuation stays with the sentence it closes
            let punctuation_end = found.start() + protected[found.start()..].chars().next().map_or(0, char::len_utf8);
            let (fragment_end, next_start) = match found.pattern().as_usize() {
                BEFORE_UPPERCASE => {
                    let capital_len = protected[..found.end()].chars().next_back().map_or(0, char::len_utf8);
                    (punctuation_end, found.end() - capital_len)
                }
                BEFORE_LINE_BREAK => (punctuation_end, found.end()),
                _ => (found.start(), found.end()),
            };
            push_fragment(text, Span::new(fragment_start, fragment_end), &mut sentences);
            fragment_start = next_start;
        }
        push_fragment(text, Span::new(fragment_start, protected.len()), &mut sentences);

        debug!("Segmented {} bytes into {} sentences", text.len(), sentences.len());
        sentences
    }
}

fn push_fragment<'a>(text: &'a str, fragment: Span, sentences: &mut Vec<Sentence<'a>>) {
    let raw = &text[fragment.start..fragment.end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let start = fragment.start + (raw.len() - raw.trim_start().len());
    sentences.push(Sentence {
        index: sentences.len(),
        text: trimmed,
        span: Span::new(start, start + trimmed.len()),
    });
}
