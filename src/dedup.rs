// WHY: Collapses identical-span matches reported by different patterns or categories
// The first category (in catalog order) to report a span keeps it

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::patterns::{Category, RawMatch};
use crate::span::Span;

/// A deduplicated match within one sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub text: String,
    pub category: Category,
    /// Byte span within the sentence text; not part of the serialized output
    #[serde(skip)]
    pub span: Span,
}

/// Ordering of the deduplicated matches of one sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchOrder {
    /// Order of acceptance: category order, then pattern order, then position
    #[default]
    Discovery,
    /// Stable re-sort by span start after deduplication
    Positional,
}

/// Keeps the first match seen for each exact span
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchDeduplicator {
    order: MatchOrder,
}

impl MatchDeduplicator {
    pub fn new(order: MatchOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> MatchOrder {
        self.order
    }

    /// Deduplicate raw matches that arrive in catalog order
    ///
    /// Spans that only overlap are all kept; only byte-identical spans collapse.
    pub fn deduplicate<'s>(&self, raw_matches: impl IntoIterator<Item = RawMatch<'s>>) -> Vec<Match> {
        let mut seen: HashSet<Span> = HashSet::new();
        let mut kept: Vec<Match> = raw_matches
            .into_iter()
            .filter(|raw| seen.insert(raw.span))
            .map(|raw| Match {
                text: raw.text.to_string(),
                category: raw.category,
                span: raw.span,
            })
            .collect();

        if self.order == MatchOrder::Positional {
            kept.sort_by_key(|m| m.span.start);
        }
        kept
    }
}
