// WHY: Ordered catalog of December 31st reference patterns, compiled once and shared read-only
// Category order is significant: deduplication keeps the first category that reports a span

use regex_automata::{meta::Regex, util::syntax};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::error::CatalogConstructionError;
use crate::span::Span;

/// The five fixed pattern groupings, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FullNameFlexible,
    AbbreviatedNameFlexible,
    Numeric,
    WithYear,
    Strict,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::FullNameFlexible,
        Category::AbbreviatedNameFlexible,
        Category::Numeric,
        Category::WithYear,
        Category::Strict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FullNameFlexible => "full_name_flexible",
            Category::AbbreviatedNameFlexible => "abbreviated_name_flexible",
            Category::Numeric => "numeric",
            Category::WithYear => "with_year",
            Category::Strict => "strict",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Compositional pattern components
const FULL_MONTH: &str = r"(?:diciembre|december)";
const ABBREVIATED_MONTH: &str = r"(?:dic\.?|dec\.?)";
const ANY_MONTH: &str = r"(?:diciembre|december|dic\.?|dec\.?)";
const SPELLED_DAY: &str = r"(?:treinta\s+y\s+uno|thirty[\s\-]?first)";
const DATE_SEPARATOR: &str = r"[/\-.\s]";
const YEAR: &str = r"(?:19|20)\d{2}";
const SHORT_OR_LONG_YEAR: &str = r"(?:\d{2}|\d{4})";

/// Pattern sources for every category, in catalog and declaration order
pub fn default_definitions() -> Vec<(Category, Vec<String>)> {
    // Filler windows: 25 chars for full month names, 15 for abbreviations,
    // up to 30/20 when a trailing year is required
    let full_name_flexible = vec![
        format!(r"\b31\b.{{0,25}}?\b{FULL_MONTH}\b"),
        format!(r"\b{FULL_MONTH}\b.{{0,25}}?\b31\b"),
        format!(r"\b{SPELLED_DAY}\b.{{0,25}}?\b{FULL_MONTH}\b"),
        format!(r"\b{FULL_MONTH}\b.{{0,25}}?\b{SPELLED_DAY}\b"),
    ];

    let abbreviated_name_flexible = vec![
        format!(r"\b31\b.{{0,15}}?\b{ABBREVIATED_MONTH}\b"),
        format!(r"\b{ABBREVIATED_MONTH}\b.{{0,15}}?\b31\b"),
    ];

    let numeric = vec![
        format!(r"\b31{DATE_SEPARATOR}12\b"),
        format!(r"\b12{DATE_SEPARATOR}31\b"),
    ];

    let with_year = vec![
        format!(r"\b31\b.{{0,30}}?\b{ANY_MONTH}\b.{{0,20}}?\b{YEAR}\b"),
        format!(r"\b{ANY_MONTH}\b.{{0,15}}?\b31\b.{{0,15}}?\b{YEAR}\b"),
        format!(r"\b31{DATE_SEPARATOR}12{DATE_SEPARATOR}{SHORT_OR_LONG_YEAR}\b"),
        format!(r"\b12{DATE_SEPARATOR}31{DATE_SEPARATOR}{SHORT_OR_LONG_YEAR}\b"),
    ];

    let strict = vec![
        r"\b31\s+de\s+diciembre\b".to_string(),
        r"\b31\s+(?:de\s+)?diciembre\b".to_string(),
        r"\bdiciembre\s+31\b".to_string(),
    ];

    vec![
        (Category::FullNameFlexible, full_name_flexible),
        (Category::AbbreviatedNameFlexible, abbreviated_name_flexible),
        (Category::Numeric, numeric),
        (Category::WithYear, with_year),
        (Category::Strict, strict),
    ]
}

/// One occurrence reported by a single pattern, before deduplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch<'s> {
    pub text: &'s str,
    pub category: Category,
    /// Position of the reporting pattern within its category
    pub pattern_index: usize,
    pub span: Span,
}

/// A named group of compiled patterns
#[derive(Debug, Clone)]
pub struct PatternCategory {
    category: Category,
    patterns: Vec<Regex>,
}

impl PatternCategory {
    fn compile<S: AsRef<str>>(
        category: Category,
        sources: impl IntoIterator<Item = S>,
    ) -> Result<Self, CatalogConstructionError> {
        let sources: Vec<String> = sources.into_iter().map(|s| s.as_ref().to_string()).collect();
        if sources.is_empty() {
            return Err(CatalogConstructionError::EmptyCategory(category.as_str()));
        }

        let patterns = sources
            .iter()
            .enumerate()
            .map(|(index, source)| compile_pattern(category, index, source))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Compiled {} patterns for category {}", patterns.len(), category);
        Ok(Self { category, patterns })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Run every pattern in declaration order, appending its non-overlapping matches
    pub fn find_into<'s>(&self, sentence: &'s str, out: &mut Vec<RawMatch<'s>>) {
        for (pattern_index, pattern) in self.patterns.iter().enumerate() {
            for found in pattern.find_iter(sentence) {
                out.push(RawMatch {
                    text: &sentence[found.range()],
                    category: self.category,
                    pattern_index,
                    span: Span::from(found.range()),
                });
            }
        }
    }
}

fn compile_pattern(
    category: Category,
    index: usize,
    source: &str,
) -> Result<Regex, CatalogConstructionError> {
    // WHY: filler windows must be able to cross line breaks inside a sentence
    Regex::builder()
        .syntax(
            syntax::Config::new()
                .case_insensitive(true)
                .dot_matches_new_line(true),
        )
        .build(source)
        .map_err(|source| CatalogConstructionError::InvalidPattern {
            category: category.as_str(),
            index,
            source: Box::new(source),
        })
}

/// Immutable, ordered set of pattern categories
///
/// Built once at startup and shared by reference (typically behind an `Arc`)
/// across every document processed; matching never mutates it.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    categories: Vec<PatternCategory>,
}

impl PatternCatalog {
    /// Compile the default five-category catalog
    pub fn new() -> Result<Self, CatalogConstructionError> {
        Self::from_definitions(default_definitions())
    }

    /// Compile a catalog from explicit (category, patterns) definitions
    ///
    /// Declaration order becomes tie-break order. Fails on the first pattern
    /// that does not compile, on a repeated category, or on an empty category.
    pub fn from_definitions<D, P, S>(definitions: D) -> Result<Self, CatalogConstructionError>
    where
        D: IntoIterator<Item = (Category, P)>,
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories: Vec<PatternCategory> = Vec::new();
        for (category, sources) in definitions {
            if categories.iter().any(|c| c.category == category) {
                return Err(CatalogConstructionError::DuplicateCategory(category.as_str()));
            }
            categories.push(PatternCategory::compile(category, sources)?);
        }

        let catalog = Self { categories };
        info!(
            "Compiled pattern catalog: {} categories, {} patterns",
            catalog.categories.len(),
            catalog.pattern_count()
        );
        Ok(catalog)
    }

    pub fn categories(&self) -> &[PatternCategory] {
        &self.categories
    }

    pub fn pattern_count(&self) -> usize {
        self.categories.iter().map(PatternCategory::len).sum()
    }

    /// Every raw match in the sentence, ordered by category then pattern declaration
    ///
    /// Different patterns may report overlapping or identical spans; that is
    /// resolved by deduplication, not here.
    pub fn find_raw_matches<'s>(&self, sentence: &'s str) -> Vec<RawMatch<'s>> {
        let mut matches = Vec::new();
        for category in &self.categories {
            category.find_into(sentence, &mut matches);
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    static SHARED_CATALOG: OnceLock<PatternCatalog> = OnceLock::new();

    fn get_catalog() -> &'static PatternCatalog {
        SHARED_CATALOG.get_or_init(|| PatternCatalog::new().unwrap())
    }

    fn texts_in(sentence: &str, category: Category) -> Vec<String> {
        get_catalog()
            .find_raw_matches(sentence)
            .into_iter()
            .filter(|m| m.category == category)
            .map(|m| m.text.to_string())
            .collect()
    }

    #[test]
    fn test_default_catalog_order() {
        let catalog = get_catalog();
        let order: Vec<Category> = catalog.categories().iter().map(|c| c.category()).collect();
        assert_eq!(order, Category::ALL.to_vec());
        assert_eq!(catalog.pattern_count(), 15);
    }

    #[test]
    fn test_category_names() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            ["full_name_flexible", "abbreviated_name_flexible", "numeric", "with_year", "strict"]
        );
        assert_eq!(
            serde_json::to_string(&Category::WithYear).unwrap(),
            "\"with_year\""
        );
    }

    #[test]
    fn test_full_name_both_orders() {
        assert_eq!(texts_in("vence el 31 de diciembre", Category::FullNameFlexible), ["31 de diciembre"]);
        assert_eq!(texts_in("Due December 31, 2025", Category::FullNameFlexible), ["December 31"]);
    }

    #[test]
    fn test_full_name_spelled_day_case_insensitive() {
        assert_eq!(
            texts_in("el TREINTA Y UNO de Diciembre", Category::FullNameFlexible),
            ["TREINTA Y UNO de Diciembre"]
        );
        assert_eq!(
            texts_in("on the thirty-first of December", Category::FullNameFlexible),
            ["thirty-first of December"]
        );
    }

    #[test]
    fn test_filler_crosses_line_breaks() {
        assert_eq!(texts_in("31\nde\ndiciembre", Category::FullNameFlexible), ["31\nde\ndiciembre"]);
    }

    #[test]
    fn test_filler_window_is_bounded() {
        let sentence = format!("31 {} diciembre", "a".repeat(26));
        assert!(get_catalog().find_raw_matches(&sentence).is_empty());
    }

    #[test]
    fn test_abbreviated_month() {
        assert_eq!(texts_in("entrega 31 dic. 2025", Category::AbbreviatedNameFlexible), ["31 dic"]);
        assert_eq!(texts_in("Dec 31", Category::AbbreviatedNameFlexible), ["Dec 31"]);
        // "dic" inside a longer word is not an abbreviation
        assert!(texts_in("31 de diciembre", Category::AbbreviatedNameFlexible).is_empty());
    }

    #[test]
    fn test_numeric_separators() {
        for sentence in ["31/12", "31-12", "31.12", "31 12", "12/31"] {
            assert_eq!(texts_in(sentence, Category::Numeric), [sentence], "separator in {sentence:?}");
        }
        assert!(texts_in("131/12", Category::Numeric).is_empty());
        assert!(texts_in("31/123", Category::Numeric).is_empty());
    }

    #[test]
    fn test_with_year_forms() {
        assert_eq!(texts_in("31/12/2025", Category::WithYear), ["31/12/2025"]);
        assert_eq!(texts_in("12-31-25", Category::WithYear), ["12-31-25"]);
        assert_eq!(texts_in("31 dic. 2025", Category::WithYear), ["31 dic. 2025"]);
        assert_eq!(texts_in("diciembre 31, 2025", Category::WithYear), ["diciembre 31, 2025"]);
        assert!(texts_in("31 de diciembre de 2125", Category::WithYear).is_empty());
    }

    #[test]
    fn test_strict_patterns_report_identical_spans() {
        let matches: Vec<RawMatch> = get_catalog()
            .find_raw_matches("31 de diciembre")
            .into_iter()
            .filter(|m| m.category == Category::Strict)
            .collect();
        // "31 de diciembre" and "31 (de)? diciembre" both fire on the same text
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].span, matches[1].span);
        assert_eq!(matches[0].pattern_index, 0);
        assert_eq!(matches[1].pattern_index, 1);
    }

    #[test]
    fn test_raw_matches_follow_catalog_order() {
        let matches = get_catalog().find_raw_matches("Vigencia: 31/12/2025.");
        let categories: Vec<Category> = matches.iter().map(|m| m.category).collect();
        assert_eq!(categories, [Category::Numeric, Category::WithYear]);
    }

    #[test]
    fn test_malformed_pattern_fails_construction() {
        let result = PatternCatalog::from_definitions([(Category::Numeric, ["(unclosed"])]);
        match result {
            Err(CatalogConstructionError::InvalidPattern { category, index, .. }) => {
                assert_eq!(category, "numeric");
                assert_eq!(index, 0);
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_and_empty_categories_rejected() {
        let duplicate = PatternCatalog::from_definitions([
            (Category::Strict, vec!["31"]),
            (Category::Strict, vec!["12"]),
        ]);
        assert!(matches!(duplicate, Err(CatalogConstructionError::DuplicateCategory("strict"))));

        let empty = PatternCatalog::from_definitions([(Category::Numeric, Vec::<&str>::new())]);
        assert!(matches!(empty, Err(CatalogConstructionError::EmptyCategory("numeric"))));
    }
}
