// WHY: Centralized abbreviation handling for sentence segmentation
// Month abbreviations and titles end in a period that must never close a sentence

/// Spanish month abbreviations, plus the capitalized form of the December one
pub const SPANISH_MONTH_ABBREVIATIONS: &[&str] = &[
    "dic", "Dic", "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov",
];

/// English month abbreviations not already covered by the Spanish list, in both cases
pub const ENGLISH_MONTH_ABBREVIATIONS: &[&str] = &[
    "dec", "Dec", "jan", "Jan", "Feb", "Mar", "apr", "Apr", "Jun", "Jul", "aug", "Aug", "Sep", "Oct", "Nov",
];

/// Honorific titles that usually precede a proper noun
pub const TITLE_ABBREVIATIONS: &[&str] = &["Sr", "Sra", "Dr", "Dra", "Mr", "Mrs", "Ms"];

/// Placeholder written over a protected period
///
/// It is a single byte like the period it replaces, so byte offsets in the
/// protected text are identical to offsets in the original, and it is neither
/// punctuation nor whitespace.
pub const SENTINEL: char = '\u{1A}';

/// Hides the period of every known "<abbreviation>." occurrence
#[derive(Debug, Clone)]
pub struct AbbreviationProtector {
    /// Literal "<abbreviation>." forms, matched case-sensitively as plain substrings
    /// (so "Omar." is protected through "mar.")
    dotted: Vec<String>,
}

impl AbbreviationProtector {
    /// Create a protector with the default month and title sets
    pub fn new() -> Self {
        Self::with_abbreviations(
            SPANISH_MONTH_ABBREVIATIONS
                .iter()
                .chain(ENGLISH_MONTH_ABBREVIATIONS)
                .chain(TITLE_ABBREVIATIONS)
                .copied(),
        )
    }

    /// Create a protector for a custom abbreviation set (given without the trailing period)
    pub fn with_abbreviations<S: AsRef<str>>(abbreviations: impl IntoIterator<Item = S>) -> Self {
        let dotted = abbreviations
            .into_iter()
            .map(|a| format!("{}.", a.as_ref()))
            .collect();
        Self { dotted }
    }

    /// Replace the period of each literal "<abbreviation>." with [`SENTINEL`]
    ///
    /// Occurrences are literal substrings, so back-to-back abbreviations are each
    /// protected. The output has exactly the byte length of the input.
    pub fn protect(&self, text: &str) -> String {
        let mut protected = text.to_string();
        for dotted in &self.dotted {
            if !protected.contains(dotted.as_str()) {
                continue;
            }
            let stem = &dotted[..dotted.len() - 1];
            protected = protected.replace(dotted.as_str(), &format!("{stem}{SENTINEL}"));
        }
        protected
    }
}

impl Default for AbbreviationProtector {
    fn default() -> Self {
        Self::new()
    }
}
