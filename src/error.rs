// WHY: Typed errors for the extraction core; I/O and batch layers wrap these in anyhow
// Only catalog construction is allowed to fail visibly, document errors are absorbed

use thiserror::Error;

/// Raised while compiling the pattern catalog or the sentence boundaries at startup
#[derive(Debug, Error)]
pub enum CatalogConstructionError {
    #[error("pattern {index} in category `{category}` failed to compile: {source}")]
    InvalidPattern {
        category: &'static str,
        index: usize,
        #[source]
        source: Box<regex_automata::meta::BuildError>,
    },

    #[error("category `{0}` is declared more than once")]
    DuplicateCategory(&'static str),

    #[error("category `{0}` has no patterns")]
    EmptyCategory(&'static str),

    #[error("sentence boundary patterns failed to compile: {source}")]
    InvalidBoundaryPattern {
        #[source]
        source: Box<regex_automata::meta::BuildError>,
    },
}

/// Raised when a document does not fit the shape it claims to have
/// WHY: never leaves the resolver; it triggers the textual fallback instead
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentParseError {
    #[error("document root is not a mapping")]
    NotAMapping,

    #[error("field `{field}` must be {expected}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
    },
}

impl DocumentParseError {
    pub(crate) fn unexpected(field: impl Into<String>, expected: &'static str) -> Self {
        Self::UnexpectedType {
            field: field.into(),
            expected,
        }
    }
}
