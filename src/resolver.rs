// WHY: Turns the heterogeneous document representation into one newline-joined text stream
// Shape detection is an ordered list of predicates with a one-level generic fallback

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::DocumentParseError;

/// Known document layouts, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// `{"pages": [ "text" | {"text": ...}, ... ]}`
    Pages,
    /// `{"document": {"paragraphs": [ {"text": ...}, ... ]}}`
    Paragraphs,
    /// `{"text": "..."}`
    FlatText,
    /// `{"content": "..."}`
    FlatContent,
    /// Any other mapping: collect top-level strings and list items, one level deep
    Fallback,
}

impl DocumentShape {
    /// Detect the first shape whose predicate holds, `None` when the root is not a mapping
    pub fn detect(document: &Value) -> Option<Self> {
        let root = document.as_object()?;
        let shape = if root.contains_key("pages") {
            Self::Pages
        } else if root
            .get("document")
            .and_then(Value::as_object)
            .is_some_and(|inner| inner.contains_key("paragraphs"))
        {
            Self::Paragraphs
        } else if root.contains_key("text") {
            Self::FlatText
        } else if root.contains_key("content") {
            Self::FlatContent
        } else {
            Self::Fallback
        };
        Some(shape)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Paragraphs => "paragraphs",
            Self::FlatText => "text",
            Self::FlatContent => "content",
            Self::Fallback => "fallback",
        }
    }
}

/// Extracts a single text string from a document representation
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTextResolver;

impl DocumentTextResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the document text, never failing
    ///
    /// A document that does not fit the shape it was detected as is rendered
    /// as a whole instead, so extraction can still run over its contents.
    pub fn resolve(&self, document: &Value) -> String {
        match self.try_resolve(document) {
            Ok(text) => text,
            Err(error) => {
                warn!("Document text resolution failed, using textual rendering: {}", error);
                render_document(document)
            }
        }
    }

    /// Resolve the document text, reporting a shape mismatch as an error
    pub fn try_resolve(&self, document: &Value) -> Result<String, DocumentParseError> {
        let shape = DocumentShape::detect(document).ok_or(DocumentParseError::NotAMapping)?;
        debug!("Resolving document with shape {}", shape.as_str());

        // `detect` returned Some, so the root is a mapping
        let root = document.as_object().ok_or(DocumentParseError::NotAMapping)?;
        match shape {
            DocumentShape::Pages => resolve_pages(root),
            DocumentShape::Paragraphs => resolve_paragraphs(root),
            DocumentShape::FlatText => string_field(root, "text"),
            DocumentShape::FlatContent => string_field(root, "content"),
            DocumentShape::Fallback => resolve_fallback(root),
        }
    }
}

fn resolve_pages(root: &Map<String, Value>) -> Result<String, DocumentParseError> {
    let pages = root
        .get("pages")
        .and_then(Value::as_array)
        .ok_or_else(|| DocumentParseError::unexpected("pages", "a list"))?;

    let mut parts = Vec::with_capacity(pages.len());
    for page in pages {
        match page {
            Value::String(text) => parts.push(text.as_str()),
            Value::Object(fields) if fields.contains_key("text") => {
                parts.push(text_of(fields, "pages[].text")?);
            }
            // Pages without text (images, empty objects, numbers) contribute nothing
            _ => {}
        }
    }
    Ok(parts.join("\n"))
}

fn resolve_paragraphs(root: &Map<String, Value>) -> Result<String, DocumentParseError> {
    let paragraphs = root
        .get("document")
        .and_then(|document| document.get("paragraphs"))
        .and_then(Value::as_array)
        .ok_or_else(|| DocumentParseError::unexpected("document.paragraphs", "a list"))?;

    let mut parts = Vec::with_capacity(paragraphs.len());
    for paragraph in paragraphs {
        // Entries that are not mappings with text are skipped
        if let Some(fields) = paragraph.as_object().filter(|fields| fields.contains_key("text")) {
            parts.push(text_of(fields, "document.paragraphs[].text")?);
        }
    }
    Ok(parts.join("\n"))
}

fn string_field(root: &Map<String, Value>, field: &str) -> Result<String, DocumentParseError> {
    root.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DocumentParseError::unexpected(field, "a string"))
}

/// Known limitation: text nested two or more levels deep in an unrecognized
/// layout is not collected.
fn resolve_fallback(root: &Map<String, Value>) -> Result<String, DocumentParseError> {
    let mut parts = Vec::new();
    for (key, value) in root {
        match value {
            Value::String(text) => parts.push(text.as_str()),
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(text) => parts.push(text.as_str()),
                        Value::Object(fields) if fields.contains_key("text") => {
                            parts.push(text_of(fields, &format!("{key}[].text"))?);
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    Ok(parts.join("\n"))
}

fn text_of<'v>(fields: &'v Map<String, Value>, field: &str) -> Result<&'v str, DocumentParseError> {
    fields
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| DocumentParseError::unexpected(field, "a string"))
}

/// Textual rendering of a whole document, used when resolution fails
pub fn render_document(document: &Value) -> String {
    match document {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
