// WHY: Seam between candidate extraction and an external semantic filter
// Builds the request, renders the prompt, and validates whatever the filter returns

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::incremental::CandidatesFile;
use crate::pipeline::ExtractionResult;

/// System message to pair with [`SelectionRequest::render_prompt`]
pub const SYSTEM_MESSAGE: &str =
    "You are a precise document analyzer. Follow the instructions exactly and provide only JSON output.";

const SENTENCES_PLACEHOLDER: &str = "{sentences}";

const PROMPT_TEMPLATE: &str = r#"
<contract_validity_extraction>
You are an expert in extracting contract validity periods from Mexican public procurement documents.

<extraction_objective>
Extract ALL sentences that contain contract validity periods (vigencia del contrato). There may be multiple validity periods for different products or services.
</extraction_objective>

<inclusion_criteria>
PRIORITIZE semantic meaning over exact words. If the context clearly indicates:
- Main contract duration OR
- Primary delivery period for goods and services that defines the contract scope
- "Suministro" (supply) periods that are not the main contract period
- With a date range (start and end dates)
Then SELECT it, even without the exact word "vigencia"
Reason first about the semantic context, then decide.
SELECT ALL sentences that match - there can be multiple validity periods.
</inclusion_criteria>

<double_review_criteria>
BEFORE CHOOSING sentences about the following terms, review IF the sentence IS really about contract validity:
- "Vigencia de cotización" (quotation validity)
- Payment terms or credit periods
- Warranty periods that are not the main contract duration
- IMSS
- SAT
- IVA
</double_review_criteria>

<golden_examples>
1. "La vigencia del contrato será del 1° de enero de 2025 al 31 de diciembre de 2025."
2. "El (los) contrato(s) que, en su caso, sea(n) formalizado(s) con motivo de este procedimiento de contratación será(n) de carácter anual, y contará(n) con un período de vigencia a partir del fallo al 31 de diciembre de 2025."
3. "La vigencia de la contratación será a partir del día natural siguiente a la fecha de emisión del fallo y hasta el 31 de diciembre de 2025."
4. "El contrato permanecerá vigente desde el día de la notificación de fallo y hasta el 31 de diciembre del 2025."
</golden_examples>

<preprocessing_instructions>
When analyzing sentences:
- Ignore structural text (ÍNDICE, GLOSARIO, headers unrelated to contract)
- Focus on contractual information regardless of formatting
- Clean multiple line breaks mentally when understanding the context
</preprocessing_instructions>

<task_instructions>
1. Analyze each sentence in the input
2. Identify which sentences contain contract validity information
3. Reason internally about why each sentence should be selected or rejected
4. Return ONLY the selected sentences
</task_instructions>

<output_format>
Return a JSON object with this structure:
{
    "selected_sentences": ["first selected sentence verbatim", "second selected sentence verbatim", ...]
}

If no sentences contain validity information, return:
{
    "selected_sentences": []
}

IMPORTANT: Return ONLY the JSON object, no additional text or reasoning.
</output_format>
</contract_validity_extraction>

Analyze the following sentences and extract the main contract validity period:

<sentences>
{sentences}
</sentences>

Remember: Focus on ALL contract validity periods. Return only the JSON with selected sentences."#;

/// Unique candidate sentences handed to a semantic filter, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRequest {
    sentences: Vec<String>,
    seen: HashSet<String>,
}

impl SelectionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from arbitrary sentence strings, dropping repeats
    pub fn from_sentences<I, S>(sentences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request = Self::new();
        request.extend(sentences);
        request
    }

    pub fn from_result(result: &ExtractionResult) -> Self {
        Self::from_sentences(result.sentences.iter().map(|s| s.sentence.as_str()))
    }

    pub fn from_candidates<'a>(files: impl IntoIterator<Item = &'a CandidatesFile>) -> Self {
        let mut request = Self::new();
        for file in files {
            request.extend(file.sentence_texts());
        }
        request
    }

    /// Append sentences not already present
    pub fn extend<I, S>(&mut self, sentences: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for sentence in sentences {
            let sentence = sentence.into();
            if self.seen.insert(sentence.clone()) {
                self.sentences.push(sentence);
            }
        }
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Render the instruction prompt with sentences numbered from 1
    pub fn render_prompt(&self) -> String {
        let numbered = self
            .sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| format!("{}. {}", i + 1, sentence))
            .collect::<Vec<_>>()
            .join("\n");
        PROMPT_TEMPLATE.replace(SENTENCES_PLACEHOLDER, &numbered)
    }
}

/// Sentences a semantic filter kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResponse {
    #[serde(default)]
    pub selected_sentences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SelectionResponse {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            selected_sentences: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Parse a free-form filter reply
///
/// The JSON object is taken from the first `{` to the last `}`. A reply
/// without one selects nothing; an object that does not parse selects nothing
/// and records the parse error.
pub fn parse_selection_reply(reply: &str) -> SelectionResponse {
    let object = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            debug!("Selection reply contains no JSON object");
            return SelectionResponse::default();
        }
    };

    serde_json::from_str(object).unwrap_or_else(|e| {
        warn!("Malformed selection reply: {}", e);
        SelectionResponse::failed(e.to_string())
    })
}

/// A semantic filter over candidate sentences
pub trait SentenceSelector {
    fn select(&self, request: &SelectionRequest) -> Result<SelectionResponse>;
}

/// Run a selector, absorbing its failure and keeping only verbatim request sentences
pub fn run_selection<S: SentenceSelector + ?Sized>(selector: &S, request: &SelectionRequest) -> SelectionResponse {
    let mut response = match selector.select(request) {
        Ok(response) => response,
        Err(e) => {
            warn!("Sentence selector failed: {:#}", e);
            return SelectionResponse::failed(format!("{e:#}"));
        }
    };

    let known: HashSet<&str> = request.sentences.iter().map(String::as_str).collect();
    let before = response.selected_sentences.len();
    response.selected_sentences.retain(|s| known.contains(s.as_str()));
    if response.selected_sentences.len() < before {
        warn!(
            "Dropped {} selected sentences that were not in the request",
            before - response.selected_sentences.len()
        );
    }
    response
}
