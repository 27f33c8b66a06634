// Test documents in each supported shape with known date references
// WHY: Deterministic inputs let the suites assert exact sentences and categories

#![allow(dead_code)]

use serde_json::{json, Value};

/// Procurement notice split into pages, mixing strings and {text} mappings
pub fn paged_notice() -> Value {
    json!({
        "doc_id": "LA-2025-001",
        "pages": [
            "CONVOCATORIA A LA LICITACIÓN PÚBLICA\n\nÍNDICE.",
            {"text": "La vigencia del contrato será del 1° de enero de 2025 al 31 de diciembre de 2025. El pago se realizará a 20 días naturales."},
            {"image": "firma.png"},
            "Entrega prevista el 31 dic. 2025 para el Sr. Gómez.\n\nCierre del ejercicio: 31/12/2025."
        ]
    })
}

/// Sentences the paged notice is expected to yield, in order
pub const PAGED_NOTICE_SENTENCES: [&str; 3] = [
    "La vigencia del contrato será del 1° de enero de 2025 al 31 de diciembre de 2025.",
    "Entrega prevista el 31 dic. 2025 para el Sr. Gómez.",
    "Cierre del ejercicio: 31/12/2025.",
];

/// Document laid out as paragraphs
pub fn paragraph_contract() -> Value {
    json!({
        "doc_id": 17,
        "document": {
            "paragraphs": [
                {"index": 0, "text": "CLÁUSULA TERCERA. VIGENCIA."},
                {"index": 1, "text": "El contrato permanecerá vigente desde la notificación del fallo y hasta el 31 de diciembre del 2025."},
                {"index": 2, "text": "The supplier shall deliver by December 31, 2025."}
            ]
        }
    })
}

/// Unknown layout, resolved through the one-level fallback
pub fn fallback_document() -> Value {
    json!({
        "foo": "no vigencia aqui",
        "bar": [{"text": "31 de diciembre de 2025 es la fecha"}]
    })
}

/// A document with no date reference anywhere
pub fn irrelevant_document() -> Value {
    json!({"text": "Las propuestas se recibirán en sobre cerrado. No se aceptan propuestas conjuntas."})
}
