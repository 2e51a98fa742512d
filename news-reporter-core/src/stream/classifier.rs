use serde_json::Value;

use crate::model::Citation;

pub const EVENT_TEXT_DELTA: &str = "response.output_text.delta";
pub const EVENT_ANNOTATION_ADDED: &str = "response.output_text.annotation.added";
pub const ANNOTATION_URL_CITATION: &str = "url_citation";

/// The service sends titles and URLs only, no excerpt text.
pub const CITATION_SNIPPET_PLACEHOLDER: &str = "from web search result";

/// What a single frame payload means to the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedEvent {
    TextDelta(String),
    CitationAdded(Citation),
    Ignored,
}

/// Classify one frame payload. Never fails: undecodable payloads, missing
/// discriminants and unknown event types are all `Ignored`.
pub fn classify(payload: &str) -> ClassifiedEvent {
    let event: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            tracing::trace!(error = %e, "ignoring undecodable frame");
            return ClassifiedEvent::Ignored;
        }
    };

    match event.get("type").and_then(Value::as_str) {
        Some(EVENT_TEXT_DELTA) => match event.get("delta").and_then(Value::as_str) {
            Some(delta) => ClassifiedEvent::TextDelta(delta.to_string()),
            None => ClassifiedEvent::Ignored,
        },
        Some(EVENT_ANNOTATION_ADDED) => extract_citation(&event)
            .map(ClassifiedEvent::CitationAdded)
            .unwrap_or(ClassifiedEvent::Ignored),
        Some(other) => {
            tracing::trace!(event_type = other, "ignoring event type");
            ClassifiedEvent::Ignored
        }
        None => ClassifiedEvent::Ignored,
    }
}

/// Pull a url citation out of an annotation-added event.
///
/// A missing `annotation` is a silent no-op; an `annotation` that is present
/// but not an object is logged as a warning. Other annotation subtypes are
/// not citations.
pub fn extract_citation(event: &Value) -> Option<Citation> {
    let annotation = match event.get("annotation")? {
        Value::Object(map) => map,
        other => {
            tracing::warn!(annotation = %other, "invalid annotation data");
            return None;
        }
    };

    if annotation.get("type").and_then(Value::as_str) != Some(ANNOTATION_URL_CITATION) {
        return None;
    }

    let field = |name: &str| {
        annotation
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let title = field("title");
    let url = field("url");
    let snippet = if title.is_empty() {
        String::new()
    } else {
        CITATION_SNIPPET_PLACEHOLDER.to_string()
    };

    Some(Citation { title, url, snippet })
}
