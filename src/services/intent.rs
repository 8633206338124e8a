/// Intent extraction from free-text messages
///
/// The text-generation collaborator is asked for a single JSON object of
/// optional fields. Models wrap JSON in prose or code fences often enough
/// that the parser locates the outermost `{...}` span instead of parsing
/// the whole completion. Extraction never fails: any error or unparseable
/// response degrades to an empty [`Intent`].
use crate::{models::Intent, services::providers::TextGenerator};

/// Extracts structured intent from a user message
///
/// Returns `Intent::default()` when the collaborator errors or returns
/// something that does not contain a parseable JSON object.
pub async fn extract(text_gen: &dyn TextGenerator, message: &str) -> Intent {
    let raw = match text_gen.extract_intent(message).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "Intent extraction call failed, proceeding without intent");
            return Intent::default();
        }
    };

    match parse_intent_response(&raw) {
        Some(intent) => {
            tracing::debug!(?intent, "Intent extracted");
            intent
        }
        None => {
            tracing::warn!(response = %raw, "No parseable intent JSON in response");
            Intent::default()
        }
    }
}

/// Parses the first `{...}` span out of a raw completion
fn parse_intent_response(raw: &str) -> Option<Intent> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    serde_json::from_str(&raw[start..=end]).ok()
}
