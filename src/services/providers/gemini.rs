/// Gemini text-generation provider
///
/// Implements [`TextGenerator`] against the generateContent endpoint.
/// Intent extraction sends a constrained system instruction asking for a
/// single JSON object; chat replays recent conversation turns so responses
/// stay coherent across the session.
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{ChatRole, ChatTurn},
    services::providers::TextGenerator,
};

const MODEL: &str = "gemini-1.5-flash";

/// How many trailing conversation turns are replayed into a chat request
const HISTORY_WINDOW: usize = 10;

const INTENT_SYSTEM_PROMPT: &str = r#"You are an intent extraction assistant for a music recommendation app. Extract the user's musical intent from their message.

Return ONLY a single JSON object with these optional string fields, omitting any field you cannot infer:
- "mood": emotional state (e.g. "sad", "happy", "energetic")
- "genre": musical genre (e.g. "rock", "jazz", "lo-fi")
- "artist": a specific artist the user named
- "activity": what the user is doing (e.g. "studying", "workout", "driving")
- "query": any other free-text search phrase

If nothing can be inferred, return an empty object: {}"#;

#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
        }
    }

    /// Calls generateContent and returns the first candidate's text
    async fn generate(&self, system: Option<&str>, contents: Vec<Value>) -> AppResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, MODEL
        );

        let mut body = json!({ "contents": contents });
        if let Some(instruction) = system {
            body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
        }

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response.json().await?;

        let text = generated
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| AppError::ExternalApi("Empty Gemini response".to_string()))?;

        Ok(text)
    }
}

/// Maps a chat turn to the API's role vocabulary ("user" / "model")
fn turn_to_content(turn: &ChatTurn) -> Value {
    let role = match turn.role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    };
    json!({ "role": role, "parts": [{ "text": turn.content }] })
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn extract_intent(&self, message: &str) -> AppResult<String> {
        let contents = vec![json!({ "role": "user", "parts": [{ "text": message }] })];

        let text = self.generate(Some(INTENT_SYSTEM_PROMPT), contents).await?;

        tracing::debug!(response = %text, "Intent extraction completed");

        Ok(text)
    }

    async fn chat(&self, prompt: &str, history: &[ChatTurn]) -> AppResult<String> {
        let recent = history.len().saturating_sub(HISTORY_WINDOW);
        let mut contents: Vec<Value> = history[recent..].iter().map(turn_to_content).collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": prompt }] }));

        let text = self.generate(None, contents).await?;

        tracing::debug!(history_turns = history.len(), "Chat completion finished");

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_to_content_roles() {
        let user = ChatTurn {
            role: ChatRole::User,
            content: "play something sad".to_string(),
        };
        let assistant = ChatTurn {
            role: ChatRole::Assistant,
            content: "here you go".to_string(),
        };

        assert_eq!(turn_to_content(&user)["role"], "user");
        assert_eq!(turn_to_content(&assistant)["role"], "model");
        assert_eq!(
            turn_to_content(&user)["parts"][0]["text"],
            "play something sad"
        );
    }

    #[test]
    fn test_generate_response_deserialization() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"mood\": \"sad\"}"}]}}
            ]
        }"#;

        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(
            response.candidates[0].content.parts[0].text,
            "{\"mood\": \"sad\"}"
        );
    }

    #[test]
    fn test_generate_response_missing_candidates() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }
}
