/// External collaborator abstractions
///
/// The engine consumes three capabilities, each behind a trait object so the
/// pipeline can be exercised against mocks: text generation (intent
/// extraction and chat replies), listening history (similar/top artists and
/// album art), and video search (candidate tracks). Every capability is
/// best-effort; callers substitute a local fallback on any error.
use crate::{
    error::AppResult,
    models::{ChatTurn, TrackCandidate},
};

pub mod gemini;
pub mod lastfm;
pub mod youtube;

/// Text-generation collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Asks the model to pull structured intent fields out of a message
    ///
    /// Returns the raw completion text, expected (but not guaranteed) to
    /// contain a single JSON object. Parsing is the caller's concern.
    async fn extract_intent(&self, message: &str) -> AppResult<String>;

    /// Free-form chat completion with conversation history for continuity
    async fn chat(&self, prompt: &str, history: &[ChatTurn]) -> AppResult<String>;
}

/// Listening-history collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ListeningHistory: Send + Sync {
    /// Artists similar to the given one, most similar first
    async fn similar_artists(&self, artist: &str, limit: usize) -> AppResult<Vec<String>>;

    /// The user's most-played artists
    async fn top_artists(&self, username: &str, limit: usize) -> AppResult<Vec<String>>;

    /// Album art URL for a track, when the metadata service knows it
    async fn track_art(&self, artist: &str, title: &str) -> AppResult<Option<String>>;
}

/// Video-search collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VideoSearch: Send + Sync {
    /// Searches for music videos matching the query
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<TrackCandidate>>;
}
