//! Scriptable collaborator stubs shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;

use cadence_api::error::{AppError, AppResult};
use cadence_api::models::{ChatTurn, TrackCandidate};
use cadence_api::services::providers::{ListeningHistory, TextGenerator, VideoSearch};

/// Text generator with canned responses; `None` simulates a hard failure
pub struct ScriptedTextGen {
    pub intent_json: Option<&'static str>,
    pub chat_reply: Option<&'static str>,
}

#[async_trait]
impl TextGenerator for ScriptedTextGen {
    async fn extract_intent(&self, _message: &str) -> AppResult<String> {
        self.intent_json
            .map(str::to_string)
            .ok_or_else(|| AppError::ExternalApi("text generation offline".to_string()))
    }

    async fn chat(&self, _prompt: &str, _history: &[ChatTurn]) -> AppResult<String> {
        self.chat_reply
            .map(str::to_string)
            .ok_or_else(|| AppError::ExternalApi("text generation offline".to_string()))
    }
}

/// History service that knows nothing but never errors
pub struct EmptyHistory;

#[async_trait]
impl ListeningHistory for EmptyHistory {
    async fn similar_artists(&self, _artist: &str, _limit: usize) -> AppResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn top_artists(&self, _username: &str, _limit: usize) -> AppResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn track_art(&self, _artist: &str, _title: &str) -> AppResult<Option<String>> {
        Ok(None)
    }
}

/// History service that always fails
pub struct FailingHistory;

#[async_trait]
impl ListeningHistory for FailingHistory {
    async fn similar_artists(&self, _artist: &str, _limit: usize) -> AppResult<Vec<String>> {
        Err(AppError::ExternalApi("history service offline".to_string()))
    }

    async fn top_artists(&self, _username: &str, _limit: usize) -> AppResult<Vec<String>> {
        Err(AppError::ExternalApi("history service offline".to_string()))
    }

    async fn track_art(&self, _artist: &str, _title: &str) -> AppResult<Option<String>> {
        Err(AppError::ExternalApi("history service offline".to_string()))
    }
}

/// Search that fabricates candidates from the query's seed artist
///
/// The seed artist is the query text up to the trailing keywords, so
/// candidate titles come out as "Seed - Song N" with per-query-unique IDs
/// and one channel per seed.
pub struct SeededSearch {
    pub results_per_query: usize,
}

#[async_trait]
impl VideoSearch for SeededSearch {
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<TrackCandidate>> {
        let seed = query.trim_end_matches(" music").to_string();
        let count = self.results_per_query.min(max_results);

        Ok((0..count)
            .map(|i| TrackCandidate {
                id: format!("{}-{}", seed.replace(' ', "-").to_lowercase(), i),
                title: format!("{} - Song {}", seed, i),
                channel: seed.clone(),
                published_at: None,
                duration: None,
                thumbnail_url: Some(format!("http://img/{}.jpg", i)),
            })
            .collect())
    }
}

/// Search where every query returns tracks from one prolific channel
pub struct SingleChannelSearch;

#[async_trait]
impl VideoSearch for SingleChannelSearch {
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<TrackCandidate>> {
        Ok((0..max_results)
            .map(|i| TrackCandidate {
                id: format!("{}-{}", query.replace(' ', "-").to_lowercase(), i),
                title: format!("Compilation {}", i),
                channel: "MegaMix Channel".to_string(),
                published_at: None,
                duration: None,
                thumbnail_url: None,
            })
            .collect())
    }
}

/// Search that always fails
pub struct FailingSearch;

#[async_trait]
impl VideoSearch for FailingSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> AppResult<Vec<TrackCandidate>> {
        Err(AppError::ExternalApi("search service offline".to_string()))
    }
}
