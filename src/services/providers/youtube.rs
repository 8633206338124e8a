/// YouTube video-search provider
///
/// Implements [`VideoSearch`] against the Data API v3 search endpoint,
/// restricted to the music category. Results are cached keyed by the
/// literal query string with a longer TTL than history lookups, since the
/// same seed-artist queries recur across requests.
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cache::{CacheKey, TtlCache},
    error::{AppError, AppResult},
    models::TrackCandidate,
    services::providers::VideoSearch,
};

const SEARCH_CACHE_TTL: Duration = Duration::from_secs(600); // 10 minutes

/// YouTube category ID for music videos
const MUSIC_CATEGORY_ID: &str = "10";

#[derive(Clone)]
pub struct YouTubeClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: TtlCache,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    #[serde(rename = "videoId", default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize, Default)]
struct Thumbnails {
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl SearchItem {
    /// Converts to a candidate; items without a video ID (channels,
    /// playlists) are dropped
    fn into_candidate(self) -> Option<TrackCandidate> {
        let video_id = self.id.video_id?;
        let thumbnail_url = self
            .snippet
            .thumbnails
            .medium
            .or(self.snippet.thumbnails.default)
            .map(|t| t.url);

        Some(TrackCandidate {
            id: video_id,
            title: self.snippet.title,
            channel: self.snippet.channel_title,
            published_at: self.snippet.published_at,
            // Search responses carry no contentDetails; duration stays unknown
            duration: None,
            thumbnail_url,
        })
    }
}

impl YouTubeClient {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String, cache: TtlCache) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
            cache,
        }
    }
}

#[async_trait::async_trait]
impl VideoSearch for YouTubeClient {
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<TrackCandidate>> {
        let key = CacheKey::Search(query.to_string());
        let max_results_param = max_results.to_string();

        self.cache
            .get_or_fetch(&key, SEARCH_CACHE_TTL, || async move {
                let url = format!("{}/search", self.api_url);

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[
                        ("part", "snippet"),
                        ("type", "video"),
                        ("videoCategoryId", MUSIC_CATEGORY_ID),
                        ("q", query),
                        ("maxResults", &max_results_param),
                        ("key", self.api_key.as_str()),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "YouTube API returned status {}: {}",
                        status, body
                    )));
                }

                let parsed: SearchResponse = response.json().await?;
                let candidates: Vec<TrackCandidate> = parsed
                    .items
                    .into_iter()
                    .filter_map(SearchItem::into_candidate)
                    .collect();

                tracing::info!(
                    query = %query,
                    results = candidates.len(),
                    provider = "youtube",
                    "Video search completed"
                );

                Ok(candidates)
            })
            .await
    }
}
