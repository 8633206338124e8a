/// Last.fm listening-history provider
///
/// Implements [`ListeningHistory`] against the Last.fm REST API:
/// artist.getsimilar for seed expansion, user.gettopartists for
/// profile-driven seeds, and track.getinfo for album art. Every lookup is
/// cached with a short TTL because history data changes slowly relative to
/// request volume.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cache::{CacheKey, TtlCache},
    error::{AppError, AppResult},
    services::providers::ListeningHistory,
};

const HISTORY_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

#[derive(Clone)]
pub struct LastFmClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: TtlCache,
}

#[derive(Debug, Deserialize)]
struct SimilarArtistsResponse {
    similarartists: ArtistList,
}

#[derive(Debug, Deserialize)]
struct TopArtistsResponse {
    topartists: ArtistList,
}

#[derive(Debug, Deserialize)]
struct ArtistList {
    #[serde(default)]
    artist: Vec<ArtistEntry>,
}

#[derive(Debug, Deserialize)]
struct ArtistEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TrackInfoResponse {
    #[serde(default)]
    track: Option<TrackInfo>,
}

#[derive(Debug, Deserialize)]
struct TrackInfo {
    #[serde(default)]
    album: Option<AlbumInfo>,
}

#[derive(Debug, Deserialize)]
struct AlbumInfo {
    #[serde(default)]
    image: Vec<AlbumImage>,
}

/// Last.fm image entries keyed by size; the URL lives under "#text"
#[derive(Debug, Deserialize)]
struct AlbumImage {
    #[serde(rename = "#text", default)]
    url: String,
    #[serde(default)]
    size: String,
}

impl LastFmClient {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String, cache: TtlCache) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
            cache,
        }
    }

    /// Issues a Last.fm API method call with the shared key/format params
    async fn call(&self, params: &[(&str, &str)]) -> AppResult<reqwest::Response> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Last.fm API returned status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

/// Picks the largest usable image from a Last.fm image list
fn best_image(images: &[AlbumImage]) -> Option<String> {
    let preferred = ["extralarge", "large", "medium"];

    for size in preferred {
        if let Some(image) = images.iter().find(|i| i.size == size && !i.url.is_empty()) {
            return Some(image.url.clone());
        }
    }

    images
        .iter()
        .rev()
        .find(|i| !i.url.is_empty())
        .map(|i| i.url.clone())
}

#[async_trait::async_trait]
impl ListeningHistory for LastFmClient {
    async fn similar_artists(&self, artist: &str, limit: usize) -> AppResult<Vec<String>> {
        let key = CacheKey::History(format!("similar:{}:{}", artist, limit));
        let limit_param = limit.to_string();

        self.cache
            .get_or_fetch(&key, HISTORY_CACHE_TTL, || async move {
                let response = self
                    .call(&[
                        ("method", "artist.getsimilar"),
                        ("artist", artist),
                        ("limit", &limit_param),
                    ])
                    .await?;

                let parsed: SimilarArtistsResponse = response.json().await?;
                let names: Vec<String> = parsed
                    .similarartists
                    .artist
                    .into_iter()
                    .map(|a| a.name)
                    .collect();

                tracing::info!(
                    artist = %artist,
                    results = names.len(),
                    provider = "lastfm",
                    "Similar artist lookup completed"
                );

                Ok(names)
            })
            .await
    }

    async fn top_artists(&self, username: &str, limit: usize) -> AppResult<Vec<String>> {
        let key = CacheKey::History(format!("top:{}:{}", username, limit));
        let limit_param = limit.to_string();

        self.cache
            .get_or_fetch(&key, HISTORY_CACHE_TTL, || async move {
                let response = self
                    .call(&[
                        ("method", "user.gettopartists"),
                        ("user", username),
                        ("limit", &limit_param),
                    ])
                    .await?;

                let parsed: TopArtistsResponse = response.json().await?;
                let names: Vec<String> = parsed
                    .topartists
                    .artist
                    .into_iter()
                    .map(|a| a.name)
                    .collect();

                tracing::info!(
                    username = %username,
                    results = names.len(),
                    provider = "lastfm",
                    "Top artist lookup completed"
                );

                Ok(names)
            })
            .await
    }

    async fn track_art(&self, artist: &str, title: &str) -> AppResult<Option<String>> {
        let key = CacheKey::History(format!("art:{}:{}", artist, title));

        self.cache
            .get_or_fetch(&key, HISTORY_CACHE_TTL, || async move {
                let response = self
                    .call(&[
                        ("method", "track.getinfo"),
                        ("artist", artist),
                        ("track", title),
                    ])
                    .await?;

                let parsed: TrackInfoResponse = response.json().await?;
                let art = parsed
                    .track
                    .and_then(|t| t.album)
                    .and_then(|a| best_image(&a.image));

                tracing::debug!(
                    artist = %artist,
                    title = %title,
                    found = art.is_some(),
                    provider = "lastfm",
                    "Track art lookup completed"
                );

                Ok(art)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(size: &str, url: &str) -> AlbumImage {
        AlbumImage {
            url: url.to_string(),
            size: size.to_string(),
        }
    }

    #[test]
    fn test_best_image_prefers_extralarge() {
        let images = vec![
            image("small", "http://img/s.png"),
            image("extralarge", "http://img/xl.png"),
            image("large", "http://img/l.png"),
        ];
        assert_eq!(best_image(&images), Some("http://img/xl.png".to_string()));
    }

    #[test]
    fn test_best_image_skips_empty_urls() {
        let images = vec![image("extralarge", ""), image("large", "http://img/l.png")];
        assert_eq!(best_image(&images), Some("http://img/l.png".to_string()));
    }

    #[test]
    fn test_best_image_none_when_all_empty() {
        let images = vec![image("extralarge", ""), image("small", "")];
        assert_eq!(best_image(&images), None);
    }

    #[test]
    fn test_similar_artists_deserialization() {
        let json = r#"{
            "similarartists": {
                "artist": [
                    {"name": "Radiohead", "match": "1.0"},
                    {"name": "Thom Yorke", "match": "0.8"}
                ]
            }
        }"#;

        let parsed: SimilarArtistsResponse = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = parsed
            .similarartists
            .artist
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Radiohead", "Thom Yorke"]);
    }

    #[test]
    fn test_track_info_without_album() {
        let json = r#"{"track": {"name": "Creep"}}"#;
        let parsed: TrackInfoResponse = serde_json::from_str(json).unwrap();
        let art = parsed.track.and_then(|t| t.album).and_then(|a| best_image(&a.image));
        assert_eq!(art, None);
    }

    // Points at a closed port, so any lookup that reaches the network fails
    fn unreachable_client(cache: TtlCache) -> LastFmClient {
        LastFmClient::new(
            HttpClient::new(),
            "test-key".to_string(),
            "http://127.0.0.1:9".to_string(),
            cache,
        )
    }

    #[tokio::test]
    async fn test_track_art_served_from_cache_without_network() {
        let cache = TtlCache::new();
        cache
            .insert(
                &CacheKey::History("art:Nick Drake:Pink Moon".to_string()),
                &Some("http://img/pink-moon.jpg".to_string()),
                HISTORY_CACHE_TTL,
            )
            .await;

        let client = unreachable_client(cache);
        let art = client.track_art("Nick Drake", "Pink Moon").await.unwrap();
        assert_eq!(art, Some("http://img/pink-moon.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_track_art_cache_key_is_per_track() {
        let cache = TtlCache::new();
        cache
            .insert(
                &CacheKey::History("art:Nick Drake:Pink Moon".to_string()),
                &Some("http://img/pink-moon.jpg".to_string()),
                HISTORY_CACHE_TTL,
            )
            .await;

        // Different track misses the cache and has to go to the network
        let client = unreachable_client(cache);
        assert!(client.track_art("Nick Drake", "River Man").await.is_err());
    }
}
