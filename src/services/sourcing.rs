/// Candidate sourcing: seed-artist planning and diversified search fan-out
///
/// Seeds are gathered in strict priority order (explicit artist and its
/// similar artists, then listening history, then stated favorites, then a
/// static genre table) until ten unique names are collected. Each seed then
/// drives one bounded video search; searches run concurrently and a failed
/// search simply contributes no candidates.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    models::{Intent, TrackCandidate, UserProfile},
    services::providers::{ListeningHistory, VideoSearch},
};

pub const MAX_SEED_ARTISTS: usize = 10;
pub const SIMILAR_ARTIST_LIMIT: usize = 5;
pub const TOP_ARTIST_LIMIT: usize = 5;
pub const RESULTS_PER_SEARCH: usize = 5;

/// Per-channel cap applied to the raw candidate pool
pub const SOURCING_CHANNEL_CAP: usize = 2;

/// Fallback genres when neither intent nor profile resolves anything
const DEFAULT_GENRES: [&str; 3] = ["pop", "rock", "indie"];

/// Genres conventionally associated with a mood
fn genres_for_mood(mood: &str) -> &'static [&'static str] {
    match mood.to_lowercase().as_str() {
        "happy" | "joyful" | "upbeat" => &["pop", "dance"],
        "sad" | "melancholy" | "heartbroken" => &["indie", "alternative"],
        "energetic" | "hyped" | "pumped" => &["rock", "electronic"],
        "calm" | "chill" | "relaxed" | "peaceful" => &["acoustic", "ambient"],
        "romantic" | "loving" => &["r&b", "soul"],
        "angry" | "frustrated" => &["metal", "rock"],
        "nostalgic" => &["rock", "folk"],
        "focused" => &["lo-fi", "classical"],
        _ => &[],
    }
}

/// Genres conventionally associated with an activity
fn genres_for_activity(activity: &str) -> &'static [&'static str] {
    match activity.to_lowercase().as_str() {
        "workout" | "gym" | "running" | "exercise" => &["electronic", "hip hop"],
        "study" | "studying" | "work" | "working" | "focus" => &["lo-fi", "classical"],
        "party" | "dancing" => &["dance", "pop"],
        "sleep" | "sleeping" | "winding down" => &["ambient", "acoustic"],
        "driving" | "commute" | "road trip" => &["rock", "pop"],
        "cooking" | "dinner" => &["jazz", "soul"],
        "relaxing" | "chilling" => &["acoustic", "ambient"],
        _ => &[],
    }
}

/// Representative artists per genre, used as last-resort seeds
fn representative_artists(genre: &str) -> &'static [&'static str] {
    match genre.to_lowercase().as_str() {
        "pop" => &["Taylor Swift", "Dua Lipa", "Ariana Grande"],
        "rock" => &["Foo Fighters", "Arctic Monkeys", "Led Zeppelin"],
        "indie" => &["Phoebe Bridgers", "Bon Iver", "Mac DeMarco"],
        "alternative" => &["Radiohead", "The Smashing Pumpkins", "Interpol"],
        "hip hop" | "rap" => &["Kendrick Lamar", "Drake", "J. Cole"],
        "electronic" | "edm" => &["Daft Punk", "ODESZA", "Aphex Twin"],
        "jazz" => &["Miles Davis", "John Coltrane", "Norah Jones"],
        "classical" => &["Ludovico Einaudi", "Max Richter", "Yo-Yo Ma"],
        "r&b" => &["Frank Ocean", "SZA", "Daniel Caesar"],
        "soul" => &["Leon Bridges", "Aretha Franklin", "Al Green"],
        "metal" => &["Metallica", "Gojira", "Iron Maiden"],
        "dance" => &["Calvin Harris", "Disclosure", "Robyn"],
        "acoustic" => &["Jack Johnson", "Iron & Wine", "José González"],
        "lo-fi" | "lofi" => &["Nujabes", "Tomppabeats", "Idealism"],
        "ambient" => &["Brian Eno", "Stars of the Lid", "Hammock"],
        "country" => &["Chris Stapleton", "Kacey Musgraves", "Zach Bryan"],
        "folk" => &["Fleet Foxes", "The Lumineers", "Sufjan Stevens"],
        _ => &[],
    }
}

/// Appends a name if unseen (case-insensitive) and below the seed cap
fn push_unique(seeds: &mut Vec<String>, seen: &mut HashSet<String>, name: &str) {
    let name = name.trim();
    if name.is_empty() || seeds.len() >= MAX_SEED_ARTISTS {
        return;
    }
    if seen.insert(name.to_lowercase()) {
        seeds.push(name.to_string());
    }
}

/// Genres to pull representative artists from, in priority order
fn derive_genres(intent: &Intent, profile: &UserProfile) -> Vec<String> {
    let mut genres = Vec::new();

    if let Some(genre) = &intent.genre {
        genres.push(genre.clone());
    }
    if let Some(mood) = &intent.mood {
        genres.extend(genres_for_mood(mood).iter().map(|g| g.to_string()));
    }
    if let Some(activity) = &intent.activity {
        genres.extend(genres_for_activity(activity).iter().map(|g| g.to_string()));
    }

    if genres.is_empty() {
        genres.extend(profile.favorite_genres.iter().cloned());
    }
    if genres.is_empty() {
        genres.extend(DEFAULT_GENRES.iter().map(|g| g.to_string()));
    }

    genres
}

/// Builds the ordered seed-artist list for one request
///
/// Up to [`MAX_SEED_ARTISTS`] unique names, first-seen order preserved.
/// History-service failures are logged and skipped; the list is never empty
/// because the genre table always resolves at least the default genres.
pub async fn seed_artists(
    history: &dyn ListeningHistory,
    intent: &Intent,
    profile: &UserProfile,
) -> Vec<String> {
    let mut seeds = Vec::new();
    let mut seen = HashSet::new();

    // (a) explicit artist plus artists similar to it
    if let Some(artist) = &intent.artist {
        push_unique(&mut seeds, &mut seen, artist);

        match history.similar_artists(artist, SIMILAR_ARTIST_LIMIT).await {
            Ok(similar) => {
                for name in similar {
                    push_unique(&mut seeds, &mut seen, &name);
                }
            }
            Err(e) => {
                tracing::warn!(artist = %artist, error = %e, "Similar-artist lookup failed, skipping");
            }
        }
    }

    // (b) listening-history top artists
    if seeds.len() < MAX_SEED_ARTISTS {
        if let Some(username) = &profile.lastfm_username {
            match history.top_artists(username, TOP_ARTIST_LIMIT).await {
                Ok(top) => {
                    for name in top {
                        push_unique(&mut seeds, &mut seen, &name);
                    }
                }
                Err(e) => {
                    tracing::warn!(username = %username, error = %e, "Top-artist lookup failed, skipping");
                }
            }
        }
    }

    // (c) stated favorite artists
    for name in &profile.favorite_artists {
        push_unique(&mut seeds, &mut seen, name);
    }

    // (d) representative artists for whatever genres resolved
    if seeds.len() < MAX_SEED_ARTISTS {
        for genre in derive_genres(intent, profile) {
            for name in representative_artists(&genre) {
                push_unique(&mut seeds, &mut seen, name);
            }
        }
    }

    tracing::debug!(seeds = ?seeds, "Seed artists resolved");

    seeds
}

/// Builds the search query issued for one seed artist
fn build_query(artist: &str, intent: &Intent) -> String {
    let mut parts = vec![artist.to_string()];
    if let Some(mood) = &intent.mood {
        parts.push(mood.clone());
    }
    if let Some(genre) = &intent.genre {
        parts.push(genre.clone());
    }
    parts.push("music".to_string());
    parts.join(" ")
}

/// Caps candidates per channel while preserving relative order
///
/// Keeps one prolific uploader from dominating the pool; channel names are
/// compared case-insensitively.
pub fn diversify(candidates: Vec<TrackCandidate>, per_channel: usize) -> Vec<TrackCandidate> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    candidates
        .into_iter()
        .filter(|candidate| {
            let count = counts.entry(candidate.channel.to_lowercase()).or_insert(0);
            *count += 1;
            *count <= per_channel
        })
        .collect()
}

/// Fans out one search per seed artist and gathers the diversified pool
///
/// Searches are independent and side-effect-free, so they run concurrently;
/// joining in spawn order keeps the concatenation in seed order. A search
/// that errors contributes zero candidates without affecting the others.
pub async fn search_candidates(
    search: &Arc<dyn VideoSearch>,
    intent: &Intent,
    seeds: &[String],
) -> Vec<TrackCandidate> {
    let mut tasks = Vec::new();

    for seed in seeds {
        let search = Arc::clone(search);
        let query = build_query(seed, intent);
        tasks.push(tokio::spawn(async move {
            search.search(&query, RESULTS_PER_SEARCH).await
        }));
    }

    let mut candidates: Vec<TrackCandidate> = Vec::new();
    let mut seen_ids = HashSet::new();

    for task in tasks {
        match task.await {
            Ok(Ok(results)) => {
                // Different seeds can surface the same video
                for candidate in results {
                    if seen_ids.insert(candidate.id.clone()) {
                        candidates.push(candidate);
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Candidate search failed for one seed");
            }
            Err(e) => {
                tracing::error!(error = %e, "Search task join error");
            }
        }
    }

    let pool = diversify(candidates, SOURCING_CHANNEL_CAP);

    tracing::info!(seeds = seeds.len(), pool = pool.len(), "Candidate pool assembled");

    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::{MockListeningHistory, MockVideoSearch};

    fn candidate(id: &str, channel: &str) -> TrackCandidate {
        TrackCandidate {
            id: id.to_string(),
            title: format!("{} - Song", channel),
            channel: channel.to_string(),
            published_at: None,
            duration: None,
            thumbnail_url: None,
        }
    }

    fn intent_with_artist(artist: &str) -> Intent {
        Intent {
            artist: Some(artist.to_string()),
            ..Intent::default()
        }
    }

    #[tokio::test]
    async fn test_seed_priority_order() {
        let mut history = MockListeningHistory::new();
        history
            .expect_similar_artists()
            .returning(|_, _| Ok(vec!["Thom Yorke".to_string(), "Portishead".to_string()]));
        history
            .expect_top_artists()
            .returning(|_, _| Ok(vec!["Four Tet".to_string()]));

        let intent = intent_with_artist("Radiohead");
        let profile = UserProfile {
            lastfm_username: Some("listener".to_string()),
            favorite_artists: vec!["Björk".to_string()],
            ..UserProfile::default()
        };

        let seeds = seed_artists(&history, &intent, &profile).await;

        assert_eq!(
            &seeds[..5],
            &["Radiohead", "Thom Yorke", "Portishead", "Four Tet", "Björk"]
        );
    }

    #[tokio::test]
    async fn test_seed_dedup_is_case_insensitive() {
        let mut history = MockListeningHistory::new();
        history
            .expect_similar_artists()
            .returning(|_, _| Ok(vec!["RADIOHEAD".to_string(), "Muse".to_string()]));

        let intent = intent_with_artist("Radiohead");
        let seeds = seed_artists(&history, &intent, &UserProfile::default()).await;

        assert_eq!(seeds[0], "Radiohead");
        assert_eq!(seeds[1], "Muse");
        assert_eq!(
            seeds.iter().filter(|s| s.eq_ignore_ascii_case("radiohead")).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_seed_cap_at_ten() {
        let mut history = MockListeningHistory::new();
        history.expect_similar_artists().returning(|_, _| {
            Ok((0..5).map(|i| format!("Similar {}", i)).collect())
        });

        let intent = intent_with_artist("Someone");
        let profile = UserProfile {
            favorite_artists: (0..20).map(|i| format!("Favorite {}", i)).collect(),
            ..UserProfile::default()
        };

        let seeds = seed_artists(&history, &intent, &profile).await;
        assert_eq!(seeds.len(), MAX_SEED_ARTISTS);
    }

    #[tokio::test]
    async fn test_empty_inputs_fall_back_to_default_genres() {
        let history = MockListeningHistory::new();

        let seeds = seed_artists(&history, &Intent::default(), &UserProfile::default()).await;

        // Default genres are pop, rock, indie
        assert!(seeds.contains(&"Taylor Swift".to_string()));
        assert!(seeds.contains(&"Foo Fighters".to_string()));
        assert!(seeds.contains(&"Phoebe Bridgers".to_string()));
        assert!(!seeds.is_empty());
    }

    #[tokio::test]
    async fn test_sad_mood_maps_to_indie_alternative() {
        let history = MockListeningHistory::new();
        let intent = Intent {
            mood: Some("sad".to_string()),
            ..Intent::default()
        };

        let seeds = seed_artists(&history, &intent, &UserProfile::default()).await;

        assert!(seeds.contains(&"Phoebe Bridgers".to_string()));
        assert!(seeds.contains(&"Radiohead".to_string()));
    }

    #[tokio::test]
    async fn test_history_failure_is_non_fatal() {
        let mut history = MockListeningHistory::new();
        history
            .expect_similar_artists()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));

        let intent = intent_with_artist("Radiohead");
        let seeds = seed_artists(&history, &intent, &UserProfile::default()).await;

        assert_eq!(seeds[0], "Radiohead");
        assert!(seeds.len() > 1, "genre table should still contribute seeds");
    }

    #[test]
    fn test_build_query_includes_mood_and_genre() {
        let intent = Intent {
            mood: Some("sad".to_string()),
            genre: Some("indie".to_string()),
            ..Intent::default()
        };
        assert_eq!(build_query("Radiohead", &intent), "Radiohead sad indie music");
        assert_eq!(build_query("Radiohead", &Intent::default()), "Radiohead music");
    }

    #[test]
    fn test_diversify_caps_per_channel_preserving_order() {
        let candidates = vec![
            candidate("a", "Vevo"),
            candidate("b", "Vevo"),
            candidate("c", "Indie Channel"),
            candidate("d", "VEVO"),
            candidate("e", "Indie Channel"),
        ];

        let diversified = diversify(candidates, 2);
        let ids: Vec<&str> = diversified.iter().map(|c| c.id.as_str()).collect();

        // Third Vevo entry dropped despite case difference
        assert_eq!(ids, vec!["a", "b", "c", "e"]);
    }

    #[tokio::test]
    async fn test_search_failure_contributes_zero_candidates() {
        let mut search = MockVideoSearch::new();
        search
            .expect_search()
            .withf(|query, _| query.starts_with("Bad"))
            .returning(|_, _| Err(AppError::ExternalApi("quota".to_string())));
        search
            .expect_search()
            .returning(|_, _| Ok(vec![candidate("ok1", "Good Channel")]));

        let search: Arc<dyn VideoSearch> = Arc::new(search);
        let seeds = vec!["Bad Seed".to_string(), "Good Seed".to_string()];

        let pool = search_candidates(&search, &Intent::default(), &seeds).await;

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, "ok1");
    }

    #[tokio::test]
    async fn test_search_candidates_dedups_by_id() {
        let mut search = MockVideoSearch::new();
        search
            .expect_search()
            .returning(|_, _| Ok(vec![candidate("same", "Channel A")]));

        let search: Arc<dyn VideoSearch> = Arc::new(search);
        let seeds = vec!["Seed One".to_string(), "Seed Two".to_string()];

        let pool = search_candidates(&search, &Intent::default(), &seeds).await;
        assert_eq!(pool.len(), 1);
    }
}
