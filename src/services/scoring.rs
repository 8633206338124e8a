/// Relevance scoring, tier selection, and candidate conversion
///
/// Scoring is a deterministic additive heuristic capped at 100. The weight
/// values are tuned constants carried over from production behavior; they
/// have no analytical derivation and should not be "improved" casually.
///
/// Selection is stateful: tiers are picked in a fixed order against one
/// shared exclusion set so no track appears twice in a result.
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::{
    models::{Intent, Recommendation, Tier, TrackCandidate},
    services::providers::ListeningHistory,
    services::sourcing,
};

// Primary-match branch, highest applicable wins
const ARTIST_MATCH_SCORE: u32 = 40;
const GENRE_MATCH_SCORE: u32 = 30;
const MOOD_MATCH_SCORE: u32 = 25;
const BASE_SCORE: u32 = 10;

/// Per intent keyword found in the title, independent of the primary branch
const KEYWORD_BONUS: u32 = 10;

// Quality heuristics
const OFFICIAL_BONUS: u32 = 10;
const AUDIO_VIDEO_BONUS: u32 = 5;
const NOT_COVER_BONUS: u32 = 5;

// Recency
const RECENT_BONUS: u32 = 10; // within a year
const MODERN_BONUS: u32 = 5; // within three years

const MAX_SCORE: u32 = 100;

/// How many candidates each non-highlight tier pulls before truncation
pub const DEEP_CUT_POOL_SIZE: usize = 5;
pub const MAINSTREAM_POOL_SIZE: usize = 3;

/// Per-channel cap applied when picking a tier
pub const SELECTION_CHANNEL_CAP: usize = 1;

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.contains(&needle.to_lowercase())
}

/// Scores a candidate against the extracted intent, 0 to [`MAX_SCORE`]
///
/// Deterministic: identical inputs always produce the identical score.
pub fn relevance_score(candidate: &TrackCandidate, intent: &Intent, now: DateTime<Utc>) -> u32 {
    let title = candidate.title.to_lowercase();
    let channel = candidate.channel.to_lowercase();

    let mut score = match (&intent.artist, &intent.genre, &intent.mood) {
        (Some(artist), _, _) if contains(&title, artist) || contains(&channel, artist) => {
            ARTIST_MATCH_SCORE
        }
        (_, Some(genre), _) if contains(&title, genre) => GENRE_MATCH_SCORE,
        (_, _, Some(mood)) if contains(&title, mood) => MOOD_MATCH_SCORE,
        _ => BASE_SCORE,
    };

    for keyword in [&intent.mood, &intent.genre, &intent.activity, &intent.query]
        .into_iter()
        .flatten()
    {
        if contains(&title, keyword) {
            score += KEYWORD_BONUS;
        }
    }

    if title.contains("official") {
        score += OFFICIAL_BONUS;
    }
    if title.contains("audio") || title.contains("video") {
        score += AUDIO_VIDEO_BONUS;
    }
    if !title.contains("cover") && !title.contains("karaoke") {
        score += NOT_COVER_BONUS;
    }

    if let Some(published) = candidate.published_at {
        let age = now.signed_duration_since(published);
        if age <= Duration::days(365) {
            score += RECENT_BONUS;
        } else if age <= Duration::days(3 * 365) {
            score += MODERN_BONUS;
        }
    }

    score.min(MAX_SCORE)
}

/// Picks the single best candidate; ties break to first input occurrence
pub fn pick_highlight<'a>(
    pool: &'a [TrackCandidate],
    intent: &Intent,
    now: DateTime<Utc>,
) -> Option<&'a TrackCandidate> {
    let mut best: Option<(&TrackCandidate, u32)> = None;

    for candidate in pool {
        let score = relevance_score(candidate, intent, now);
        // Strict comparison keeps the first occurrence on ties
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Picks up to `take` candidates for a tier from the not-yet-excluded pool
///
/// Re-diversifies at one candidate per channel so a tier never repeats an
/// uploader. Returns an empty vector when the pool is exhausted; the caller
/// substitutes the tier's fallback in that case.
pub fn pick_tier<'a>(
    pool: &'a [TrackCandidate],
    excluded: &HashSet<String>,
    take: usize,
) -> Vec<&'a TrackCandidate> {
    let remaining: Vec<TrackCandidate> = pool
        .iter()
        .filter(|c| !excluded.contains(&c.id))
        .cloned()
        .collect();

    let diversified = sourcing::diversify(remaining, SELECTION_CHANNEL_CAP);
    let picked_ids: HashSet<String> = diversified
        .into_iter()
        .take(take)
        .map(|c| c.id)
        .collect();

    // Map back to pool references, preserving pool order
    pool.iter().filter(|c| picked_ids.contains(&c.id)).collect()
}

/// Strips `(...)` and `[...]` annotations and collapses leftover whitespace
pub fn clean_title(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut depth = 0u32;

    for ch in raw.chars() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => cleaned.push(ch),
            _ => {}
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a raw video title into (artist, song title)
///
/// Titles usually follow "Artist - Song"; when no dash is present the
/// channel name stands in for the artist and the whole title is the song.
pub fn split_title(raw: &str, channel: &str) -> (String, String) {
    match raw.split_once('-') {
        Some((artist, title)) if !artist.trim().is_empty() && !title.trim().is_empty() => {
            (artist.trim().to_string(), clean_title(title))
        }
        _ => (channel.to_string(), clean_title(raw)),
    }
}

/// Converts a selected candidate into a [`Recommendation`]
///
/// Album art comes from the metadata collaborator when available; any
/// failure there silently falls back to the video thumbnail.
pub async fn to_recommendation(
    history: &dyn ListeningHistory,
    candidate: &TrackCandidate,
    tier: Tier,
) -> Recommendation {
    let (artist, title) = split_title(&candidate.title, &candidate.channel);

    let artwork_url = match history.track_art(&artist, &title).await {
        Ok(Some(art)) => Some(art),
        Ok(None) => candidate.thumbnail_url.clone(),
        Err(e) => {
            tracing::debug!(artist = %artist, title = %title, error = %e, "Album art lookup failed");
            candidate.thumbnail_url.clone()
        }
    };

    Recommendation {
        id: candidate.id.clone(),
        title,
        artist,
        artwork_url,
        video_id: candidate.id.clone(),
        duration: candidate.duration.clone(),
        tier,
    }
}

/// Fixed substitute served when a tier's candidate pool is empty
pub fn fallback_recommendation(tier: Tier) -> Recommendation {
    let (id, title, artist, video_id) = match tier {
        Tier::Highlight => (
            "fallback-highlight",
            "Bohemian Rhapsody",
            "Queen",
            "fJ9rUzIMcZQ",
        ),
        Tier::DeepCut => ("fallback-deep-cut", "Pink Moon", "Nick Drake", "vaOvA1xqNCY"),
        Tier::Mainstream => (
            "fallback-mainstream",
            "Blinding Lights",
            "The Weeknd",
            "4NRXx6U8ABQ",
        ),
    };

    Recommendation {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        artwork_url: None,
        video_id: video_id.to_string(),
        duration: None,
        tier,
    }
}
