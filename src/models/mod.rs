use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Presentation tier assigned to a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Highlight,
    DeepCut,
    Mainstream,
}

/// Raw video-search result, as returned by the search collaborator
///
/// Request-scoped: candidates are produced per request and discarded once
/// selection has converted the winners into [`Recommendation`]s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackCandidate {
    /// Video identifier from the search provider
    pub id: String,
    /// Raw video title, typically "Artist - Song (Official Video)"
    pub title: String,
    /// Channel / uploader name
    pub channel: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// A single curated track returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: String,
    /// Cleaned song title, parentheticals stripped
    pub title: String,
    pub artist: String,
    /// Album art when the metadata service has it, video thumbnail otherwise
    pub artwork_url: Option<String>,
    /// Source video identifier for playback
    pub video_id: String,
    pub duration: Option<String>,
    pub tier: Tier,
}

/// Structured intent pulled from a free-text message
///
/// Extraction is best-effort: every field is independently optional and an
/// empty intent is a valid outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl Intent {
    /// True when extraction recognized nothing
    pub fn is_empty(&self) -> bool {
        self.mood.is_none()
            && self.genre.is_none()
            && self.artist.is_none()
            && self.activity.is_none()
            && self.query.is_none()
    }
}

/// Engine-facing view of the requesting user
///
/// Entirely optional: an empty profile degrades to generic genre defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub favorite_genres: Vec<String>,
    #[serde(default)]
    pub favorite_moods: Vec<String>,
    /// Listening-history username, enables top-artist lookups
    #[serde(default)]
    pub lastfm_username: Option<String>,
    #[serde(default)]
    pub favorite_artists: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the surrounding chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// The externally visible artifact of one engine call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub explanation: String,
    pub recommendations: Vec<Recommendation>,
}
