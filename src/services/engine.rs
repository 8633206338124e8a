/// Recommendation orchestration
///
/// [`RecommendationEngine`] is the façade the chat surface calls. One
/// request flows intent extraction → candidate sourcing → tiered selection
/// → response composition. Each stage degrades locally (empty intent, thin
/// candidate pool, template text); anything that still escapes is caught at
/// this level and replaced by a complete static result, so `generate` never
/// fails.
use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{ChatTurn, Intent, Recommendation, RecommendationResult, Tier, TrackCandidate, UserProfile},
    services::{
        composer, intent, scoring, sourcing,
        providers::{ListeningHistory, TextGenerator, VideoSearch},
    },
};

/// Served when even the orchestrator-level chat attempt fails
const STATIC_FALLBACK_TEXT: &str =
    "I had trouble reaching my music sources just now, so here are a few all-time \
     favorites to tide you over. Ask me again in a moment!";

const FALLBACK_CHAT_PROMPT: &str =
    "Briefly and warmly tell the user you are serving a few classic song picks while \
     their personalized recommendations are unavailable. 1-2 sentences, plain text.";

/// Tunable selection parameters with the observed production defaults
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub deep_cut_count: usize,
    pub mainstream_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deep_cut_count: 3,
            mainstream_count: 3,
        }
    }
}

pub struct RecommendationEngine {
    text_gen: Arc<dyn TextGenerator>,
    history: Arc<dyn ListeningHistory>,
    search: Arc<dyn VideoSearch>,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(
        text_gen: Arc<dyn TextGenerator>,
        history: Arc<dyn ListeningHistory>,
        search: Arc<dyn VideoSearch>,
    ) -> Self {
        Self::with_config(text_gen, history, search, EngineConfig::default())
    }

    pub fn with_config(
        text_gen: Arc<dyn TextGenerator>,
        history: Arc<dyn ListeningHistory>,
        search: Arc<dyn VideoSearch>,
        config: EngineConfig,
    ) -> Self {
        Self {
            text_gen,
            history,
            search,
            config,
        }
    }

    /// Produces a complete recommendation result for one user message
    ///
    /// Infallible by contract: the failure boundary converts any pipeline
    /// error into the static fallback set plus a best-effort explanation.
    pub async fn generate(
        &self,
        message: &str,
        profile: &UserProfile,
        chat_history: &[ChatTurn],
    ) -> RecommendationResult {
        match self.run_pipeline(message, profile, chat_history).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Recommendation pipeline failed, serving fallback set");
                self.fallback_result(chat_history).await
            }
        }
    }

    async fn run_pipeline(
        &self,
        message: &str,
        profile: &UserProfile,
        chat_history: &[ChatTurn],
    ) -> AppResult<RecommendationResult> {
        let intent = intent::extract(self.text_gen.as_ref(), message).await;
        let seeds = sourcing::seed_artists(self.history.as_ref(), &intent, profile).await;
        let pool = sourcing::search_candidates(&self.search, &intent, &seeds).await;

        let recommendations = self.select_tiers(&pool, &intent).await;

        let explanation = composer::compose(
            self.text_gen.as_ref(),
            message,
            &recommendations,
            &intent,
            chat_history,
        )
        .await;

        tracing::info!(
            recommendations = recommendations.len(),
            pool = pool.len(),
            "Recommendation result assembled"
        );

        Ok(RecommendationResult {
            explanation,
            recommendations,
        })
    }

    /// Three-step selection over one shared exclusion set
    ///
    /// Order matters: each tier must not repeat an earlier tier's picks.
    async fn select_tiers(
        &self,
        pool: &[TrackCandidate],
        intent: &Intent,
    ) -> Vec<Recommendation> {
        let now = Utc::now();
        let mut excluded: HashSet<String> = HashSet::new();
        let mut recommendations = Vec::new();

        // 1. Highlight: single best-scoring candidate
        match scoring::pick_highlight(pool, intent, now) {
            Some(winner) => {
                excluded.insert(winner.id.clone());
                recommendations
                    .push(scoring::to_recommendation(self.history.as_ref(), winner, Tier::Highlight).await);
            }
            None => {
                tracing::warn!("Empty candidate pool, serving fallback highlight");
                recommendations.push(scoring::fallback_recommendation(Tier::Highlight));
            }
        }

        // 2. Deep cuts: pull a wider slice, exclude all of it, show the top few
        let deep_cut_pool = self.config.deep_cut_count.max(scoring::DEEP_CUT_POOL_SIZE);
        let deep_cuts = scoring::pick_tier(pool, &excluded, deep_cut_pool);
        if deep_cuts.is_empty() {
            recommendations.push(scoring::fallback_recommendation(Tier::DeepCut));
        } else {
            for candidate in &deep_cuts {
                excluded.insert(candidate.id.clone());
            }
            let mut converted = Vec::new();
            for candidate in &deep_cuts {
                converted
                    .push(scoring::to_recommendation(self.history.as_ref(), candidate, Tier::DeepCut).await);
            }
            converted.truncate(self.config.deep_cut_count);
            recommendations.extend(converted);
        }

        // 3. Mainstream: same dance over the further-excluded pool
        let mainstream_pool = self.config.mainstream_count.max(scoring::MAINSTREAM_POOL_SIZE);
        let mainstream = scoring::pick_tier(pool, &excluded, mainstream_pool);
        if mainstream.is_empty() {
            recommendations.push(scoring::fallback_recommendation(Tier::Mainstream));
        } else {
            for candidate in &mainstream {
                excluded.insert(candidate.id.clone());
            }
            let mut converted = Vec::new();
            for candidate in &mainstream {
                converted
                    .push(scoring::to_recommendation(self.history.as_ref(), candidate, Tier::Mainstream).await);
            }
            converted.truncate(self.config.mainstream_count);
            recommendations.extend(converted);
        }

        recommendations
    }

    /// Orchestrator-level fallback: a fixed set covering all three tiers
    /// plus one direct chat attempt for the explanation
    async fn fallback_result(&self, chat_history: &[ChatTurn]) -> RecommendationResult {
        let recommendations = vec![
            scoring::fallback_recommendation(Tier::Highlight),
            scoring::fallback_recommendation(Tier::DeepCut),
            scoring::fallback_recommendation(Tier::Mainstream),
        ];

        let explanation = match self.text_gen.chat(FALLBACK_CHAT_PROMPT, chat_history).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => STATIC_FALLBACK_TEXT.to_string(),
        };

        RecommendationResult {
            explanation,
            recommendations,
        }
    }
}
