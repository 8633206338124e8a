/// Response composition
///
/// Turns the final track list into a short conversational explanation via
/// the text-generation collaborator, with a deterministic template standing
/// in whenever that call fails or returns nothing.
use crate::{
    models::{ChatTurn, Intent, Recommendation, Tier},
    services::providers::TextGenerator,
};

/// Trailing conversation turns forwarded for continuity
const HISTORY_WINDOW: usize = 10;

/// Composes the explanation accompanying a recommendation set
pub async fn compose(
    text_gen: &dyn TextGenerator,
    message: &str,
    recommendations: &[Recommendation],
    intent: &Intent,
    history: &[ChatTurn],
) -> String {
    let prompt = build_prompt(message, recommendations);
    let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

    match text_gen.chat(&prompt, recent).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::warn!("Empty composition response, using template");
            fallback_explanation(recommendations, intent)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Composition call failed, using template");
            fallback_explanation(recommendations, intent)
        }
    }
}

fn build_prompt(message: &str, recommendations: &[Recommendation]) -> String {
    let mut prompt = format!(
        "The user asked for music recommendations: \"{}\"\n\nThese tracks were picked for them:\n",
        message
    );

    for (index, rec) in recommendations.iter().enumerate() {
        prompt.push_str(&format!("{}. {} by {}\n", index + 1, rec.title, rec.artist));
    }

    prompt.push_str(
        "\nWrite a short, enthusiastic 2-3 sentence reply explaining why these tracks fit \
         the request. Plain text only, no markdown, no numbered list.",
    );

    prompt
}

/// Deterministic template used when the collaborator cannot respond
pub fn fallback_explanation(recommendations: &[Recommendation], intent: &Intent) -> String {
    let mut text = String::from("Here are some tracks I picked out for you!");

    if let Some(highlight) = recommendations.iter().find(|r| r.tier == Tier::Highlight) {
        text.push_str(&format!(
            " I think you'll love \"{}\" by {}.",
            highlight.title, highlight.artist
        ));
    }

    if let Some(mood) = &intent.mood {
        text.push_str(&format!(" These should suit your {} mood.", mood));
    } else if let Some(activity) = &intent.activity {
        text.push_str(&format!(" They should be perfect for {}.", activity));
    } else {
        text.push_str(" There's a mix of crowd-pleasers and deeper cuts in here.");
    }

    text.push_str(" Let me know what you think, or ask for more!");

    text
}
