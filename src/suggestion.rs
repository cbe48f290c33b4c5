//! Style suggestions from an external vision model.
//!
//! The crate ships no network client. A [`StyleAdvisor`] implementation
//! sends the image and [`SUGGESTION_PROMPT`] to a model and hands back the
//! raw reply, which [`parse_suggestion`] turns into a [`StyleSuggestion`].
//! The session merges a successful suggestion as the `ai-suggested`
//! background kind and ignores failures.

use crate::asset::ImageAsset;
use crate::settings::{Background, BackgroundKind, StylePatch, StyleSettings};
use serde::Deserialize;
use thiserror::Error;

/// Instruction sent alongside the image.
pub const SUGGESTION_PROMPT: &str = "Analyze the colors and mood of this image. Create a CSS \
linear-gradient string that perfectly complements the image (e.g., using dominant colors or \
contrasting colors). Also suggest a shadow intensity between 0 and 100. Return in JSON.";

#[derive(Error, Debug)]
pub enum SuggestionError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("suggestion request failed: {0}")]
    Transport(String),
    #[error("malformed suggestion: {0}")]
    Malformed(String),
}

/// A model's proposal for the frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StyleSuggestion {
    /// CSS `linear-gradient(...)` string.
    pub background: String,
    /// Shadow intensity, 0-100.
    pub shadow: f64,
}

impl StyleSuggestion {
    /// The settings delta this suggestion applies.
    pub fn to_patch(&self) -> StylePatch {
        StylePatch {
            background: Some(Background::parse(&self.background)),
            background_kind: Some(BackgroundKind::AiSuggested),
            shadow_intensity: Some(self.shadow.clamp(0.0, 100.0)),
            ..Default::default()
        }
    }
}

/// Something that can look at an image and propose a background and shadow.
pub trait StyleAdvisor {
    fn suggest(
        &self,
        image: &ImageAsset,
        current: &StyleSettings,
    ) -> Result<StyleSuggestion, SuggestionError>;
}

/// Parse a model reply.
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence.
pub fn parse_suggestion(reply: &str) -> Result<StyleSuggestion, SuggestionError> {
    let body = strip_code_fence(reply.trim());
    let suggestion: StyleSuggestion =
        serde_json::from_str(body).map_err(|e| SuggestionError::Malformed(e.to_string()))?;

    if suggestion.background.trim().is_empty() {
        return Err(SuggestionError::Malformed("empty background".into()));
    }
    if !suggestion.shadow.is_finite() {
        return Err(SuggestionError::Malformed(format!(
            "shadow {} is not a number",
            suggestion.shadow
        )));
    }
    Ok(suggestion)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the info string ("json") on the opening line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
