//! Coin recognition contract
//!
//! The recognition service is asked for strict JSON but answers in free text,
//! sometimes wrapped in a markdown code fence. This module turns that text into
//! a [`CoinAnalysis`] or a [`RecognitionError`] carrying the raw text.

use async_trait::async_trait;
use coinlens_common::CoinAnalysis;
use thiserror::Error;

/// Instruction sent alongside the two coin images
pub const IDENTIFY_PROMPT: &str = "Identify this coin from the front and back images. \
Return ONLY a valid JSON object with the following fields: name, description, year, country. \
Do not include markdown code blocks.";

/// Recognition errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// One of the images was empty
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The service call failed or returned nothing usable
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The cleaned answer was not a JSON object
    #[error("Malformed response: {reason}, text: {raw}")]
    MalformedResponse { reason: String, raw: String },
}

/// Identifies a coin from its front and back images
#[async_trait]
pub trait CoinRecognizer: Send + Sync {
    async fn identify_coin(
        &self,
        front_image: &[u8],
        back_image: &[u8],
    ) -> Result<CoinAnalysis, RecognitionError>;
}

/// Strip a surrounding markdown code fence and whitespace
///
/// Order matters: leading "```json", then leading "```", then trailing "```",
/// then trim.
pub fn clean_response_text(text: &str) -> &str {
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Decode cleaned response text into an analysis
pub fn parse_analysis(cleaned: &str) -> Result<CoinAnalysis, RecognitionError> {
    let malformed = |reason: String| RecognitionError::MalformedResponse {
        reason,
        raw: cleaned.to_string(),
    };

    let value: serde_json::Value =
        serde_json::from_str(cleaned).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed("expected a JSON object".to_string()));
    }

    serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
}
