//! Gemini API client
//!
//! Sends the identification prompt and both coin images to the
//! `generateContent` endpoint and normalizes the text answer.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use coinlens_common::config::GeminiConfig;
use coinlens_common::CoinAnalysis;
use serde::{Deserialize, Serialize};

use super::recognition::{
    clean_response_text, parse_analysis, CoinRecognizer, RecognitionError, IDENTIFY_PROMPT,
};

const USER_AGENT: &str = concat!("CoinLens/", env!("CARGO_PKG_VERSION"));
const IMAGE_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl<'a> RequestPart<'a> {
    fn image(bytes: &[u8]) -> Self {
        RequestPart::InlineData {
            inline_data: InlineData {
                mime_type: IMAGE_MIME_TYPE,
                data: BASE64.encode(bytes),
            },
        }
    }
}

/// Gemini recognition client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, RecognitionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RecognitionError::Upstream(format!("failed to create client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn generate(
        &self,
        request: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, RecognitionError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| RecognitionError::Upstream(format!("gemini generation failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Upstream(format!(
                "gemini returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RecognitionError::Upstream(format!("unreadable gemini response: {}", e)))
    }
}

/// Concatenate the text parts of the first candidate
fn first_candidate_text(response: GenerateContentResponse) -> Result<String, RecognitionError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| RecognitionError::Upstream("no response from gemini".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(RecognitionError::Upstream(
            "gemini candidate has no text content".to_string(),
        ));
    }

    Ok(text)
}

#[async_trait]
impl CoinRecognizer for GeminiClient {
    async fn identify_coin(
        &self,
        front_image: &[u8],
        back_image: &[u8],
    ) -> Result<CoinAnalysis, RecognitionError> {
        if front_image.is_empty() || back_image.is_empty() {
            return Err(RecognitionError::InvalidInput(
                "images cannot be empty".to_string(),
            ));
        }

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text {
                        text: IDENTIFY_PROMPT,
                    },
                    RequestPart::image(front_image),
                    RequestPart::image(back_image),
                ],
            }],
        };

        tracing::debug!(model = %self.model, "Calling Gemini API");
        let response = self.generate(&request).await?;
        tracing::debug!(
            candidates = response.candidates.len(),
            "Gemini response received"
        );

        let text = first_candidate_text(response)?;
        let analysis = parse_analysis(clean_response_text(&text))?;
        tracing::info!(name = %analysis.name, "Parsed Gemini response");

        Ok(analysis)
    }
}
