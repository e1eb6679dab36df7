// src/provider/openai.rs — OpenAI-compatible chat-completions review client

use async_trait::async_trait;
use std::time::{Duration, Instant};
use url::Url;

use super::photo::jpeg_data_uri;
use super::{ContentPart, Message, RequestPayload, ResponseFormat, ReviewProvider};
use crate::infra::config::{ProviderConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::infra::errors::MirrorsError;
use crate::review::{parse_review_response, OutfitReview, ReviewSchema};

/// Persona pinned in the system message of every request.
pub const SYSTEM_PROMPT: &str = "You are a strict, no-nonsense outfit reviewer designed for a \
mirror selfie review app. You must output only valid JSON matching the requested structure.";

const MAX_LOGGED_BODY: usize = 2_000;

pub struct OpenAiReviewClient {
    api_key: String,
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    max_tokens: u32,
    detail: String,
    jpeg_quality: u8,
    schema: ReviewSchema,
}

impl OpenAiReviewClient {
    pub fn new(api_key: String) -> Result<Self, MirrorsError> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(api_key: String, endpoint: &str) -> Result<Self, MirrorsError> {
        let defaults = ProviderConfig {
            endpoint: endpoint.to_string(),
            ..ProviderConfig::default()
        };
        Self::from_config(&defaults, api_key, ReviewSchema::Open)
    }

    pub fn from_config(
        config: &ProviderConfig,
        api_key: String,
        schema: ReviewSchema,
    ) -> Result<Self, MirrorsError> {
        let endpoint = parse_endpoint(&config.endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(request_failed)?;

        let model = if config.model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            config.model.clone()
        };

        Ok(Self {
            api_key,
            client,
            endpoint,
            model,
            max_tokens: config.max_tokens,
            detail: config.detail.clone(),
            jpeg_quality: config.jpeg_quality,
            schema,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// System persona plus one user message: prompt text, then the image.
    pub fn build_payload(&self, image_uri: String, prompt: &str) -> RequestPayload {
        RequestPayload {
            model: self.model.clone(),
            messages: vec![
                Message::system(SYSTEM_PROMPT),
                Message::user_parts(vec![
                    ContentPart::text(prompt),
                    ContentPart::image(image_uri, self.detail.clone()),
                ]),
            ],
            max_tokens: self.max_tokens,
            response_format: Some(ResponseFormat::json_object()),
        }
    }
}

#[async_trait]
impl ReviewProvider for OpenAiReviewClient {
    fn id(&self) -> &str {
        "openai"
    }

    async fn fetch_review(
        &self,
        image: &[u8],
        prompt: &str,
    ) -> Result<OutfitReview, MirrorsError> {
        let started = Instant::now();
        let image_uri = jpeg_data_uri(image, self.jpeg_quality)?;
        tracing::debug!(
            model = %self.model,
            image_uri_bytes = image_uri.len(),
            prompt_chars = prompt.len(),
            "Sending review request"
        );
        let payload = self.build_payload(image_uri, prompt);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        tracing::debug!(status = %status, headers = ?response.headers(), "Response received");

        let body = response.bytes().await.map_err(request_failed)?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            body = %truncate_for_log(&body),
            "Response body"
        );

        if !status.is_success() {
            tracing::warn!("HTTP error {} from review endpoint", status);
            return Err(MirrorsError::InvalidResponse {
                status: Some(status.as_u16()),
                message: truncate_for_log(&body),
            });
        }

        parse_review_response(&body, &self.schema)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, MirrorsError> {
    let url = Url::parse(raw).map_err(|_| MirrorsError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "https" | "http" => Ok(url),
        _ => Err(MirrorsError::InvalidUrl(raw.to_string())),
    }
}

fn request_failed(e: reqwest::Error) -> MirrorsError {
    tracing::warn!("Network error: {}", e);
    MirrorsError::RequestFailed {
        message: e.to_string(),
        timeout: e.is_timeout(),
    }
}

fn truncate_for_log(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.chars().count() <= MAX_LOGGED_BODY {
        return text.into_owned();
    }
    let cut: String = text.chars().take(MAX_LOGGED_BODY).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ImageUrl, MessageContent, Role};

    #[test]
    fn test_default_endpoint_and_model() {
        let client = OpenAiReviewClient::new("sk-test".into()).unwrap();
        assert_eq!(client.endpoint().as_str(), DEFAULT_ENDPOINT);
        assert_eq!(client.model(), "gpt-4.1-mini");
        assert_eq!(client.id(), "openai");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let err = OpenAiReviewClient::with_endpoint("k".into(), "not a url").err().unwrap();
        assert!(matches!(err, MirrorsError::InvalidUrl(ref u) if u == "not a url"));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = OpenAiReviewClient::with_endpoint("k".into(), "ftp://example.com/x")
            .err()
            .unwrap();
        assert!(matches!(err, MirrorsError::InvalidUrl(_)));
    }

    #[test]
    fn test_build_payload_shape() {
        let client = OpenAiReviewClient::new("sk-test".into()).unwrap();
        let payload = client.build_payload("data:image/jpeg;base64,AA".into(), "Rate it");

        assert_eq!(payload.max_tokens, 300);
        assert_eq!(payload.response_format, Some(ResponseFormat::json_object()));
        assert_eq!(payload.messages.len(), 2);
        assert_eq!(payload.messages[0].role, Role::System);
        assert_eq!(
            payload.messages[0].content,
            MessageContent::Text(SYSTEM_PROMPT.into())
        );

        let MessageContent::Parts(parts) = &payload.messages[1].content else {
            panic!("user message should carry parts");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], ContentPart::text("Rate it"));
        assert_eq!(
            parts[1],
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/jpeg;base64,AA".into(),
                    detail: Some("high".into()),
                }
            }
        );
    }

    #[test]
    fn test_empty_model_falls_back_to_default() {
        let config = ProviderConfig {
            model: String::new(),
            ..ProviderConfig::default()
        };
        let client = OpenAiReviewClient::from_config(&config, "k".into(), ReviewSchema::Open)
            .unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log(b"short"), "short");
        let long = vec![b'a'; MAX_LOGGED_BODY + 10];
        let out = truncate_for_log(&long);
        assert_eq!(out.chars().count(), MAX_LOGGED_BODY + 1);
        assert!(out.ends_with('…'));
    }
}
