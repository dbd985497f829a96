use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationRequest, GenerativeModel, InlineImage};


#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl From<InlineImage> for Part {
    fn from(image: InlineImage) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type,
                data: image.data,
            },
        }
    }
}


/// Client for the `generateContent` REST call. One instance is shared by all requests.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let mut parts = vec![Part::Text { text: request.prompt }];
        if let Some(image) = request.image {
            parts.push(image.into());
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
            },
        };

        tracing::debug!(model = %self.model, max_output_tokens = request.max_output_tokens, "calling generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .context("generateContent request failed")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("failed to read generateContent response")?;

        ensure!(
            status.is_success(),
            "generateContent returned status {}, response: {}",
            status,
            text
        );

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).context("failed to parse generateContent response")?;

        let reply = first_candidate_text(parsed);
        ensure!(!reply.trim().is_empty(), "model returned no text");

        Ok(reply)
    }
}

fn first_candidate_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| match part {
                    Part::Text { text } => Some(text),
                    Part::InlineData { .. } => None,
                })
                .collect::<String>()
        })
        .unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_text_only() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-pro:generateContent"))
            .and(query_param("key", "secret"))
            .and(body_json(serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "User: hi" }] }],
                "generationConfig": { "maxOutputTokens": 80 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("Hello!")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-1.5-pro", "secret");
        let reply = client
            .generate(GenerationRequest {
                prompt: "User: hi".to_string(),
                image: None,
                max_output_tokens: 80,
            })
            .await
            .unwrap();

        assert_eq!(reply, "Hello!");
    }

    #[tokio::test]
    async fn test_generate_with_inline_image() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-pro:generateContent"))
            .and(body_json(serde_json::json!({
                "contents": [{ "role": "user", "parts": [
                    { "text": "User: what is this?" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "abc123" } }
                ] }],
                "generationConfig": { "maxOutputTokens": 80 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("A rash.")))
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-1.5-pro", "secret");
        let reply = client
            .generate(GenerationRequest {
                prompt: "User: what is this?".to_string(),
                image: Some(InlineImage::jpeg("abc123")),
                max_output_tokens: 80,
            })
            .await
            .unwrap();

        assert_eq!(reply, "A rash.");
    }

    #[tokio::test]
    async fn test_generate_joins_text_parts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "Drink " }, { "text": "water." }] } }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-1.5-pro", "secret");
        let reply = client
            .generate(GenerationRequest {
                prompt: "p".to_string(),
                image: None,
                max_output_tokens: 20,
            })
            .await
            .unwrap();

        assert_eq!(reply, "Drink water.");
    }

    #[tokio::test]
    async fn test_generate_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-1.5-pro", "bad");
        let err = client
            .generate(GenerationRequest {
                prompt: "p".to_string(),
                image: None,
                max_output_tokens: 80,
            })
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.ends_with("response: API key not valid"));
        assert!(!message.contains("Ok("));
    }

    #[tokio::test]
    async fn test_generate_without_candidates_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-1.5-pro", "secret");
        let err = client
            .generate(GenerationRequest {
                prompt: "p".to_string(),
                image: None,
                max_output_tokens: 80,
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "model returned no text");
    }
}
