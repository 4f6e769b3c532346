//! Google Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared_pdf::ValidationData;
use tracing::{debug, instrument, warn};

use super::{build_prompt, parse_verdict, Judge, JudgeError, JudgeVerdict};
use crate::config::{ConfigError, Settings};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Judge backed by the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiJudge {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    settings: Settings,
}

impl GeminiJudge {
    /// Fails with `ConfigError::MissingApiKey` when no key is configured
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        if settings.google_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self {
            client: Client::new(),
            api_key: settings.google_api_key.clone(),
            model: settings.gemini_model.clone(),
            base_url: settings.gemini_base_url.clone(),
            settings: settings.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send a prompt and return the first candidate's text
    pub async fn generate(&self, prompt: String) -> Result<String, JudgeError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}", status);
            return Err(JudgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(JudgeError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Judge for GeminiJudge {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, data), fields(model = %self.model, signatures = data.signature_count))]
    async fn evaluate(&self, data: &ValidationData) -> Result<JudgeVerdict, JudgeError> {
        let prompt = build_prompt(data, &self.settings);
        debug!("Prompt is {} chars", prompt.len());

        let text = self.generate(prompt).await?;
        let verdict = parse_verdict(&text)?;
        debug!(
            "Gemini verdict: valid={}, confidence={:.2}",
            verdict.is_valid, verdict.confidence
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use shared_types::{DocumentType, FormFields, ValidationStatus};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        api_key: Arc<Mutex<Option<String>>>,
        body: Arc<Mutex<Option<Value>>>,
    }

    /// Serve a fixed response on an ephemeral port and return its base URL
    async fn stub_server(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/v1beta/models/:model_action",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            *captured.api_key.lock().unwrap() = headers
                                .get("x-goog-api-key")
                                .and_then(|v| v.to_str().ok())
                                .map(String::from);
                            *captured.body.lock().unwrap() = Some(body);
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    fn settings(base_url: &str) -> Settings {
        Settings {
            google_api_key: "test-key".to_string(),
            gemini_base_url: base_url.to_string(),
            ..Settings::default()
        }
    }

    fn data() -> ValidationData {
        ValidationData {
            form_fields: FormFields::new(),
            signature_valid: true,
            signature_count: 3,
            document_type: DocumentType::NewVpnRequest,
            raw_text: "FORMULIR PERMOHONAN VPN BARU".to_string(),
        }
    }

    fn candidate(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = GeminiJudge::new(&Settings::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);
    }

    #[tokio::test]
    async fn test_evaluate_parses_candidate_text() {
        let reply = candidate(
            "```json\n{\"is_valid\": true, \"status\": \"approved_for_processing\", \"confidence\": 0.9}\n```",
        );
        let (base_url, captured) = stub_server(StatusCode::OK, reply).await;
        let judge = GeminiJudge::new(&settings(&base_url)).unwrap();

        let verdict = judge.evaluate(&data()).await.unwrap();
        assert!(verdict.is_valid);
        assert_eq!(verdict.status, ValidationStatus::Approved);
        assert_eq!(verdict.confidence, 0.9);

        assert_eq!(
            captured.api_key.lock().unwrap().as_deref(),
            Some("test-key")
        );
        let body = captured.body.lock().unwrap().clone().unwrap();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Signatures currently detected: 3"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_api_error_surfaces_status() {
        let (base_url, _) = stub_server(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "message": "quota exceeded" } }),
        )
        .await;
        let judge = GeminiJudge::new(&settings(&base_url)).unwrap();

        match judge.evaluate(&data()).await {
            Err(JudgeError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("quota exceeded"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_error() {
        let (base_url, _) = stub_server(StatusCode::OK, json!({ "candidates": [] })).await;
        let judge = GeminiJudge::new(&settings(&base_url)).unwrap();
        assert!(matches!(
            judge.evaluate(&data()).await,
            Err(JudgeError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_non_json_answer_is_parse_error() {
        let (base_url, _) =
            stub_server(StatusCode::OK, candidate("The document looks fine to me.")).await;
        let judge = GeminiJudge::new(&settings(&base_url)).unwrap();
        assert!(matches!(
            judge.evaluate(&data()).await,
            Err(JudgeError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let judge = GeminiJudge::new(&settings("http://127.0.0.1:1")).unwrap();
        assert!(matches!(
            judge.evaluate(&data()).await,
            Err(JudgeError::Request(_))
        ));
    }
}
