//! Optional Langfuse trace forwarding
//!
//! Each trace is posted to the Langfuse ingestion API as a `trace-create`
//! event plus a single `span-create` event holding the input and output.
//! Failures are logged and swallowed; telemetry never affects validation.
//! The agent uses [`Telemetry::emit`], which sends on a background task.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Settings;

pub const TRACE_JUDGE_EVALUATION: &str = "gemini_pdf_evaluation";
pub const TRACE_VALIDATION_COMPLETE: &str = "pdf_validation_complete";
pub const TRACE_VALIDATION_ERROR: &str = "pdf_validation_error";

const SPAN_NAME: &str = "pdf_validation_process";

/// Upper bound for one ingestion request
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct LangfuseClient {
    client: Client,
    ingestion_url: String,
    public_key: String,
    secret_key: String,
}

/// Handle for sending traces; a no-op when Langfuse is not configured
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    inner: Option<LangfuseClient>,
}

impl Telemetry {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_timeout(settings, SEND_TIMEOUT)
    }

    fn with_timeout(settings: &Settings, timeout: Duration) -> Self {
        if !settings.langfuse_enabled() {
            debug!("Langfuse not configured; traces disabled");
            return Self::disabled();
        }
        let client = match Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("Could not build Langfuse client, traces disabled: {}", e);
                return Self::disabled();
            }
        };
        Self {
            inner: Some(LangfuseClient {
                client,
                ingestion_url: format!("{}/api/public/ingestion", settings.langfuse_host),
                public_key: settings.langfuse_public_key.clone(),
                secret_key: settings.langfuse_secret_key.clone(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Queue a trace on a background task and return immediately
    pub fn emit(&self, name: &'static str, input: Value, output: Value, metadata: Value) {
        if !self.is_enabled() {
            return;
        }
        let telemetry = self.clone();
        tokio::spawn(async move {
            telemetry.trace(name, input, output, metadata).await;
        });
    }

    /// Send a trace with one span. Returns the trace id when accepted.
    pub async fn trace(
        &self,
        name: &str,
        input: Value,
        output: Value,
        metadata: Value,
    ) -> Option<String> {
        let client = self.inner.as_ref()?;
        let trace_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let batch = json!({
            "batch": [
                {
                    "id": Uuid::new_v4().to_string(),
                    "type": "trace-create",
                    "timestamp": now,
                    "body": {
                        "id": trace_id,
                        "name": name,
                        "timestamp": now,
                        "metadata": metadata,
                    },
                },
                {
                    "id": Uuid::new_v4().to_string(),
                    "type": "span-create",
                    "timestamp": now,
                    "body": {
                        "id": Uuid::new_v4().to_string(),
                        "traceId": trace_id,
                        "name": SPAN_NAME,
                        "startTime": now,
                        "endTime": now,
                        "input": input,
                        "output": output,
                    },
                },
            ],
        });

        let response = client
            .client
            .post(&client.ingestion_url)
            .basic_auth(&client.public_key, Some(&client.secret_key))
            .json(&batch)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                debug!("Langfuse trace '{}' sent ({})", name, trace_id);
                Some(trace_id)
            }
            Ok(resp) => {
                warn!("Langfuse rejected trace '{}': {}", name, resp.status());
                None
            }
            Err(e) => {
                warn!("Langfuse trace '{}' failed: {}", name, e);
                None
            }
        }
    }
}
