// src/dispatch.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::Config;

/// Asynchronous outbound text-message delivery.
///
/// Delivery failures are logged by the implementation and never surfaced to
/// callers: a question counts as sent once it is activated and queued,
/// regardless of individual delivery outcomes.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    async fn send_message(&self, phone: &str, text: &str);
}

/// HTTP gateway client for the messaging channel.
///
/// Posts `{number, text}` to `{base}/message/sendText/{instance}` with an
/// `apikey` header. Responses and latencies are logged; message contents are
/// not.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    instance: String,
}

impl WebhookDispatcher {
    pub fn new(api_url: String, api_key: String, instance: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_url,
            api_key,
            instance,
        }
    }
}

#[async_trait]
impl MessageDispatcher for WebhookDispatcher {
    async fn send_message(&self, phone: &str, text: &str) {
        let endpoint = format!(
            "{}/message/sendText/{}",
            self.api_url.trim_end_matches('/'),
            self.instance
        );
        let payload = serde_json::json!({
            "number": phone,
            "text": text,
        });

        let started = Instant::now();
        match self
            .client
            .post(&endpoint)
            .header("apikey", &self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::info!(
                    "Message delivered to {} ({} in {}ms)",
                    phone,
                    response.status(),
                    started.elapsed().as_millis()
                );
            }
            Ok(response) => {
                tracing::error!(
                    "Gateway rejected message to {}: {}",
                    phone,
                    response.status()
                );
            }
            Err(e) => {
                tracing::error!("Failed to deliver message to {}: {}", phone, e);
            }
        }
    }
}

/// Used when the gateway is not configured; messages are logged and dropped
/// so development deployments run without a messaging channel.
pub struct LogOnlyDispatcher;

#[async_trait]
impl MessageDispatcher for LogOnlyDispatcher {
    async fn send_message(&self, phone: &str, _text: &str) {
        tracing::warn!("Message gateway not configured, dropping message to {}", phone);
    }
}

/// Builds the dispatcher matching the configuration: the webhook client when
/// the gateway settings are complete, the log-only fallback otherwise.
pub fn from_config(config: &Config) -> Arc<dyn MessageDispatcher> {
    match (
        &config.dispatch_api_url,
        &config.dispatch_api_key,
        &config.dispatch_instance,
    ) {
        (Some(url), Some(key), Some(instance)) => Arc::new(WebhookDispatcher::new(
            url.clone(),
            key.clone(),
            instance.clone(),
        )),
        _ => {
            tracing::warn!("Message gateway configuration missing; messages will not be sent");
            Arc::new(LogOnlyDispatcher)
        }
    }
}
