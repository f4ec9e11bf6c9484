// Slack incoming-webhook delivery. Optional: with no webhook configured the
// send is skipped, which is the normal state for local runs.

use std::time::Duration;

use thiserror::Error;

use crate::config::ScanConfig;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("notification endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
}

pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.slack_webhook_url.clone())
    }

    // Returns Ok(false) when no webhook is configured (delivery skipped),
    // Ok(true) on successful delivery.
    pub async fn send(&self, text: &str) -> Result<bool, NotifyError> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("no webhook configured, skipping notification");
            return Ok(false);
        };

        let response = self
            .client
            .post(url)
            .timeout(NOTIFY_TIMEOUT)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn send_posts_text_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({ "text": "deal found" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(Some(server.uri()));
        let delivered = notifier.send("deal found").await.unwrap();
        assert!(delivered);
    }

    #[tokio::test]
    async fn unconfigured_webhook_skips_silently() {
        let notifier = SlackNotifier::new(None);
        let delivered = notifier.send("deal found").await.unwrap();
        assert!(!delivered);
    }

    #[tokio::test]
    async fn failure_status_carries_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("channel_not_found"))
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(Some(server.uri()));
        let err = notifier.send("deal found").await.unwrap_err();
        match err {
            NotifyError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "channel_not_found");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }
}
