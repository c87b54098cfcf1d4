use super::payload::BookingPayload;
use async_trait::async_trait;
use std::fmt::Debug;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("webhook rejected the booking with status {status}")]
    Rejected { status: u16 },
    #[error("webhook unreachable: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Outbound hook that records a booking with the workflow automation.
#[async_trait]
pub trait SubmissionGateway: Debug + Send + Sync {
    async fn submit(&self, payload: &BookingPayload) -> Result<(), GatewayError>;
}

/// Posts the payload as JSON; any 2xx counts as accepted.
#[derive(Debug, Clone)]
pub struct WebhookGateway {
    client: reqwest::Client,
    url: Url,
}

impl WebhookGateway {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl SubmissionGateway for WebhookGateway {
    async fn submit(&self, payload: &BookingPayload) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(GatewayError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
