use super::{parse_response, TrackingError, TrackingFetcher, TrackingQuery, TrackingResult};
use crate::config::ApiConfig;
use async_trait::async_trait;
use serde::Serialize;

/// Looks shipments up by POSTing the tracking ID as JSON to the tracking service.
pub struct HttpTrackingFetcher {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TrackRequest<'a> {
    tracking_id: &'a str,
}

impl HttpTrackingFetcher {
    pub fn new(config: &ApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("shiptrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: config.endpoint(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TrackingFetcher for HttpTrackingFetcher {
    async fn fetch(&self, query: &TrackingQuery) -> Result<TrackingResult, TrackingError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TrackRequest {
                tracking_id: query.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackingError::Status(status));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}
