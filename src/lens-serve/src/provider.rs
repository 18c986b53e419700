use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProviderConfig;
use crate::labels::Label;
use crate::Timer;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("label request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("label endpoint returned status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    image: &'a str,
    max_labels: usize,
    min_confidence: f32,
}

#[derive(Deserialize)]
struct DetectResponse {
    labels: Vec<RemoteLabel>,
}

#[derive(Deserialize)]
struct RemoteLabel {
    name: String,
    confidence: f32,
}

/// Client for the remote label endpoint. Every request is bounded by the
/// configured timeout; callers treat any error as a cue to fall back to
/// mock detection.
pub struct HttpLabelProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    region: String,
}

impl HttpLabelProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(HttpLabelProvider {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            region: config.region.clone(),
        })
    }

    pub async fn detect(
        &self,
        image: &[u8],
        max_labels: usize,
        min_confidence: f32,
    ) -> Result<Vec<Label>, ProviderError> {
        let mut t = Timer::new_start("Remote label detection");

        let encoded = base64::encode(image);
        let request = DetectRequest {
            image: &encoded,
            max_labels,
            min_confidence,
        };

        let response = self
            .client
            .post(self.endpoint.as_str())
            .header("x-api-key", &self.api_key)
            .header("x-region", &self.region)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let parsed: DetectResponse = response.json().await?;

        t.stop();

        Ok(parsed
            .labels
            .into_iter()
            .map(|label| Label {
                name: label.name,
                confidence: label.confidence,
            })
            .collect())
    }
}
