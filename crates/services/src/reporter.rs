use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::distribution_service::DistributionService;
use crate::error::ReportError;

/// Destination for a finished session's accuracy.
#[async_trait]
pub trait ScoreReporter: Send + Sync {
    /// # Errors
    ///
    /// Returns `ReportError` if the score was rejected or could not be delivered.
    async fn report(&self, accuracy: f64) -> Result<(), ReportError>;
}

#[async_trait]
impl ScoreReporter for DistributionService {
    async fn report(&self, accuracy: f64) -> Result<(), ReportError> {
        DistributionService::report(self, accuracy).await?;
        Ok(())
    }
}

/// Posts scores to a remote server's `/api/submit-score`.
#[derive(Clone)]
pub struct HttpScoreReporter {
    client: Client,
    endpoint: String,
}

impl HttpScoreReporter {
    /// # Errors
    ///
    /// Returns `ReportError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ReportError> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}/api/submit-score", base_url.trim_end_matches('/'));
        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ScoreReporter for HttpScoreReporter {
    async fn report(&self, accuracy: f64) -> Result<(), ReportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SubmitScore { accuracy })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<SubmitScoreFailure>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| status.to_string());
        Err(ReportError::HttpStatus { status, message })
    }
}

#[derive(Debug, Serialize)]
struct SubmitScore {
    accuracy: f64,
}

#[derive(Debug, Deserialize)]
struct SubmitScoreFailure {
    error: Option<String>,
}
