use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::Result,
    types::{AnalysisRequest, HealthReport, ProcessResponse},
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn health_url(&self) -> String {
        self.endpoint("health")
    }

    pub fn process_url(&self) -> String {
        self.endpoint("process")
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/{}", self.base_url.trim_end_matches('/'), name)
    }
}

/// The remote analysis service.
#[async_trait]
pub trait AnalysisBackend: Send + Sync + 'static {
    /// Sends one analysis request. `Err` means the exchange itself failed;
    /// a service-side failure comes back as `ProcessResponse::Failure`.
    async fn process(&self, request: &AnalysisRequest) -> Result<ProcessResponse>;

    async fn health(&self) -> Result<HealthReport>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn process(&self, request: &AnalysisRequest) -> Result<ProcessResponse> {
        let url = self.config.process_url();
        debug!(%url, video_url = %request.url, "POST analysis request");

        // The HTTP status is not consulted; the body alone decides the outcome.
        let body = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?
            .text()
            .await?;

        Ok(ProcessResponse::from_body(&body)?)
    }

    async fn health(&self) -> Result<HealthReport> {
        let report = self
            .client
            .get(self.config.health_url())
            .send()
            .await?
            .error_for_status()?
            .json::<HealthReport>()
            .await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_tolerate_trailing_slash() {
        let config = BackendConfig::new("http://localhost:8000/");
        assert_eq!(config.health_url(), "http://localhost:8000/api/health");
        assert_eq!(config.process_url(), "http://localhost:8000/api/process");
    }

    #[test]
    fn default_points_at_local_service() {
        assert_eq!(
            BackendConfig::default().process_url(),
            "http://127.0.0.1:8000/api/process"
        );
    }
}
