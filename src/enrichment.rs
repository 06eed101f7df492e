/// Company enrichment for workspaces that opt in.
///
/// The provider is looked up with the workspace's own API key. A company with
/// revenue at or above the configured threshold boosts the lead score by a
/// fixed amount, capped at 0.99. Enrichment is optional: any failure leaves
/// the score untouched.
use crate::config::Config;
use crate::errors::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Hundredths, like the scorer, so boosted scores stay exact.
const HIGH_REVENUE_BOOST_POINTS: f64 = 30.0;
const BOOSTED_CAP_POINTS: f64 = 99.0;

pub const BOOSTED_SCORE_CAP: f64 = 0.99;
pub const HIGH_REVENUE_REASON: &str = "High revenue company";

/// What we know about the lead's company before asking the provider.
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentRequest<'a> {
    pub company: Option<&'a str>,
    pub email: &'a str,
}

impl EnrichmentRequest<'_> {
    /// Domain part of the lead's email, lowercased.
    pub fn email_domain(&self) -> Option<String> {
        self.email
            .rsplit_once('@')
            .map(|(_, domain)| domain.trim().to_lowercase())
            .filter(|d| !d.is_empty())
    }
}

/// Company firmographics returned by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: Option<String>,
    /// Annual revenue in USD.
    #[serde(default)]
    pub annual_revenue: Option<f64>,
    #[serde(default)]
    pub employee_count: Option<u64>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl CompanyProfile {
    pub fn is_high_revenue(&self, threshold: f64) -> bool {
        self.annual_revenue.is_some_and(|r| r >= threshold)
    }
}

#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn lookup_company(
        &self,
        request: EnrichmentRequest<'_>,
        api_key: &str,
    ) -> Result<CompanyProfile, AppError>;
}

/// Applies the high-revenue boost. Never lowers a score.
pub fn boost_score(score: f64) -> f64 {
    let boosted = ((score * 100.0).round() + HIGH_REVENUE_BOOST_POINTS).min(BOOSTED_CAP_POINTS);
    (boosted / 100.0).max(score)
}

/// Client for a company-enrichment HTTP API.
///
/// `GET {base_url}/v1/companies?name=..&domain=..` with the workspace key as
/// a bearer token; 404 means the company is unknown.
#[derive(Clone)]
pub struct HttpEnrichmentProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEnrichmentProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create enrichment client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Provider for this process, if one is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        config
            .enrichment_base_url
            .as_deref()
            .map(|url| Self::new(url, Duration::from_secs(config.enrichment_timeout_secs)))
            .transpose()
    }
}

#[async_trait]
impl EnrichmentProvider for HttpEnrichmentProvider {
    async fn lookup_company(
        &self,
        request: EnrichmentRequest<'_>,
        api_key: &str,
    ) -> Result<CompanyProfile, AppError> {
        let mut params: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(company) = request.company.map(str::trim).filter(|c| !c.is_empty()) {
            params.push(("name", company.to_string()));
        }
        if let Some(domain) = request.email_domain() {
            params.push(("domain", domain));
        }
        if params.is_empty() {
            return Ok(CompanyProfile::default());
        }

        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/companies", self.base_url),
            params.iter().map(|(k, v)| (*k, v.as_str())),
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::debug!("Enrichment lookup: {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Enrichment request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(CompanyProfile::default());
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Enrichment provider returned {}: {}",
                status, error_text
            )));
        }

        let profile: CompanyProfile = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse enrichment response: {}", e))
        })?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_adds_fixed_amount() {
        assert_eq!(boost_score(0.3), 0.6);
        assert_eq!(boost_score(0.0), 0.3);
    }

    #[test]
    fn boost_is_capped() {
        assert_eq!(boost_score(0.9), BOOSTED_SCORE_CAP);
        assert_eq!(boost_score(0.7), BOOSTED_SCORE_CAP);
    }

    #[test]
    fn boost_never_lowers_a_perfect_score() {
        assert_eq!(boost_score(1.0), 1.0);
    }

    #[test]
    fn high_revenue_threshold_is_inclusive() {
        let profile = CompanyProfile {
            annual_revenue: Some(10_000_000.0),
            ..Default::default()
        };
        assert!(profile.is_high_revenue(10_000_000.0));
        assert!(!CompanyProfile::default().is_high_revenue(10_000_000.0));
    }

    #[test]
    fn email_domain_extraction() {
        let request = EnrichmentRequest {
            company: None,
            email: "Jane@Acme.IO",
        };
        assert_eq!(request.email_domain().as_deref(), Some("acme.io"));

        let request = EnrichmentRequest {
            company: None,
            email: "broken",
        };
        assert_eq!(request.email_domain(), None);
    }
}
