use crate::circuit_breaker::{create_mail_circuit_breaker, ServiceBreaker};
use crate::config::Config;
use crate::errors::AppError;
use async_trait::async_trait;
use failsafe::futures::CircuitBreaker;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// An outbound HTML email.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound email transport. Injected into handlers so tests can use fakes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

/// Builds the mailer for this process: Resend when a key is configured,
/// otherwise a mailer that only logs.
pub fn from_config(config: &Config) -> Result<std::sync::Arc<dyn Mailer>, AppError> {
    match config.resend_api_key.clone() {
        Some(api_key) => Ok(std::sync::Arc::new(ResendMailer::new(config, api_key)?)),
        None => Ok(std::sync::Arc::new(LogMailer)),
    }
}

/// Client for the Resend email API.
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    max_attempts: u32,
    retry_delay: Duration,
    send_budget: Duration,
    breaker: ServiceBreaker,
}

impl ResendMailer {
    /// Creates a new `ResendMailer`.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies base URL, sender, timeout and retry budget.
    /// * `api_key` - The Resend API key.
    pub fn new(config: &Config, api_key: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.mail_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create email client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.resend_base_url.trim_end_matches('/').to_string(),
            api_key,
            from: config.email_from.clone(),
            max_attempts: config.mail_max_attempts.max(1),
            retry_delay: Duration::from_millis(200),
            send_budget: Duration::from_secs(config.mail_send_budget_secs),
            breaker: create_mail_circuit_breaker(),
        })
    }

    /// Overrides the delay between attempts (grows linearly per attempt).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Overrides the wall-clock cap on one email, retries included.
    pub fn with_send_budget(mut self, budget: Duration) -> Self {
        self.send_budget = budget;
        self
    }

    async fn send_with_retries(&self, message: &EmailMessage) -> Result<(), AppError> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match self.breaker.call(self.send_once(message)).await {
                Ok(()) => {
                    tracing::info!("✓ Email '{}' sent (attempt {})", message.subject, attempt);
                    return Ok(());
                }
                Err(failsafe::Error::Rejected) => {
                    return Err(AppError::ExternalApiError(
                        "Email provider circuit open".to_string(),
                    ));
                }
                Err(failsafe::Error::Inner(e)) => {
                    tracing::warn!(
                        "Email attempt {}/{} failed: {}",
                        attempt,
                        self.max_attempts,
                        e
                    );
                    last_error = Some(e);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::ExternalApiError("Email not sent".to_string())))
    }

    async fn send_once(&self, message: &EmailMessage) -> Result<(), AppError> {
        let url = format!("{}/emails", self.base_url);

        let body = json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "html": message.html,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Email request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Email provider returned {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        tokio::time::timeout(self.send_budget, self.send_with_retries(message))
            .await
            .map_err(|_| {
                AppError::ExternalApiError(format!(
                    "Email '{}' not sent within {:?}",
                    message.subject, self.send_budget
                ))
            })?
    }
}

/// Mailer used when no provider key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        tracing::info!(
            "Email delivery disabled - skipping '{}' to {}",
            message.subject,
            message.to
        );
        Ok(())
    }
}
