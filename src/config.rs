use serde::Deserialize;
use uuid::Uuid;

/// Fallback booking link used when a qualified lead's workspace has none.
pub const DEFAULT_BOOKING_URL: &str = "https://calendly.com/yourname/demo-call";
/// Last-resort recipient for admin notifications.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@flowmeet.com";
pub const DEFAULT_EMAIL_FROM: &str = "FlowMeet <noreply@flowmeet.com>";
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub run_migrations: bool,
    pub admin_email: Option<String>,
    pub founder_workspace_id: Option<Uuid>,
    pub ingest_secret: Option<String>,
    pub default_booking_url: String,
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
    pub email_from: String,
    pub mail_timeout_secs: u64,
    pub mail_max_attempts: u32,
    /// Wall-clock cap on one email including retries.
    pub mail_send_budget_secs: u64,
    pub enrichment_base_url: Option<String>,
    pub enrichment_timeout_secs: u64,
    pub high_revenue_threshold: f64,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DATABASE_URL or DB_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            run_migrations: std::env::var("RUN_MIGRATIONS")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
            admin_email: optional_var("ADMIN_EMAIL"),
            founder_workspace_id: optional_var("FOUNDER_WORKSPACE_ID")
                .map(|id| {
                    Uuid::parse_str(&id)
                        .map_err(|_| anyhow::anyhow!("FOUNDER_WORKSPACE_ID must be a UUID"))
                })
                .transpose()?,
            ingest_secret: optional_var("FLOWMEET_INGEST_SECRET"),
            default_booking_url: optional_var("DEFAULT_BOOKING_URL")
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("DEFAULT_BOOKING_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_BOOKING_URL.to_string()),
            resend_api_key: optional_var("RESEND_API_KEY"),
            resend_base_url: optional_var("RESEND_BASE_URL")
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("RESEND_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_RESEND_BASE_URL.to_string()),
            email_from: optional_var("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            mail_timeout_secs: parse_var("MAIL_TIMEOUT_SECS", 5)?,
            mail_max_attempts: parse_var("MAIL_MAX_ATTEMPTS", 3)?.max(1),
            mail_send_budget_secs: parse_var("MAIL_SEND_BUDGET_SECS", 8)?.max(1),
            enrichment_base_url: optional_var("ENRICHMENT_BASE_URL")
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("ENRICHMENT_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?,
            enrichment_timeout_secs: parse_var("ENRICHMENT_TIMEOUT_SECS", 5)?,
            high_revenue_threshold: parse_var("HIGH_REVENUE_THRESHOLD", 10_000_000.0)?,
            rate_limit_per_second: parse_var("RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", 20)?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            config.database_url.chars().take(20).collect::<String>()
        );
        tracing::debug!("Server Port: {}", config.port);
        if config.ingest_secret.is_none() {
            tracing::warn!("FLOWMEET_INGEST_SECRET not set - /ingest will reject every request");
        }
        if config.resend_api_key.is_none() {
            tracing::warn!("RESEND_API_KEY not set - email delivery disabled");
        }
        if let Some(ref founder) = config.founder_workspace_id {
            tracing::info!("Founder workspace configured: {}", founder);
        }
        if let Some(ref enrichment) = config.enrichment_base_url {
            tracing::info!("Enrichment provider configured: {}", enrichment);
        }

        Ok(config)
    }

    /// Configuration suitable for tests and local runs against the in-memory store.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/flowmeet_test".to_string(),
            port: 0,
            run_migrations: false,
            admin_email: None,
            founder_workspace_id: None,
            ingest_secret: None,
            default_booking_url: DEFAULT_BOOKING_URL.to_string(),
            resend_api_key: None,
            resend_base_url: DEFAULT_RESEND_BASE_URL.to_string(),
            email_from: DEFAULT_EMAIL_FROM.to_string(),
            mail_timeout_secs: 2,
            mail_max_attempts: 1,
            mail_send_budget_secs: 5,
            enrichment_base_url: None,
            enrichment_timeout_secs: 2,
            high_revenue_threshold: 10_000_000.0,
            rate_limit_per_second: 0,
            rate_limit_burst: 0,
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", name, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_uses_default_when_unset() {
        let value: u64 = parse_var("FLOWMEET_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parse_var_reads_and_validates() {
        std::env::set_var("FLOWMEET_TEST_MAIL_ATTEMPTS", " 5 ");
        let value: u32 = parse_var("FLOWMEET_TEST_MAIL_ATTEMPTS", 3).unwrap();
        assert_eq!(value, 5);

        std::env::set_var("FLOWMEET_TEST_BAD_NUMBER", "lots");
        let result: anyhow::Result<u32> = parse_var("FLOWMEET_TEST_BAD_NUMBER", 3);
        assert!(result.is_err());
    }

    #[test]
    fn blank_optional_vars_are_absent() {
        std::env::set_var("FLOWMEET_TEST_BLANK", "   ");
        assert_eq!(optional_var("FLOWMEET_TEST_BLANK"), None);
    }

    #[test]
    fn test_config_disables_outbound_and_rate_limits() {
        let config = Config::for_tests();
        assert!(config.ingest_secret.is_none());
        assert!(config.resend_api_key.is_none());
        assert_eq!(config.rate_limit_per_second, 0);
        assert_eq!(config.default_booking_url, DEFAULT_BOOKING_URL);
    }
}
