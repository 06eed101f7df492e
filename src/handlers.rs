use crate::config::Config;
use crate::enrichment::EnrichmentProvider;
use crate::errors::{AppError, ResultExt};
use crate::ingestion::{EntryPoint, LeadIngestion};
use crate::mailer::Mailer;
use crate::models::*;
use crate::resolver::Credentials;
use crate::store::{LeadStore, NewTenant};
use crate::validation::clean;
use axum::{
    extract::{FromRequest, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rand::RngCore;
use serde_json::json;
use std::sync::Arc;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const SESSION_USER_HEADER: &str = "x-user-id";
pub const INGEST_SECRET_HEADER: &str = "x-flowmeet-secret";

const API_KEY_PREFIX: &str = "cp_live_";

/// JSON body extractor whose rejections are `AppError::BadRequest`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Lead and tenant persistence.
    pub store: Arc<dyn LeadStore>,
    /// Outbound email.
    pub mailer: Arc<dyn Mailer>,
    /// Company enrichment provider, when one is configured.
    pub enrichment: Option<Arc<dyn EnrichmentProvider>>,
}

/// Health check endpoint.
///
/// Reports the store backend and answers 503 when it is unreachable.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.backend_name();
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": "flowmeet-api",
                "version": env!("CARGO_PKG_VERSION"),
                "store": store
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": "flowmeet-api",
                    "version": env!("CARGO_PKG_VERSION"),
                    "store": store
                })),
            )
                .into_response()
        }
    }
}

/// POST /leads
///
/// Authenticated by a workspace API key (`x-api-key`) or the dashboard
/// session. Without either, the lead lands in the admin or first workspace.
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(mut submission): ApiJson<LeadSubmission>,
) -> Result<Json<LeadSubmissionResponse>, AppError> {
    tracing::info!("POST /leads");

    let credentials = Credentials {
        api_key: presented_api_key(&headers),
        user_id: header_value(&headers, SESSION_USER_HEADER)
            .or_else(|| clean(submission.user_id.take())),
    };

    let outcome = LeadIngestion::from_state(&state)
        .ingest(EntryPoint::LeadsApi, &credentials, submission)
        .await?;

    Ok(Json(LeadSubmissionResponse {
        success: true,
        qualified: outcome.lead.qualified,
        booking_url: outcome.lead.booking_url.clone(),
        lead: outcome.lead,
    }))
}

/// POST /ingest
///
/// Webhook for external sites and CRMs, authenticated by the shared
/// `x-flowmeet-secret` header.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(submission): ApiJson<LeadSubmission>,
) -> Result<Json<LeadReceivedResponse>, AppError> {
    tracing::info!("POST /ingest");

    validate_ingest_secret(&state.config, &headers)?;

    let outcome = LeadIngestion::from_state(&state)
        .ingest(EntryPoint::ExternalIngest, &Credentials::default(), submission)
        .await?;

    Ok(Json(LeadReceivedResponse {
        success: true,
        message: "Lead received".to_string(),
        lead: outcome.lead,
    }))
}

/// POST /contact
///
/// Public contact form. Never authenticated.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    ApiJson(submission): ApiJson<LeadSubmission>,
) -> Result<Json<LeadReceivedResponse>, AppError> {
    tracing::info!("POST /contact");

    let outcome = LeadIngestion::from_state(&state)
        .ingest(EntryPoint::ContactForm, &Credentials::default(), submission)
        .await?;

    Ok(Json(LeadReceivedResponse {
        success: true,
        message: "Thanks! We'll be in touch shortly.".to_string(),
        lead: outcome.lead,
    }))
}

/// POST /onboarding
///
/// Creates the caller's workspace, admin link and API key in one step. A user
/// who already owns a workspace gets its id back but never its key; the key
/// is only readable through the session-authenticated dashboard.
pub async fn onboarding(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<OnboardingRequest>,
) -> Result<Json<OnboardingResponse>, AppError> {
    let (Some(user_id), Some(email)) = (clean(request.user_id), clean(request.email)) else {
        return Err(AppError::BadRequest("Missing user info".to_string()));
    };

    tracing::info!("POST /onboarding - user: {}", user_id);

    if let Some(workspace_id) = state.store.workspace_for_user(&user_id).await? {
        tracing::info!("User {} already onboarded to {}", user_id, workspace_id);
        return Ok(Json(OnboardingResponse {
            success: true,
            workspace_id,
            api_key: None,
        }));
    }

    let tenant = state
        .store
        .create_tenant(NewTenant {
            workspace_name: workspace_name_for(&email),
            owner_email: email,
            user_id,
            api_key: generate_api_key(),
        })
        .await
        .context("Failed to create workspace")?;

    tracing::info!("✓ Workspace {} created", tenant.workspace.id);

    Ok(Json(OnboardingResponse {
        success: true,
        workspace_id: tenant.workspace.id,
        api_key: Some(tenant.api_key.key),
    }))
}

/// POST /settings
///
/// Updates the session user's booking URL and enrichment settings. Absent
/// fields are kept; an empty booking URL restores the default.
pub async fn settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<SettingsRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = require_session(&headers)?;

    let workspace = match state.store.workspace_for_user(&user_id).await? {
        Some(workspace_id) => state.store.get_workspace(workspace_id).await?,
        None => None,
    }
    .ok_or_else(|| AppError::NotFound("No workspace found".to_string()))?;

    let mut settings = workspace.settings();
    if let Some(raw) = request.booking_url {
        settings.booking_url = match clean(Some(raw)) {
            Some(url) => Some(validate_booking_url(&url)?),
            None => None,
        };
    }
    if let Some(key) = request.enrichment_api_key {
        settings.enrichment_api_key = clean(Some(key));
    }
    if let Some(enabled) = request.enrichment_enabled {
        settings.enrichment_enabled = enabled;
    }
    if settings.enrichment_enabled && settings.enrichment_api_key.is_none() {
        return Err(AppError::BadRequest(
            "Enrichment requires an API key".to_string(),
        ));
    }

    state
        .store
        .update_settings(workspace.id, settings)
        .await
        .context("Failed to update settings")?;

    tracing::info!("✓ Settings updated for workspace {}", workspace.id);

    Ok(Json(json!({ "success": true })))
}

/// GET /dashboard
///
/// Leads (newest first), conversion metrics and credentials for the session
/// user's workspace.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DashboardResponse>, AppError> {
    let user_id = require_session(&headers)?;

    let Some(workspace_id) = state.store.workspace_for_user(&user_id).await? else {
        tracing::debug!("User {} has no workspace yet", user_id);
        return Ok(Json(DashboardResponse {
            workspace_id: None,
            leads: Vec::new(),
            metrics: DashboardMetrics::from_leads(&[]),
            api_key: None,
            booking_url: None,
        }));
    };

    let workspace = state.store.get_workspace(workspace_id).await?;
    let leads = state.store.list_leads(workspace_id).await?;
    let api_key = state.store.api_key_for_workspace(workspace_id).await?;

    Ok(Json(DashboardResponse {
        workspace_id: Some(workspace_id),
        metrics: DashboardMetrics::from_leads(&leads),
        leads,
        api_key: api_key.map(|k| k.key),
        booking_url: workspace.and_then(|w| w.booking_url),
    }))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// An `x-api-key` header counts as presented even when blank or unreadable,
/// so it is rejected by key lookup rather than skipped.
fn presented_api_key(headers: &HeaderMap) -> Option<String> {
    headers.get(API_KEY_HEADER).map(|v| {
        v.to_str()
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    })
}

fn require_session(headers: &HeaderMap) -> Result<String, AppError> {
    header_value(headers, SESSION_USER_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing session".to_string()))
}

/// Validate the ingest secret from the `x-flowmeet-secret` header
fn validate_ingest_secret(config: &Config, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = config.ingest_secret.as_deref() else {
        tracing::error!("FLOWMEET_INGEST_SECRET is not configured; rejecting /ingest");
        return Err(AppError::Misconfigured(
            "FLOWMEET_INGEST_SECRET not set".to_string(),
        ));
    };

    let provided = header_value(headers, INGEST_SECRET_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing ingest secret".to_string()))?;

    if !constant_time_compare(&provided, expected) {
        tracing::warn!("Invalid ingest secret received");
        return Err(AppError::Unauthorized("Invalid ingest secret".to_string()));
    }

    Ok(())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

fn validate_booking_url(raw: &str) -> Result<String, AppError> {
    let parsed = url::Url::parse(raw)
        .map_err(|_| AppError::BadRequest("Invalid booking URL".to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(raw.to_string()),
        _ => Err(AppError::BadRequest(
            "Booking URL must be an http(s) link".to_string(),
        )),
    }
}

fn workspace_name_for(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    format!("{}'s Workspace", local)
}

fn generate_api_key() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
}
