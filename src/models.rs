use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============ Database Models ============

/// A submitted contact record, scored and qualified at ingestion.
///
/// Leads are written once and never mutated afterwards.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    /// Unique identifier for the lead.
    pub id: Uuid,
    /// Owning workspace, if one could be resolved.
    pub workspace_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
    /// Free-text region (NA, EMEA, APAC, LATAM, Unknown, or a country name).
    pub region: Option<String>,
    /// Free-text message from the contact or ingestion form.
    pub message: Option<String>,
    /// Where the lead came from (e.g. "api", "contact_form", or an external source name).
    pub source: Option<String>,
    /// Computed score in `[0, 1]`.
    pub ai_score: f64,
    /// Comma-joined list of matched scoring criteria.
    pub ai_reason: String,
    pub qualified: bool,
    pub booking_url: Option<String>,
    /// Status label ("Qualified" / "Unqualified").
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Values for a lead that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub workspace_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub region: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub ai_score: f64,
    pub ai_reason: String,
    pub qualified: bool,
    pub booking_url: Option<String>,
    pub status: String,
}

impl NewLead {
    /// Assigns a fresh identifier and creation time.
    pub fn into_lead(self) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            workspace_id: self.workspace_id,
            name: self.name,
            email: self.email,
            company: self.company,
            role: self.role,
            region: self.region,
            message: self.message,
            source: self.source,
            ai_score: self.ai_score,
            ai_reason: self.ai_reason,
            qualified: self.qualified,
            booking_url: self.booking_url,
            status: self.status,
            created_at: Utc::now(),
        }
    }
}

/// A tenant boundary owning leads, API keys and settings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Workspace {
    pub id: Uuid,
    /// Display name, e.g. "jane's Workspace".
    pub name: String,
    pub owner_email: String,
    /// Custom booking link; the configured default is used when absent.
    pub booking_url: Option<String>,
    /// Whether leads for this workspace go through company enrichment.
    pub enrichment_enabled: bool,
    /// The workspace's own key for the enrichment provider.
    #[serde(skip_serializing, default)]
    pub enrichment_api_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    pub fn settings(&self) -> WorkspaceSettings {
        WorkspaceSettings {
            booking_url: self.booking_url.clone(),
            enrichment_enabled: self.enrichment_enabled,
            enrichment_api_key: self.enrichment_api_key.clone(),
        }
    }
}

/// The tenant-editable part of a workspace, written as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceSettings {
    pub booking_url: Option<String>,
    pub enrichment_enabled: bool,
    pub enrichment_api_key: Option<String>,
}

/// Associates an authenticated user with a workspace.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceUser {
    pub workspace_id: Uuid,
    pub user_id: String,
    pub user_email: String,
    /// Role within the workspace ("admin").
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// A bearer credential scoped to one workspace.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ApiKey {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub key: String,
    pub created_at: DateTime<Utc>,
}

/// Everything created when a user signs up.
#[derive(Debug, Clone)]
pub struct Tenant {
    pub workspace: Workspace,
    pub admin: WorkspaceUser,
    pub api_key: ApiKey,
}

// ============ API Request Models ============

/// Lead payload accepted by `/leads`, `/ingest` and `/contact`.
///
/// `name` and `email` are optional here so that missing values produce a
/// 400 from validation rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeadSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub region: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingRequest {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

/// Partial settings update. Absent fields are left unchanged; an empty
/// string clears the booking URL or the enrichment key.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsRequest {
    #[serde(rename = "bookingUrl", alias = "booking_url")]
    pub booking_url: Option<String>,
    #[serde(rename = "enrichmentEnabled", alias = "enrichment_enabled")]
    pub enrichment_enabled: Option<bool>,
    #[serde(rename = "enrichmentApiKey", alias = "enrichment_api_key")]
    pub enrichment_api_key: Option<String>,
}

// ============ API Response Models ============

/// Response for `POST /leads`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSubmissionResponse {
    pub success: bool,
    pub qualified: bool,
    #[serde(rename = "bookingUrl")]
    pub booking_url: Option<String>,
    pub lead: Lead,
}

/// Response for `POST /ingest` and `POST /contact`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadReceivedResponse {
    pub success: bool,
    pub message: String,
    pub lead: Lead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingResponse {
    pub success: bool,
    pub workspace_id: Uuid,
    /// Only present when the workspace was created by this request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardMetrics {
    pub total_leads: usize,
    pub qualified_leads: usize,
    /// Percentage with one decimal place, or "0" when there are no leads.
    pub conversion_rate: String,
}

impl DashboardMetrics {
    pub fn from_leads(leads: &[Lead]) -> Self {
        let total_leads = leads.len();
        let qualified_leads = leads.iter().filter(|l| l.qualified).count();
        let conversion_rate = if total_leads > 0 {
            format!("{:.1}", qualified_leads as f64 / total_leads as f64 * 100.0)
        } else {
            "0".to_string()
        };

        Self {
            total_leads,
            qualified_leads,
            conversion_rate,
        }
    }
}

/// Response for `GET /dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub workspace_id: Option<Uuid>,
    pub leads: Vec<Lead>,
    pub metrics: DashboardMetrics,
    pub api_key: Option<String>,
    pub booking_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(qualified: bool) -> Lead {
        NewLead {
            workspace_id: None,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            company: None,
            role: None,
            region: None,
            message: None,
            source: None,
            ai_score: 0.0,
            ai_reason: String::new(),
            qualified,
            booking_url: None,
            status: "Unqualified".into(),
        }
        .into_lead()
    }

    #[test]
    fn metrics_for_empty_workspace() {
        let metrics = DashboardMetrics::from_leads(&[]);
        assert_eq!(metrics.total_leads, 0);
        assert_eq!(metrics.conversion_rate, "0");
    }

    #[test]
    fn metrics_round_to_one_decimal() {
        let leads = vec![lead(true), lead(false), lead(false)];
        let metrics = DashboardMetrics::from_leads(&leads);
        assert_eq!(metrics.qualified_leads, 1);
        assert_eq!(metrics.conversion_rate, "33.3");
    }

    #[test]
    fn submission_accepts_camel_case_user_id() {
        let submission: LeadSubmission =
            serde_json::from_str(r#"{"name":"A","email":"a@b.co","userId":"u-1"}"#).unwrap();
        assert_eq!(submission.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn enrichment_key_is_never_serialized() {
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: "w".into(),
            owner_email: "o@example.com".into(),
            booking_url: None,
            enrichment_enabled: true,
            enrichment_api_key: Some("secret".into()),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&workspace).unwrap();
        assert!(!json.contains("secret"));
    }
}
