/// Lead ingestion pipeline shared by every entry point.
///
/// received → workspace resolved → scored → (enriched) → qualified →
/// persisted → notified. Only credential resolution, validation and the
/// insert can fail the request; enrichment and notifications are best-effort.
use crate::config::Config;
use crate::enrichment::{boost_score, EnrichmentProvider, EnrichmentRequest, HIGH_REVENUE_REASON};
use crate::errors::{AppError, ResultExt};
use crate::handlers::AppState;
use crate::mailer::Mailer;
use crate::models::{Lead, LeadSubmission, NewLead, Workspace};
use crate::notifications::{admin_recipient, NotificationDispatch, NotificationReport};
use crate::qualification::{booking_url, is_qualified, status_label};
use crate::resolver::{Credentials, ResolutionStep, WorkspaceResolver};
use crate::scoring::{score_lead, LeadScore, ScoreInput};
use crate::store::LeadStore;
use crate::validation::{clean, is_valid_email};

pub const INBOUND_CONTACT_ROLE: &str = "Inbound Contact";

/// The HTTP surface a lead arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// `POST /leads`: workspace API key or dashboard session.
    LeadsApi,
    /// `POST /ingest`: shared-secret webhook from external sites and CRMs.
    ExternalIngest,
    /// `POST /contact`: the public marketing-site form.
    ContactForm,
}

impl EntryPoint {
    pub fn resolution_chain(self) -> &'static [ResolutionStep] {
        match self {
            EntryPoint::LeadsApi => &[
                ResolutionStep::ApiKey,
                ResolutionStep::SessionUser,
                ResolutionStep::AdminEmail,
                ResolutionStep::FirstAvailable,
            ],
            EntryPoint::ExternalIngest => &[
                ResolutionStep::FounderWorkspace,
                ResolutionStep::AdminEmail,
                ResolutionStep::FirstAvailable,
            ],
            EntryPoint::ContactForm => {
                &[ResolutionStep::AdminEmail, ResolutionStep::FirstAvailable]
            }
        }
    }

    fn default_role(self) -> Option<&'static str> {
        match self {
            EntryPoint::LeadsApi => None,
            EntryPoint::ExternalIngest | EntryPoint::ContactForm => Some(INBOUND_CONTACT_ROLE),
        }
    }

    fn default_source(self) -> &'static str {
        match self {
            EntryPoint::LeadsApi => "api",
            EntryPoint::ExternalIngest => "external",
            EntryPoint::ContactForm => "contact_form",
        }
    }

    /// Subject of the admin summary, or `None` when this lead does not warrant one.
    fn admin_subject(self, lead: &Lead, submitted_source: Option<&str>) -> Option<String> {
        match self {
            EntryPoint::LeadsApi => lead.qualified.then(|| "New Qualified Lead".to_string()),
            EntryPoint::ExternalIngest => Some(format!(
                "New Lead from {}: {}",
                submitted_source.unwrap_or("External Source"),
                lead.name
            )),
            EntryPoint::ContactForm => Some(format!("New Contact Enquiry: {}", lead.name)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub lead: Lead,
    pub resolved_by: Option<ResolutionStep>,
    pub notifications: NotificationReport,
}

pub struct LeadIngestion<'a> {
    store: &'a dyn LeadStore,
    mailer: &'a dyn Mailer,
    enrichment: Option<&'a dyn EnrichmentProvider>,
    config: &'a Config,
}

impl<'a> LeadIngestion<'a> {
    pub fn new(
        store: &'a dyn LeadStore,
        mailer: &'a dyn Mailer,
        enrichment: Option<&'a dyn EnrichmentProvider>,
        config: &'a Config,
    ) -> Self {
        Self {
            store,
            mailer,
            enrichment,
            config,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(
            state.store.as_ref(),
            state.mailer.as_ref(),
            state.enrichment.as_deref(),
            &state.config,
        )
    }

    pub async fn ingest(
        &self,
        entry: EntryPoint,
        credentials: &Credentials,
        submission: LeadSubmission,
    ) -> Result<IngestionOutcome, AppError> {
        // Step 1: Resolve workspace (an invalid API key stops here)
        let resolution = WorkspaceResolver::new(self.store, self.config)
            .resolve(entry.resolution_chain(), credentials)
            .await?;
        let workspace = resolution.workspace.as_ref();

        // Step 2: Validate required fields
        let name = clean(submission.name);
        let email = clean(submission.email);
        let (name, email) = match (name, email) {
            (Some(name), Some(email)) => (name, email),
            _ => {
                return Err(AppError::BadRequest(
                    "Name and Email are required".to_string(),
                ))
            }
        };
        if !is_valid_email(&email) {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }

        let company = clean(submission.company);
        let role = clean(submission.role);
        let region = clean(submission.region);
        let submitted_source = clean(submission.source);

        // Step 3: Score
        let mut scored = score_lead(ScoreInput {
            role: role.as_deref(),
            company: company.as_deref(),
            region: region.as_deref(),
        });

        // Step 4: Optional enrichment
        if let Some(workspace) = workspace {
            self.enrich(workspace, company.as_deref(), &email, &mut scored)
                .await;
        }

        // Step 5: Qualify and pick a booking link
        let qualified = is_qualified(scored.score, role.as_deref(), company.as_deref());
        let booking_url = booking_url(
            qualified,
            workspace.and_then(|w| w.booking_url.as_deref()),
            &self.config.default_booking_url,
        );

        tracing::info!(
            "Lead scored {:.2} ({}) - qualified: {}",
            scored.score,
            if scored.reason.is_empty() {
                "no criteria"
            } else {
                scored.reason.as_str()
            },
            qualified
        );

        // Step 6: Persist
        let new_lead = NewLead {
            workspace_id: resolution.workspace_id(),
            name,
            email,
            company,
            role: role.or_else(|| entry.default_role().map(str::to_string)),
            region,
            message: clean(submission.message),
            source: Some(
                submitted_source
                    .clone()
                    .unwrap_or_else(|| entry.default_source().to_string()),
            ),
            ai_score: scored.score,
            ai_reason: scored.reason,
            qualified,
            booking_url,
            status: status_label(qualified).to_string(),
        };

        let lead = self
            .store
            .insert_lead(new_lead)
            .await
            .context("Failed to save lead")?;

        tracing::info!(
            "✓ Lead {} stored (workspace: {:?}, via {:?})",
            lead.id,
            lead.workspace_id,
            resolution.resolved_by
        );

        // Step 7: Notify (best-effort)
        let recipient = admin_recipient(workspace, self.config.admin_email.as_deref());
        let subject = entry.admin_subject(&lead, submitted_source.as_deref());
        let notifications = NotificationDispatch::new(self.mailer)
            .dispatch(&lead, subject.as_deref().map(|s| (recipient.as_str(), s)))
            .await;

        Ok(IngestionOutcome {
            lead,
            resolved_by: resolution.resolved_by,
            notifications,
        })
    }

    async fn enrich(
        &self,
        workspace: &Workspace,
        company: Option<&str>,
        email: &str,
        scored: &mut LeadScore,
    ) {
        if !workspace.enrichment_enabled {
            return;
        }
        let Some(provider) = self.enrichment else {
            tracing::debug!("Workspace {} wants enrichment but no provider is configured", workspace.id);
            return;
        };
        let Some(api_key) = workspace.enrichment_api_key.as_deref() else {
            tracing::debug!("Workspace {} has enrichment enabled without a key", workspace.id);
            return;
        };

        match provider
            .lookup_company(EnrichmentRequest { company, email }, api_key)
            .await
        {
            Ok(profile) if profile.is_high_revenue(self.config.high_revenue_threshold) => {
                let boosted = boost_score(scored.score);
                tracing::info!("Enrichment: high revenue company, score {:.2} -> {:.2}", scored.score, boosted);
                scored.score = boosted;
                if scored.reason.is_empty() {
                    scored.reason = HIGH_REVENUE_REASON.to_string();
                } else {
                    scored.reason = format!("{}, {}", scored.reason, HIGH_REVENUE_REASON);
                }
            }
            Ok(_) => tracing::debug!("Enrichment: no high revenue signal"),
            Err(e) => tracing::warn!("⚠️  Enrichment failed, keeping base score: {}", e),
        }
    }
}
