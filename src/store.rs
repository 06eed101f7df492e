//! Persistence seam for leads, workspaces, workspace users and API keys.
//!
//! Handlers only ever talk to `dyn LeadStore`; production uses
//! [`crate::db_storage::PgStore`], tests use
//! [`crate::memory_store::InMemoryStore`].

use crate::errors::AppError;
use crate::models::{ApiKey, Lead, NewLead, Tenant, Workspace, WorkspaceSettings};
use async_trait::async_trait;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, AppError>;

/// Input for creating a workspace together with its admin and API key.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub workspace_name: String,
    pub owner_email: String,
    pub user_id: String,
    pub api_key: String,
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn insert_lead(&self, lead: NewLead) -> StoreResult<Lead>;
    /// Leads of one workspace, newest first.
    async fn list_leads(&self, workspace_id: Uuid) -> StoreResult<Vec<Lead>>;

    /// Creates the workspace, its admin link and its API key as one unit.
    async fn create_tenant(&self, tenant: NewTenant) -> StoreResult<Tenant>;
    async fn get_workspace(&self, workspace_id: Uuid) -> StoreResult<Option<Workspace>>;
    /// The oldest workspace, if any exist.
    async fn first_workspace(&self) -> StoreResult<Option<Workspace>>;
    /// Replaces the workspace's booking link and enrichment settings.
    /// `NotFound` if the workspace is missing.
    async fn update_settings(
        &self,
        workspace_id: Uuid,
        settings: WorkspaceSettings,
    ) -> StoreResult<()>;

    /// Workspace of the user's earliest link.
    async fn workspace_for_user(&self, user_id: &str) -> StoreResult<Option<Uuid>>;
    /// Workspace of the earliest link whose user email matches (case-insensitive).
    async fn workspace_for_user_email(&self, email: &str) -> StoreResult<Option<Uuid>>;

    async fn workspace_for_api_key(&self, key: &str) -> StoreResult<Option<Uuid>>;
    async fn api_key_for_workspace(&self, workspace_id: Uuid) -> StoreResult<Option<ApiKey>>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
