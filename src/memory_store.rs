//! In-memory implementation of [`LeadStore`].
//!
//! Not durable; all state is lost on restart. Used by tests and for local
//! runs without Postgres. Every operation takes the single lock once, so
//! tenant creation is atomic with respect to other requests.

use crate::errors::AppError;
use crate::models::{
    ApiKey, Lead, NewLead, Tenant, Workspace, WorkspaceSettings, WorkspaceUser,
};
use crate::store::{LeadStore, NewTenant, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    // Vecs keep insertion order, which stands in for created_at ordering.
    workspaces: Vec<Workspace>,
    users: Vec<WorkspaceUser>,
    api_keys: Vec<ApiKey>,
    leads: Vec<Lead>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a workspace directly. Handy for seeding tests.
    pub async fn insert_workspace(&self, workspace: Workspace) {
        self.inner.write().await.workspaces.push(workspace);
    }

    /// Every lead across all workspaces, in insertion order.
    pub async fn all_leads(&self) -> Vec<Lead> {
        self.inner.read().await.leads.clone()
    }
}

#[async_trait]
impl LeadStore for InMemoryStore {
    async fn insert_lead(&self, lead: NewLead) -> StoreResult<Lead> {
        let mut inner = self.inner.write().await;
        if let Some(workspace_id) = lead.workspace_id {
            if !inner.workspaces.iter().any(|w| w.id == workspace_id) {
                return Err(AppError::InternalError(format!(
                    "lead references unknown workspace {}",
                    workspace_id
                )));
            }
        }
        let lead = lead.into_lead();
        inner.leads.push(lead.clone());
        Ok(lead)
    }

    async fn list_leads(&self, workspace_id: Uuid) -> StoreResult<Vec<Lead>> {
        let inner = self.inner.read().await;
        Ok(inner
            .leads
            .iter()
            .rev()
            .filter(|l| l.workspace_id == Some(workspace_id))
            .cloned()
            .collect())
    }

    async fn create_tenant(&self, tenant: NewTenant) -> StoreResult<Tenant> {
        let mut inner = self.inner.write().await;
        if inner.api_keys.iter().any(|k| k.key == tenant.api_key) {
            return Err(AppError::InternalError("duplicate api key".to_string()));
        }

        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: tenant.workspace_name,
            owner_email: tenant.owner_email.clone(),
            booking_url: None,
            enrichment_enabled: false,
            enrichment_api_key: None,
            created_at: now,
        };
        let admin = WorkspaceUser {
            workspace_id: workspace.id,
            user_id: tenant.user_id,
            user_email: tenant.owner_email,
            role: "admin".to_string(),
            created_at: now,
        };
        let api_key = ApiKey {
            id: Uuid::new_v4(),
            workspace_id: workspace.id,
            key: tenant.api_key,
            created_at: now,
        };

        inner.workspaces.push(workspace.clone());
        inner.users.push(admin.clone());
        inner.api_keys.push(api_key.clone());

        Ok(Tenant {
            workspace,
            admin,
            api_key,
        })
    }

    async fn get_workspace(&self, workspace_id: Uuid) -> StoreResult<Option<Workspace>> {
        let inner = self.inner.read().await;
        Ok(inner
            .workspaces
            .iter()
            .find(|w| w.id == workspace_id)
            .cloned())
    }

    async fn first_workspace(&self) -> StoreResult<Option<Workspace>> {
        Ok(self.inner.read().await.workspaces.first().cloned())
    }

    async fn update_settings(
        &self,
        workspace_id: Uuid,
        settings: WorkspaceSettings,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let workspace = inner
            .workspaces
            .iter_mut()
            .find(|w| w.id == workspace_id)
            .ok_or_else(|| AppError::NotFound(format!("Workspace {} not found", workspace_id)))?;
        workspace.booking_url = settings.booking_url;
        workspace.enrichment_enabled = settings.enrichment_enabled;
        workspace.enrichment_api_key = settings.enrichment_api_key;
        Ok(())
    }

    async fn workspace_for_user(&self, user_id: &str) -> StoreResult<Option<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .map(|u| u.workspace_id))
    }

    async fn workspace_for_user_email(&self, email: &str) -> StoreResult<Option<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.user_email.eq_ignore_ascii_case(email))
            .map(|u| u.workspace_id))
    }

    async fn workspace_for_api_key(&self, key: &str) -> StoreResult<Option<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner
            .api_keys
            .iter()
            .find(|k| k.key == key)
            .map(|k| k.workspace_id))
    }

    async fn api_key_for_workspace(&self, workspace_id: Uuid) -> StoreResult<Option<ApiKey>> {
        let inner = self.inner.read().await;
        Ok(inner
            .api_keys
            .iter()
            .find(|k| k.workspace_id == workspace_id)
            .cloned())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
