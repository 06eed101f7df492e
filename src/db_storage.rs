use crate::errors::{AppError, ResultExt};
use crate::models::{
    ApiKey, Lead, NewLead, Tenant, Workspace, WorkspaceSettings, WorkspaceUser,
};
use crate::store::{LeadStore, NewTenant, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed storage for leads and tenants
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgStore {
    async fn insert_lead(&self, lead: NewLead) -> StoreResult<Lead> {
        let lead = lead.into_lead();

        let stored = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                id, workspace_id, name, email, company, role, region, message, source,
                ai_score, ai_reason, qualified, booking_url, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(lead.id)
        .bind(lead.workspace_id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.company)
        .bind(&lead.role)
        .bind(&lead.region)
        .bind(&lead.message)
        .bind(&lead.source)
        .bind(lead.ai_score)
        .bind(&lead.ai_reason)
        .bind(lead.qualified)
        .bind(&lead.booking_url)
        .bind(&lead.status)
        .bind(lead.created_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("✓ Lead stored: {}", stored.id);
        Ok(stored)
    }

    async fn list_leads(&self, workspace_id: Uuid) -> StoreResult<Vec<Lead>> {
        let leads = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE workspace_id = $1 ORDER BY created_at DESC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    async fn create_tenant(&self, tenant: NewTenant) -> StoreResult<Tenant> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (id, name, owner_email, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&tenant.workspace_name)
        .bind(&tenant.owner_email)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to create workspace")?;

        let admin = sqlx::query_as::<_, WorkspaceUser>(
            r#"
            INSERT INTO workspace_users (workspace_id, user_id, user_email, role, created_at)
            VALUES ($1, $2, $3, 'admin', $4)
            RETURNING *
            "#,
        )
        .bind(workspace.id)
        .bind(&tenant.user_id)
        .bind(&tenant.owner_email)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to link workspace admin")?;

        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (id, workspace_id, key, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(workspace.id)
        .bind(&tenant.api_key)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to create API key")?;

        tx.commit().await?;

        tracing::info!(
            "✓ Tenant created: workspace {} for user {}",
            workspace.id,
            admin.user_id
        );

        Ok(Tenant {
            workspace,
            admin,
            api_key,
        })
    }

    async fn get_workspace(&self, workspace_id: Uuid) -> StoreResult<Option<Workspace>> {
        let workspace = sqlx::query_as::<_, Workspace>("SELECT * FROM workspaces WHERE id = $1")
            .bind(workspace_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(workspace)
    }

    async fn first_workspace(&self) -> StoreResult<Option<Workspace>> {
        let workspace = sqlx::query_as::<_, Workspace>(
            "SELECT * FROM workspaces ORDER BY created_at ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(workspace)
    }

    async fn update_settings(
        &self,
        workspace_id: Uuid,
        settings: WorkspaceSettings,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE workspaces
            SET booking_url = $1, enrichment_enabled = $2, enrichment_api_key = $3
            WHERE id = $4
            "#,
        )
        .bind(settings.booking_url)
        .bind(settings.enrichment_enabled)
        .bind(settings.enrichment_api_key)
        .bind(workspace_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Workspace {} not found",
                workspace_id
            )));
        }
        Ok(())
    }

    async fn workspace_for_user(&self, user_id: &str) -> StoreResult<Option<Uuid>> {
        let workspace_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT workspace_id FROM workspace_users
            WHERE user_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(workspace_id)
    }

    async fn workspace_for_user_email(&self, email: &str) -> StoreResult<Option<Uuid>> {
        let workspace_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT workspace_id FROM workspace_users
            WHERE LOWER(user_email) = LOWER($1)
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(workspace_id)
    }

    async fn workspace_for_api_key(&self, key: &str) -> StoreResult<Option<Uuid>> {
        let workspace_id =
            sqlx::query_scalar::<_, Uuid>("SELECT workspace_id FROM api_keys WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(workspace_id)
    }

    async fn api_key_for_workspace(&self, workspace_id: Uuid) -> StoreResult<Option<ApiKey>> {
        let api_key = sqlx::query_as::<_, ApiKey>(
            "SELECT * FROM api_keys WHERE workspace_id = $1 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(api_key)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
