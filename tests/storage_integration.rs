use std::env;
use uuid::Uuid;

use flowmeet_api::db::Database;
use flowmeet_api::db_storage::PgStore;
use flowmeet_api::models::{NewLead, WorkspaceSettings};
use flowmeet_api::store::{LeadStore, NewTenant};

/// Integration smoke test for the Postgres store.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn tenant_and_lead_round_trip_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url).await?;
    db.migrate().await?;
    let store = PgStore::new(db.pool.clone());

    // Unique identifiers so repeated runs do not collide.
    let suffix = Uuid::new_v4().simple().to_string();
    let user_id = format!("smoke-{}", suffix);
    let api_key = format!("cp_live_smoke{}", suffix);

    let tenant = store
        .create_tenant(NewTenant {
            workspace_name: "smoke's Workspace".to_string(),
            owner_email: format!("smoke-{}@example.com", suffix),
            user_id: user_id.clone(),
            api_key: api_key.clone(),
        })
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let workspace_id = tenant.workspace.id;
    assert_eq!(
        store.workspace_for_api_key(&api_key).await.map_err(|e| anyhow::anyhow!(e.to_string()))?,
        Some(workspace_id)
    );
    assert_eq!(
        store.workspace_for_user(&user_id).await.map_err(|e| anyhow::anyhow!(e.to_string()))?,
        Some(workspace_id)
    );

    store
        .update_settings(
            workspace_id,
            WorkspaceSettings {
                booking_url: Some("https://cal.com/smoke".to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let lead = store
        .insert_lead(NewLead {
            workspace_id: Some(workspace_id),
            name: "Smoke Test".to_string(),
            email: "lead@example.com".to_string(),
            company: Some("Acme".to_string()),
            role: Some("Founder".to_string()),
            region: Some("US".to_string()),
            message: None,
            source: Some("api".to_string()),
            ai_score: 0.9,
            ai_reason: "Decision-making role, Company provided, High-conversion region".to_string(),
            qualified: true,
            booking_url: Some("https://cal.com/smoke".to_string()),
            status: "Qualified".to_string(),
        })
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let leads = store
        .list_leads(workspace_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(leads.first().map(|l| l.id), Some(lead.id));
    assert_eq!(leads[0].ai_score, 0.9);

    Ok(())
}
