//! Workspace resolution for inbound leads.
//!
//! Each entry point supplies an ordered chain of strategies; the first one
//! that yields an existing workspace wins. Only an explicit API key that does
//! not match is an error. Every other strategy degrades to the next one, and
//! an exhausted chain yields no workspace at all.

use crate::config::Config;
use crate::errors::AppError;
use crate::models::Workspace;
use crate::store::LeadStore;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    /// `x-api-key` header. A key that matches nothing rejects the request.
    ApiKey,
    /// Authenticated session user.
    SessionUser,
    /// `FOUNDER_WORKSPACE_ID` override.
    FounderWorkspace,
    /// Workspace of the user whose email equals `ADMIN_EMAIL`.
    AdminEmail,
    /// Oldest existing workspace.
    FirstAvailable,
}

impl fmt::Display for ResolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionStep::ApiKey => "api_key",
            ResolutionStep::SessionUser => "session_user",
            ResolutionStep::FounderWorkspace => "founder_workspace",
            ResolutionStep::AdminEmail => "admin_email",
            ResolutionStep::FirstAvailable => "first_available",
        };
        f.write_str(name)
    }
}

/// Caller identity extracted from the request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub workspace: Option<Workspace>,
    pub resolved_by: Option<ResolutionStep>,
}

impl Resolution {
    pub fn workspace_id(&self) -> Option<Uuid> {
        self.workspace.as_ref().map(|w| w.id)
    }
}

pub struct WorkspaceResolver<'a> {
    store: &'a dyn LeadStore,
    config: &'a Config,
}

impl<'a> WorkspaceResolver<'a> {
    pub fn new(store: &'a dyn LeadStore, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Walks `chain` in order and returns the first workspace found.
    ///
    /// Fails only when an API key is presented and does not resolve
    /// (`Unauthorized`) or the key lookup itself fails.
    pub async fn resolve(
        &self,
        chain: &[ResolutionStep],
        credentials: &Credentials,
    ) -> Result<Resolution, AppError> {
        for step in chain {
            let workspace = match step {
                ResolutionStep::ApiKey => match credentials.api_key.as_deref() {
                    Some(key) => Some(self.resolve_api_key(key).await?),
                    None => None,
                },
                _ => self.try_step(*step, credentials).await,
            };

            if let Some(workspace) = workspace {
                tracing::debug!("Workspace {} resolved via {}", workspace.id, step);
                return Ok(Resolution {
                    workspace: Some(workspace),
                    resolved_by: Some(*step),
                });
            }
        }

        tracing::warn!("No workspace resolved; lead will be stored without a tenant");
        Ok(Resolution {
            workspace: None,
            resolved_by: None,
        })
    }

    async fn resolve_api_key(&self, key: &str) -> Result<Workspace, AppError> {
        let workspace_id = self
            .store
            .workspace_for_api_key(key)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid API key".to_string()))?;

        self.store
            .get_workspace(workspace_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("API key has no workspace".to_string()))
    }

    /// Runs a non-authenticating step. Lookup failures are logged and treated
    /// as "not found" so the chain can continue.
    async fn try_step(&self, step: ResolutionStep, credentials: &Credentials) -> Option<Workspace> {
        let result = match step {
            ResolutionStep::ApiKey => return None,
            ResolutionStep::SessionUser => match credentials.user_id.as_deref() {
                Some(user_id) => self.workspace_via(self.store.workspace_for_user(user_id)).await,
                None => Ok(None),
            },
            ResolutionStep::FounderWorkspace => match self.config.founder_workspace_id {
                Some(id) => {
                    let found = self.store.get_workspace(id).await;
                    if let Ok(None) = found {
                        tracing::warn!("FOUNDER_WORKSPACE_ID {} does not exist", id);
                    }
                    found
                }
                None => Ok(None),
            },
            ResolutionStep::AdminEmail => match self.config.admin_email.as_deref() {
                Some(email) => {
                    self.workspace_via(self.store.workspace_for_user_email(email))
                        .await
                }
                None => Ok(None),
            },
            ResolutionStep::FirstAvailable => self.store.first_workspace().await,
        };

        match result {
            Ok(workspace) => workspace,
            Err(e) => {
                tracing::warn!("Workspace resolution step {} failed: {}", step, e);
                None
            }
        }
    }

    async fn workspace_via(
        &self,
        lookup: impl std::future::Future<Output = Result<Option<Uuid>, AppError>>,
    ) -> Result<Option<Workspace>, AppError> {
        match lookup.await? {
            Some(id) => self.store.get_workspace(id).await,
            None => Ok(None),
        }
    }
}
