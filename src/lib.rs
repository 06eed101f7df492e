//! FlowMeet lead capture API library
//!
//! Multi-tenant lead intake: leads arrive through the API, an external
//! webhook or the public contact form, are scored and qualified, stored
//! against a workspace, and trigger best-effort email notifications.
//!
//! # Modules
//!
//! - `api`: HTTP surface (router and handlers).
//! - `core`: Scoring, qualification, resolution and the ingestion pipeline.
//! - `data`: Persistence (store trait, Postgres and in-memory backends).
//! - `integrations`: Email and company-enrichment clients.
//! - `app`: Router and middleware stack.
//! - `circuit_breaker`: Circuit breaker for outbound email.
//! - `config`: Configuration management.
//! - `db`: Database connection pool and migrations.
//! - `db_storage`: Postgres `LeadStore`.
//! - `enrichment`: Company enrichment provider and score boost.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `ingestion`: Lead ingestion pipeline.
//! - `mailer`: Outbound email.
//! - `memory_store`: In-memory `LeadStore`.
//! - `models`: Core data models.
//! - `notifications`: Admin and lead notification emails.
//! - `qualification`: Qualification policy.
//! - `resolver`: Workspace resolution.
//! - `scoring`: Lead scoring.
//! - `store`: Storage trait.
//! - `validation`: Input validation helpers.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;

pub mod app;
pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod ingestion;
pub mod mailer;
pub mod memory_store;
pub mod models;
pub mod notifications;
pub mod qualification;
pub mod resolver;
pub mod scoring;
pub mod store;
pub mod validation;
