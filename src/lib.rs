//! Resilient data-access layer for the AlumNet alumni platform.
//!
//! One logical service surface, two backends: a live HTTP API and an
//! in-memory substitute with the same interface. The [`Services`] facade
//! decides per call which one answers, degrades automatically from real
//! to substitute on repeated failure, and layers token attachment,
//! typed errors, TTL response caching, and retry-with-backoff underneath.
//!
//! ```no_run
//! use alumnet_client::{ClientConfig, ListQuery, Services};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let services = Services::new(&ClientConfig::from_env())?;
//! services.initialize().await;
//!
//! let page = services.alumni().list(&ListQuery::limited(20)).await?;
//! for profile in page.items {
//!     println!("{}", profile.full_name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod facade;
pub mod mode;
pub mod models;
pub mod resilience;
pub mod services;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthToken, TokenKind, TokenProvider};
pub use cache::ResponseCache;
pub use config::ClientConfig;
pub use facade::Services;
pub use mode::ClientMode;
pub use models::{
    AlumniPatch, AlumniProfile, Donation, Event, ListQuery, NewDonation, Page,
};
pub use resilience::{ResilienceController, RetryPolicy};
