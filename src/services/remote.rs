//! Network-backed domain services.
//!
//! Thin endpoint bindings over the [`ApiClient`]; retry, caching, and
//! fallback live a layer up in the facade's resilient wrappers, so these
//! stay one-call-one-request.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiClient, ApiError};
use crate::models::{
    AlumniPatch, AlumniProfile, Donation, Event, ListQuery, NewDonation, Page,
};

use super::{AlumniService, AuthService, DonationsService, EventsService};

pub struct RemoteAlumniService {
    api: Arc<ApiClient>,
}

impl RemoteAlumniService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AlumniService for RemoteAlumniService {
    async fn list(&self, query: &ListQuery) -> Result<Page<AlumniProfile>, ApiError> {
        self.api.get("/alumni", &query.to_params()).await
    }

    async fn get(&self, id: &str) -> Result<AlumniProfile, ApiError> {
        self.api.get(&format!("/alumni/{}", id), &[]).await
    }

    async fn update(&self, id: &str, patch: &AlumniPatch) -> Result<AlumniProfile, ApiError> {
        let body = serde_json::to_value(patch).map_err(|e| {
            ApiError::new(
                format!("Failed to encode profile update: {}", e),
                crate::api::codes::REQUEST_FAILED,
                0,
            )
        })?;
        self.api.patch(&format!("/alumni/{}", id), &body).await
    }
}

pub struct RemoteEventsService {
    api: Arc<ApiClient>,
}

impl RemoteEventsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl EventsService for RemoteEventsService {
    async fn list(&self, query: &ListQuery) -> Result<Page<Event>, ApiError> {
        self.api.get("/events", &query.to_params()).await
    }

    async fn get(&self, id: &str) -> Result<Event, ApiError> {
        self.api.get(&format!("/events/{}", id), &[]).await
    }

    async fn rsvp(&self, id: &str, attending: bool) -> Result<(), ApiError> {
        let body = serde_json::json!({ "attending": attending });
        let _: Value = self
            .api
            .post(&format!("/events/{}/rsvp", id), &body)
            .await?;
        Ok(())
    }
}

pub struct RemoteDonationsService {
    api: Arc<ApiClient>,
}

impl RemoteDonationsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DonationsService for RemoteDonationsService {
    async fn list(&self, query: &ListQuery) -> Result<Page<Donation>, ApiError> {
        self.api.get("/donations", &query.to_params()).await
    }

    async fn create(&self, donation: &NewDonation) -> Result<Donation, ApiError> {
        let body = serde_json::to_value(donation).map_err(|e| {
            ApiError::new(
                format!("Failed to encode donation: {}", e),
                crate::api::codes::REQUEST_FAILED,
                0,
            )
        })?;
        self.api.post("/donations", &body).await
    }
}

pub struct RemoteAuthService {
    api: Arc<ApiClient>,
}

impl RemoteAuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthService for RemoteAuthService {
    async fn current_user(&self) -> Result<AlumniProfile, ApiError> {
        self.api.get("/auth/me", &[]).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let _: Value = self
            .api
            .post("/auth/logout", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}
