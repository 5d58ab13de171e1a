//! Domain service interfaces.
//!
//! Each domain is a trait with two implementations: a network-backed one
//! (`remote`) and an in-memory substitute (`substitute`). The facade hands
//! out the trait object, so callers never know which backend answered.

pub mod remote;
pub mod substitute;

use async_trait::async_trait;

use crate::api::ApiError;
use crate::models::{
    AlumniPatch, AlumniProfile, Donation, Event, ListQuery, NewDonation, Page,
};

#[async_trait]
pub trait AlumniService: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<AlumniProfile>, ApiError>;
    async fn get(&self, id: &str) -> Result<AlumniProfile, ApiError>;
    async fn update(&self, id: &str, patch: &AlumniPatch) -> Result<AlumniProfile, ApiError>;
}

#[async_trait]
pub trait EventsService: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<Event>, ApiError>;
    async fn get(&self, id: &str) -> Result<Event, ApiError>;
    async fn rsvp(&self, id: &str, attending: bool) -> Result<(), ApiError>;
}

#[async_trait]
pub trait DonationsService: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<Donation>, ApiError>;
    async fn create(&self, donation: &NewDonation) -> Result<Donation, ApiError>;
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn current_user(&self) -> Result<AlumniProfile, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
}

pub use remote::{RemoteAlumniService, RemoteAuthService, RemoteDonationsService, RemoteEventsService};
pub use substitute::{
    MockAlumniService, MockDonationsService, MockEventsService, UnsupportedAuthService,
};
