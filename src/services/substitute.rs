//! In-memory substitute backends.
//!
//! Same-interface stand-ins used when the real backend is unset or
//! unhealthy. Data lives in seeded tables behind a mutex; state survives
//! for the process lifetime only.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::api::{codes, ApiError};
use crate::models::{
    AlumniPatch, AlumniProfile, Donation, Event, ListQuery, NewDonation, Page,
};

use super::{AlumniService, AuthService, DonationsService, EventsService};

/// Listing size when the caller does not specify one.
const DEFAULT_PAGE_LIMIT: usize = 20;

fn not_found(what: &str, id: &str) -> ApiError {
    ApiError::new(format!("{} {} not found", what, id), "NOT_FOUND", 404)
}

fn page_of<T: Clone>(items: &[T], query: &ListQuery) -> Page<T> {
    let limit = query.limit.map(|l| l as usize).unwrap_or(DEFAULT_PAGE_LIMIT);
    Page {
        items: items.iter().take(limit).cloned().collect(),
        next_cursor: None,
    }
}

pub struct MockAlumniService {
    profiles: Mutex<Vec<AlumniProfile>>,
}

impl MockAlumniService {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(seed_profiles()),
        }
    }
}

impl Default for MockAlumniService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlumniService for MockAlumniService {
    async fn list(&self, query: &ListQuery) -> Result<Page<AlumniProfile>, ApiError> {
        let profiles = self.profiles.lock().unwrap();
        let filtered: Vec<AlumniProfile> = match query.search.as_deref() {
            Some(term) => {
                let term = term.to_lowercase();
                profiles
                    .iter()
                    .filter(|p| p.full_name().to_lowercase().contains(&term))
                    .cloned()
                    .collect()
            }
            None => profiles.clone(),
        };
        Ok(page_of(&filtered, query))
    }

    async fn get(&self, id: &str) -> Result<AlumniProfile, ApiError> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found("alumni profile", id))
    }

    async fn update(&self, id: &str, patch: &AlumniPatch) -> Result<AlumniProfile, ApiError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("alumni profile", id))?;
        if let Some(ref email) = patch.email {
            profile.email = email.clone();
        }
        if let Some(class_year) = patch.class_year {
            profile.class_year = Some(class_year);
        }
        if let Some(ref role) = patch.current_role {
            profile.current_role = Some(role.clone());
        }
        Ok(profile.clone())
    }
}

pub struct MockEventsService {
    events: Mutex<Vec<Event>>,
    rsvps: Mutex<HashSet<String>>,
}

impl MockEventsService {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(seed_events()),
            rsvps: Mutex::new(HashSet::new()),
        }
    }

    pub fn has_rsvp(&self, event_id: &str) -> bool {
        self.rsvps.lock().unwrap().contains(event_id)
    }
}

impl Default for MockEventsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventsService for MockEventsService {
    async fn list(&self, query: &ListQuery) -> Result<Page<Event>, ApiError> {
        Ok(page_of(&self.events.lock().unwrap(), query))
    }

    async fn get(&self, id: &str) -> Result<Event, ApiError> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| not_found("event", id))
    }

    async fn rsvp(&self, id: &str, attending: bool) -> Result<(), ApiError> {
        if !self.events.lock().unwrap().iter().any(|e| e.id == id) {
            return Err(not_found("event", id));
        }
        let mut rsvps = self.rsvps.lock().unwrap();
        if attending {
            rsvps.insert(id.to_string());
        } else {
            rsvps.remove(id);
        }
        debug!(event_id = id, attending, "recorded mock RSVP");
        Ok(())
    }
}

pub struct MockDonationsService {
    donations: Mutex<Vec<Donation>>,
}

impl MockDonationsService {
    pub fn new() -> Self {
        Self {
            donations: Mutex::new(seed_donations()),
        }
    }
}

impl Default for MockDonationsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DonationsService for MockDonationsService {
    async fn list(&self, query: &ListQuery) -> Result<Page<Donation>, ApiError> {
        Ok(page_of(&self.donations.lock().unwrap(), query))
    }

    async fn create(&self, donation: &NewDonation) -> Result<Donation, ApiError> {
        let mut donations = self.donations.lock().unwrap();
        let created = Donation {
            id: format!("d_mock_{}", donations.len() + 1),
            donor_id: "a_1".to_string(),
            amount_cents: donation.amount_cents,
            campaign: donation.campaign.clone(),
            donated_at: Utc::now(),
        };
        donations.push(created.clone());
        Ok(created)
    }
}

/// Substitute-mode stand-in for the auth domain.
///
/// There is no mock identity backend; rather than hand back a
/// wrong-shaped object, every operation fails with an explicit error so
/// callers can detect the gap.
pub struct UnsupportedAuthService;

impl UnsupportedAuthService {
    fn unsupported(operation: &str) -> ApiError {
        ApiError::new(
            format!("auth.{} is not available in substitute mode", operation),
            codes::MOCK_UNSUPPORTED,
            0,
        )
    }
}

#[async_trait]
impl AuthService for UnsupportedAuthService {
    async fn current_user(&self) -> Result<AlumniProfile, ApiError> {
        Err(Self::unsupported("current_user"))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Err(Self::unsupported("logout"))
    }
}

// ===== Seed data =====

fn seed_profiles() -> Vec<AlumniProfile> {
    vec![
        AlumniProfile {
            id: "a_1".to_string(),
            first_name: "Maya".to_string(),
            last_name: "Chen".to_string(),
            email: "maya.chen@alumnet.example".to_string(),
            class_year: Some(2012),
            current_role: Some("Product Manager".to_string()),
        },
        AlumniProfile {
            id: "a_2".to_string(),
            first_name: "Jordan".to_string(),
            last_name: "Okafor".to_string(),
            email: "jordan.okafor@alumnet.example".to_string(),
            class_year: Some(2008),
            current_role: Some("Civil Engineer".to_string()),
        },
        AlumniProfile {
            id: "a_3".to_string(),
            first_name: "Sofia".to_string(),
            last_name: "Marques".to_string(),
            email: "sofia.marques@alumnet.example".to_string(),
            class_year: Some(2019),
            current_role: None,
        },
    ]
}

fn seed_events() -> Vec<Event> {
    let now = Utc::now();
    vec![
        Event {
            id: "e_1".to_string(),
            title: "Spring Reunion".to_string(),
            starts_at: now + Duration::days(30),
            location: Some("Main Quad".to_string()),
            description: Some("Annual all-classes reunion.".to_string()),
        },
        Event {
            id: "e_2".to_string(),
            title: "Networking Night".to_string(),
            starts_at: now + Duration::days(7),
            location: Some("Alumni Hall".to_string()),
            description: None,
        },
    ]
}

fn seed_donations() -> Vec<Donation> {
    let now = Utc::now();
    vec![
        Donation {
            id: "d_1".to_string(),
            donor_id: "a_2".to_string(),
            amount_cents: 25_000,
            campaign: Some("scholarship-fund".to_string()),
            donated_at: now - Duration::days(90),
        },
        Donation {
            id: "d_2".to_string(),
            donor_id: "a_1".to_string(),
            amount_cents: 5_000,
            campaign: None,
            donated_at: now - Duration::days(12),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_alumni_list_and_search() {
        let service = MockAlumniService::new();
        let all = service.list(&ListQuery::default()).await.unwrap();
        assert_eq!(all.items.len(), 3);

        let query = ListQuery {
            search: Some("chen".to_string()),
            ..Default::default()
        };
        let hits = service.list(&query).await.unwrap();
        assert_eq!(hits.items.len(), 1);
        assert_eq!(hits.items[0].id, "a_1");
    }

    #[tokio::test]
    async fn test_mock_alumni_update_applies_patch() {
        let service = MockAlumniService::new();
        let patch = AlumniPatch {
            current_role: Some("CTO".to_string()),
            ..Default::default()
        };
        let updated = service.update("a_3", &patch).await.unwrap();
        assert_eq!(updated.current_role.as_deref(), Some("CTO"));

        let missing = service.update("a_999", &patch).await;
        assert_eq!(missing.unwrap_err().status_code, 404);
    }

    #[tokio::test]
    async fn test_mock_events_rsvp_round_trip() {
        let service = MockEventsService::new();
        service.rsvp("e_1", true).await.unwrap();
        assert!(service.has_rsvp("e_1"));

        service.rsvp("e_1", false).await.unwrap();
        assert!(!service.has_rsvp("e_1"));

        let err = service.rsvp("e_404", true).await.unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_mock_donation_create_appends() {
        let service = MockDonationsService::new();
        let created = service
            .create(&NewDonation {
                amount_cents: 10_000,
                campaign: Some("library".to_string()),
            })
            .await
            .unwrap();
        assert!(created.id.starts_with("d_mock_"));

        let listed = service.list(&ListQuery::default()).await.unwrap();
        assert_eq!(listed.items.len(), 3);
    }

    #[tokio::test]
    async fn test_unsupported_auth_fails_explicitly() {
        let service = UnsupportedAuthService;
        let err = service.current_user().await.unwrap_err();
        assert_eq!(err.code, codes::MOCK_UNSUPPORTED);
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let service = MockAlumniService::new();
        let page = service.list(&ListQuery::limited(2)).await.unwrap();
        assert_eq!(page.items.len(), 2);
    }
}
