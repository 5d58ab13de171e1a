//! The mode-switching facade.
//!
//! `Services` is the single surface the rest of the application talks to.
//! Every domain accessor hands back a trait object whose calls are routed,
//! per call, to either the network-backed implementation or the in-memory
//! substitute - and wrapped in the resilience controller, so a fallback
//! triggered mid-call re-routes the replay to the substitute immediately.
//!
//! The shared [`ClientMode`] is injected, not a module-level singleton;
//! tests instantiate isolated facades freely.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};
use url::form_urlencoded;

use crate::api::{ApiClient, ApiError};
use crate::auth::TokenProvider;
use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::mode::ClientMode;
use crate::models::{
    AlumniPatch, AlumniProfile, Donation, Event, ListQuery, NewDonation, Page,
};
use crate::resilience::{ResilienceController, RetryPolicy};
use crate::services::{
    AlumniService, AuthService, DonationsService, EventsService, MockAlumniService,
    MockDonationsService, MockEventsService, RemoteAlumniService, RemoteAuthService,
    RemoteDonationsService, RemoteEventsService, UnsupportedAuthService,
};

struct ServicesInner {
    mode: Arc<ClientMode>,
    controller: ResilienceController,
    api: Arc<ApiClient>,

    remote_alumni: RemoteAlumniService,
    mock_alumni: MockAlumniService,
    remote_events: RemoteEventsService,
    mock_events: MockEventsService,
    remote_donations: RemoteDonationsService,
    mock_donations: MockDonationsService,
    remote_auth: RemoteAuthService,
    unsupported_auth: UnsupportedAuthService,
}

impl ServicesInner {
    fn alumni_backend(&self) -> &dyn AlumniService {
        if self.mode.is_using_real_api() {
            &self.remote_alumni
        } else {
            &self.mock_alumni
        }
    }

    fn events_backend(&self) -> &dyn EventsService {
        if self.mode.is_using_real_api() {
            &self.remote_events
        } else {
            &self.mock_events
        }
    }

    fn donations_backend(&self) -> &dyn DonationsService {
        if self.mode.is_using_real_api() {
            &self.remote_donations
        } else {
            &self.mock_donations
        }
    }

    fn auth_backend(&self) -> &dyn AuthService {
        if self.mode.is_using_real_api() {
            &self.remote_auth
        } else {
            // No substitute identity backend exists; this stub fails
            // loudly instead of handing back a wrong-shaped service.
            &self.unsupported_auth
        }
    }
}

/// Facade over all domain services plus mode control and health checks.
#[derive(Clone)]
pub struct Services {
    inner: Arc<ServicesInner>,
}

impl Services {
    /// Build the facade from configuration. Mode starts from the
    /// configured intent and presumed availability; call [`initialize`]
    /// once at startup to verify with a live probe.
    ///
    /// [`initialize`]: Services::initialize
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let tokens = Arc::new(TokenProvider::from_config(config));
        let api = Arc::new(ApiClient::new(config, tokens)?);
        let mode = Arc::new(ClientMode::new(
            config.prefer_real_api,
            config.backend_available,
        ));
        let cache = Arc::new(ResponseCache::new());
        let controller = ResilienceController::new(cache, mode.clone());

        Ok(Self {
            inner: Arc::new(ServicesInner {
                mode,
                controller,
                remote_alumni: RemoteAlumniService::new(api.clone()),
                mock_alumni: MockAlumniService::new(),
                remote_events: RemoteEventsService::new(api.clone()),
                mock_events: MockEventsService::new(),
                remote_donations: RemoteDonationsService::new(api.clone()),
                mock_donations: MockDonationsService::new(),
                remote_auth: RemoteAuthService::new(api.clone()),
                unsupported_auth: UnsupportedAuthService,
                api,
            }),
        })
    }

    /// One-time startup hook: when configured for the real API, verify it
    /// is actually reachable and degrade to the substitute if not. Never
    /// fails - a dead backend is an expected condition, not an error.
    pub async fn initialize(&self) {
        if !self.inner.mode.use_real() {
            info!("starting in substitute mode by configuration");
            return;
        }
        let healthy = self.inner.api.probe_health().await;
        self.inner.mode.set_backend_available(healthy);
        if healthy {
            info!("backend healthy, using real API");
        } else {
            warn!("backend unreachable at startup, switching to substitute mode");
        }
    }

    /// Probe backend health. Trivially true when the real API is not in
    /// use (the substitute is always "available"); otherwise hits the
    /// health endpoint and records the observation.
    pub async fn check_backend_health(&self) -> bool {
        if !self.inner.mode.use_real() {
            return true;
        }
        let healthy = self.inner.api.probe_health().await;
        self.inner.mode.set_backend_available(healthy);
        healthy
    }

    /// Explicit operator override of the real-API intent. Does not probe.
    pub fn set_api_mode(&self, use_real: bool) {
        self.inner.mode.set_api_mode(use_real);
    }

    pub fn is_using_real_api(&self) -> bool {
        self.inner.mode.is_using_real_api()
    }

    pub fn is_using_mock_api(&self) -> bool {
        self.inner.mode.is_using_mock_api()
    }

    /// Response cache handle, for explicit invalidation after writes the
    /// backend performed out of band.
    pub fn cache(&self) -> &ResponseCache {
        self.inner.controller.cache()
    }

    // ===== Domain accessors =====

    pub fn alumni(&self) -> Arc<dyn AlumniService> {
        Arc::new(AlumniFacade {
            inner: self.inner.clone(),
        })
    }

    pub fn events(&self) -> Arc<dyn EventsService> {
        Arc::new(EventsFacade {
            inner: self.inner.clone(),
        })
    }

    pub fn donations(&self) -> Arc<dyn DonationsService> {
        Arc::new(DonationsFacade {
            inner: self.inner.clone(),
        })
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        Arc::new(AuthFacade {
            inner: self.inner.clone(),
        })
    }
}

/// Cache key for a listing call; distinct parameter sets must not share
/// an entry. Caller-supplied parts are percent-encoded so a `:` inside a
/// cursor or search term cannot collide with the field separators.
fn list_cache_key(domain: &str, query: &ListQuery) -> String {
    format!(
        "{}:list:{}:{}:{}",
        domain,
        query.limit.map(|l| l.to_string()).unwrap_or_default(),
        cache_key_part(query.cursor.as_deref().unwrap_or_default()),
        cache_key_part(query.search.as_deref().unwrap_or_default()),
    )
}

fn cache_key_part(part: &str) -> String {
    form_urlencoded::byte_serialize(part.as_bytes()).collect()
}

/// Writes get one attempt and no fallback: replaying a mutation against
/// the substitute would fake success for state the backend never saw.
fn mutation_policy() -> RetryPolicy {
    RetryPolicy::default().with_retries(0).no_fallback()
}

struct AlumniFacade {
    inner: Arc<ServicesInner>,
}

#[async_trait]
impl AlumniService for AlumniFacade {
    async fn list(&self, query: &ListQuery) -> Result<Page<AlumniProfile>, ApiError> {
        let policy = RetryPolicy::cached(list_cache_key("alumni", query));
        self.inner
            .controller
            .execute(&policy, || async move {
                self.inner.alumni_backend().list(query).await
            })
            .await
    }

    async fn get(&self, id: &str) -> Result<AlumniProfile, ApiError> {
        let policy = RetryPolicy::cached(format!("alumni:{}", id));
        self.inner
            .controller
            .execute(&policy, || async move {
                self.inner.alumni_backend().get(id).await
            })
            .await
    }

    async fn update(&self, id: &str, patch: &AlumniPatch) -> Result<AlumniProfile, ApiError> {
        let result = self
            .inner
            .controller
            .execute(&mutation_policy(), || async move {
                self.inner.alumni_backend().update(id, patch).await
            })
            .await?;
        // The cached copy is now stale.
        self.inner.controller.cache().delete(&format!("alumni:{}", id));
        Ok(result)
    }
}

struct EventsFacade {
    inner: Arc<ServicesInner>,
}

#[async_trait]
impl EventsService for EventsFacade {
    async fn list(&self, query: &ListQuery) -> Result<Page<Event>, ApiError> {
        let policy = RetryPolicy::cached(list_cache_key("events", query));
        self.inner
            .controller
            .execute(&policy, || async move {
                self.inner.events_backend().list(query).await
            })
            .await
    }

    async fn get(&self, id: &str) -> Result<Event, ApiError> {
        let policy = RetryPolicy::cached(format!("events:{}", id));
        self.inner
            .controller
            .execute(&policy, || async move {
                self.inner.events_backend().get(id).await
            })
            .await
    }

    async fn rsvp(&self, id: &str, attending: bool) -> Result<(), ApiError> {
        self.inner
            .controller
            .execute(&mutation_policy(), || async move {
                self.inner.events_backend().rsvp(id, attending).await
            })
            .await
    }
}

struct DonationsFacade {
    inner: Arc<ServicesInner>,
}

#[async_trait]
impl DonationsService for DonationsFacade {
    async fn list(&self, query: &ListQuery) -> Result<Page<Donation>, ApiError> {
        let policy = RetryPolicy::cached(list_cache_key("donations", query));
        self.inner
            .controller
            .execute(&policy, || async move {
                self.inner.donations_backend().list(query).await
            })
            .await
    }

    async fn create(&self, donation: &NewDonation) -> Result<Donation, ApiError> {
        self.inner
            .controller
            .execute(&mutation_policy(), || async move {
                self.inner.donations_backend().create(donation).await
            })
            .await
    }
}

struct AuthFacade {
    inner: Arc<ServicesInner>,
}

#[async_trait]
impl AuthService for AuthFacade {
    async fn current_user(&self) -> Result<AlumniProfile, ApiError> {
        // Identity answers must be live, never cached.
        let policy = RetryPolicy::default();
        self.inner
            .controller
            .execute(&policy, || async move {
                self.inner.auth_backend().current_user().await
            })
            .await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.inner
            .controller
            .execute(&mutation_policy(), || async move {
                self.inner.auth_backend().logout().await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::codes;

    fn substitute_services() -> Services {
        Services::new(&ClientConfig::default()).unwrap()
    }

    /// Config pointing the real API at a port that is known to be closed.
    async fn unreachable_config() -> ClientConfig {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        ClientConfig {
            api_base_url: format!("http://{}", addr),
            prefer_real_api: true,
            backend_available: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_substitute_mode_serves_seeded_data() {
        let services = substitute_services();
        assert!(services.is_using_mock_api());

        let page = services.alumni().list(&ListQuery::default()).await.unwrap();
        assert_eq!(page.items.len(), 3);

        let event = services.events().get("e_1").await.unwrap();
        assert_eq!(event.title, "Spring Reunion");
    }

    #[tokio::test]
    async fn test_health_check_trivially_true_in_substitute_mode() {
        let services = substitute_services();
        assert!(services.check_backend_health().await);
    }

    #[tokio::test]
    async fn test_health_check_records_unreachable_backend() {
        let config = unreachable_config().await;
        let services = Services::new(&config).unwrap();

        services.set_api_mode(true);
        assert!(!services.check_backend_health().await);
        // Derived mode needs both flags; the failed probe cleared one.
        assert!(!services.is_using_real_api());
    }

    #[tokio::test]
    async fn test_initialize_degrades_when_backend_is_down() {
        let config = unreachable_config().await;
        let services = Services::new(&config).unwrap();

        services.initialize().await;
        assert!(services.is_using_mock_api());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_real_calls_fall_back_to_substitute_data() {
        let config = unreachable_config().await;
        let services = Services::new(&config).unwrap();
        assert!(services.is_using_real_api());

        // Every network attempt is refused; after the retry budget the
        // controller degrades the mode and the replay hits the mock.
        let page = services.alumni().list(&ListQuery::default()).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(services.is_using_mock_api());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_unsupported_in_substitute_mode() {
        let services = substitute_services();
        let err = services.auth().current_user().await.unwrap_err();
        assert_eq!(err.code, codes::MOCK_UNSUPPORTED);
    }

    #[tokio::test]
    async fn test_listing_twice_serves_second_from_cache() {
        let services = substitute_services();
        let query = ListQuery::limited(2);

        let first = services.donations().list(&query).await.unwrap();
        // Mutate through the raw mock: a cached read must not see it.
        services
            .donations()
            .create(&NewDonation {
                amount_cents: 777,
                campaign: None,
            })
            .await
            .unwrap();

        let second = services.donations().list(&query).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_update_invalidates_profile_cache() {
        let services = substitute_services();

        let before = services.alumni().get("a_3").await.unwrap();
        assert!(before.current_role.is_none());

        services
            .alumni()
            .update(
                "a_3",
                &AlumniPatch {
                    current_role: Some("Archivist".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = services.alumni().get("a_3").await.unwrap();
        assert_eq!(after.current_role.as_deref(), Some("Archivist"));
    }

    #[test]
    fn test_list_cache_keys_distinguish_cursor_from_search() {
        let by_cursor = ListQuery {
            cursor: Some(":a".to_string()),
            ..Default::default()
        };
        let by_search = ListQuery {
            search: Some("a:".to_string()),
            ..Default::default()
        };
        assert_ne!(
            list_cache_key("alumni", &by_cursor),
            list_cache_key("alumni", &by_search)
        );
    }

    #[tokio::test]
    async fn test_operator_can_flip_modes_explicitly() {
        let services = substitute_services();
        assert!(services.is_using_mock_api());

        services.set_api_mode(true);
        // backend_available defaulted true, so intent alone flips it.
        assert!(services.is_using_real_api());

        services.set_api_mode(false);
        assert!(services.is_using_mock_api());
    }
}
