//! Process-wide client mode state.
//!
//! Two flags combine into the effective routing decision: `use_real` is
//! operator/config intent, `backend_available` is the last observed health.
//! Only the facade and the resilience controller's fallback write here;
//! every other component reads through a shared `Arc<ClientMode>` so an
//! in-flight fallback is visible immediately to all callers.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

#[derive(Debug)]
pub struct ClientMode {
    use_real: AtomicBool,
    backend_available: AtomicBool,
}

impl ClientMode {
    pub fn new(use_real: bool, backend_available: bool) -> Self {
        Self {
            use_real: AtomicBool::new(use_real),
            backend_available: AtomicBool::new(backend_available),
        }
    }

    /// Effective mode: real API only when intended *and* observed healthy.
    pub fn is_using_real_api(&self) -> bool {
        self.use_real.load(Ordering::SeqCst) && self.backend_available.load(Ordering::SeqCst)
    }

    pub fn is_using_mock_api(&self) -> bool {
        !self.is_using_real_api()
    }

    /// Operator intent flag, independent of observed health.
    pub fn use_real(&self) -> bool {
        self.use_real.load(Ordering::SeqCst)
    }

    /// Explicit operator override. Does not re-probe health.
    pub fn set_api_mode(&self, use_real: bool) {
        self.use_real.store(use_real, Ordering::SeqCst);
        info!(use_real, "API mode set");
    }

    /// Record a health observation from a probe.
    pub fn set_backend_available(&self, available: bool) {
        self.backend_available.store(available, Ordering::SeqCst);
    }

    /// One-directional degrade used by the fallback escalation.
    /// Recovery to real mode requires an explicit operator action or a
    /// fresh health check the caller chooses to act on.
    pub fn degrade_to_substitute(&self) {
        self.backend_available.store(false, Ordering::SeqCst);
        info!("degraded to substitute backend");
    }
}

impl Default for ClientMode {
    fn default() -> Self {
        Self::new(false, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_mode_requires_both_flags() {
        let mode = ClientMode::new(true, true);
        assert!(mode.is_using_real_api());

        mode.set_backend_available(false);
        assert!(!mode.is_using_real_api());
        assert!(mode.use_real()); // intent survives the health flip

        mode.set_backend_available(true);
        mode.set_api_mode(false);
        assert!(!mode.is_using_real_api());
        assert!(mode.is_using_mock_api());
    }

    #[test]
    fn test_degrade_is_one_directional() {
        let mode = ClientMode::new(true, true);
        mode.degrade_to_substitute();
        assert!(!mode.is_using_real_api());

        // Nothing flips it back implicitly; only an explicit observation.
        assert!(!mode.is_using_real_api());
        mode.set_backend_available(true);
        assert!(mode.is_using_real_api());
    }
}
