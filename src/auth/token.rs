use std::path::PathBuf;

use keyring::Entry;
use tracing::debug;

use crate::config::ClientConfig;

use super::SessionStore;

/// Keyring service under which the identity provider's session token is
/// cached by the login flow (which lives outside this crate).
const KEYRING_SERVICE: &str = "alumnet";
const KEYRING_USER: &str = "idp-session";

/// Which header the token travels in. Server-side auth differentiates on
/// header name, so the distinction must survive all the way to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `Authorization: Bearer {token}` - standard identity-provider mode.
    Bearer,
    /// `x-dev-token: {token}` - local-identity mode.
    Dev,
}

#[derive(Debug, Clone)]
pub struct AuthToken {
    pub value: String,
    pub kind: TokenKind,
}

/// Where the credential comes from.
enum TokenSource {
    /// Dev session blob on disk (local-identity mode).
    Local,
    /// Identity-provider session cached in the OS keychain.
    Keyring,
    /// Fixed token, bypassing storage entirely.
    #[cfg(test)]
    Fixed(AuthToken),
}

/// Produces a bearer credential for outgoing requests.
///
/// Never fails: every acquisition problem degrades to "no token" and the
/// request proceeds unauthenticated, letting the server answer with a
/// normal 401 through the standard error path.
pub struct TokenProvider {
    source: TokenSource,
    data_dir: Option<PathBuf>,
}

impl TokenProvider {
    pub fn from_config(config: &ClientConfig) -> Self {
        let source = if config.is_local_identity() {
            TokenSource::Local
        } else {
            TokenSource::Keyring
        };
        Self {
            source,
            data_dir: config.data_dir(),
        }
    }

    #[cfg(test)]
    pub fn local(data_dir: Option<PathBuf>) -> Self {
        Self {
            source: TokenSource::Local,
            data_dir,
        }
    }

    #[cfg(test)]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Fixed(AuthToken {
                value: token.into(),
                kind: TokenKind::Bearer,
            }),
            data_dir: None,
        }
    }

    pub fn is_local_identity(&self) -> bool {
        matches!(self.source, TokenSource::Local)
    }

    /// Get the current auth token, or `None` if unavailable.
    pub fn get_auth_token(&self) -> Option<AuthToken> {
        #[cfg(test)]
        if let TokenSource::Fixed(ref token) = self.source {
            return Some(token.clone());
        }

        // No resolvable local state at all: unprovisioned environment.
        let Some(ref data_dir) = self.data_dir else {
            return None;
        };

        match self.source {
            TokenSource::Local => {
                let store = SessionStore::new(data_dir);
                match store.load_raw() {
                    Ok(Some(blob)) => Some(AuthToken {
                        value: blob,
                        kind: TokenKind::Dev,
                    }),
                    Ok(None) => None,
                    Err(e) => {
                        debug!(error = %e, "unreadable session blob, proceeding without token");
                        None
                    }
                }
            }
            TokenSource::Keyring => {
                match Entry::new(KEYRING_SERVICE, KEYRING_USER).and_then(|e| e.get_password()) {
                    Ok(token) => Some(AuthToken {
                        value: token,
                        kind: TokenKind::Bearer,
                    }),
                    Err(e) => {
                        debug!(error = %e, "no identity-provider session available");
                        None
                    }
                }
            }
            #[cfg(test)]
            TokenSource::Fixed(_) => None, // handled above
        }
    }
}
