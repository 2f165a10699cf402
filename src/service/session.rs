//! Session Module
//!
//! Tracks whether the user is authenticated and drops every cached domain
//! when they log out or lose authentication.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::cache::CacheRegistry;
use crate::error::{Result, ServiceError};

// == Session ==
/// Authentication state of the gateway.
///
/// Reads and writes are only served while authenticated. Dropping out of
/// that state, by logout or by the brokerage refusing the token, clears
/// every cache domain.
#[derive(Debug)]
pub struct Session {
    caches: CacheRegistry,
    authenticated: AtomicBool,
}

impl Session {
    pub fn new(caches: CacheRegistry, authenticated: bool) -> Self {
        Self {
            caches,
            authenticated: AtomicBool::new(authenticated),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Fails with [`ServiceError::Unauthorized`] outside an active session.
    pub fn ensure_authenticated(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized(
                "Authentication required. Please log in.".to_string(),
            ))
        }
    }

    /// Starts a session. Caches are left as they are; they were cleared when
    /// the previous session ended.
    pub async fn login(&self) {
        self.set_authenticated(true).await;
        info!("Session started");
    }

    /// Records the authentication state. Going from authenticated to not
    /// authenticated invalidates every cache domain.
    pub async fn set_authenticated(&self, authenticated: bool) {
        let was = self.authenticated.swap(authenticated, Ordering::SeqCst);
        if was && !authenticated {
            info!("Authentication lost, clearing caches");
            self.caches.invalidate_all().await;
        }
    }

    /// Ends the session. Caches are cleared even when already logged out.
    pub async fn logout(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
        info!("User logged out");
        self.caches.invalidate_all().await;
    }
}
