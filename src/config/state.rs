// Application state module
// Process-wide state shared by the accept loop and every connection

use std::sync::atomic::{AtomicUsize, Ordering};

use super::site::SiteConfig;
use super::types::Config;
use crate::error::ServerError;

/// Application state
///
/// Everything here is either immutable after startup or atomic, so request
/// handlers read it without locking.
pub struct AppState {
    pub config: Config,
    pub site: SiteConfig,
    active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ServerError> {
        let site = SiteConfig::from_assets(&config.assets)?;
        Ok(Self::with_site(config, site))
    }

    pub const fn with_site(config: Config, site: SiteConfig) -> Self {
        Self {
            config,
            site,
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Record a new connection, returning the count before it was added
    pub fn connection_opened(&self) -> usize {
        self.active_connections.fetch_add(1, Ordering::SeqCst)
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
