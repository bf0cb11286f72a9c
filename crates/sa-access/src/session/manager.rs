//! Session Manager
//!
//! Owns every live store context, keyed by identity id. All mutation goes
//! through here; handlers only ever receive snapshots.
//!
//! Each read refreshes the store list and the role for the selected store.
//! Lookups are bounded by the configured timeout. A lookup that fails or
//! times out leaves the affected part of the context as it was, so a context
//! that never resolved stays pending.
//!
//! Contexts that go unused for longer than the idle limit are dropped by a
//! periodic sweep; the next request simply rebuilds them.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::context::StoreContext;
use crate::auth::Identity;
use crate::directory::MembershipDirectory;
use crate::shared::error::{AccessError, Result};

struct SessionEntry {
    context: StoreContext,
    last_seen: Instant,
}

pub struct SessionManager {
    directory: Arc<dyn MembershipDirectory>,
    contexts: DashMap<String, SessionEntry>,
    lookup_timeout: Duration,
}

impl SessionManager {
    pub fn new(directory: Arc<dyn MembershipDirectory>, lookup_timeout: Duration) -> Self {
        Self {
            directory,
            contexts: DashMap::new(),
            lookup_timeout,
        }
    }

    pub fn directory(&self) -> &Arc<dyn MembershipDirectory> {
        &self.directory
    }

    /// Current context for the identity, created on first use
    pub async fn current(&self, identity: &Identity) -> StoreContext {
        self.ensure(identity);
        self.refresh_stores(identity).await;
        self.refresh_role(identity).await;
        self.snapshot(identity)
    }

    /// Manually select a store, or clear the selection with `None`
    pub async fn select_store(&self, identity: &Identity, store_id: Option<&str>) -> Result<StoreContext> {
        self.ensure(identity);
        self.refresh_stores(identity).await;

        {
            let mut entry = self.contexts
                .get_mut(&identity.id)
                .ok_or(AccessError::ContextPending)?;
            let ctx = &mut entry.context;
            if ctx.is_loading() {
                return Err(AccessError::ContextPending);
            }
            if !ctx.select_store(store_id) {
                return Err(AccessError::not_found("Store", store_id.unwrap_or_default()));
            }
        }
        info!(identity_id = %identity.id, store_id = ?store_id, "Store selected");

        self.refresh_role(identity).await;
        Ok(self.snapshot(identity))
    }

    /// Discard the identity's context. Returns whether one existed.
    pub fn sign_out(&self, identity_id: &str) -> bool {
        let removed = self.contexts.remove(identity_id).is_some();
        if removed {
            info!(identity_id, "Session context discarded");
        }
        removed
    }

    pub fn active_sessions(&self) -> usize {
        self.contexts.len()
    }

    /// Drop contexts not used within `max_idle`. Returns how many went.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut evicted = 0;
        self.contexts.retain(|_, entry| {
            let keep = entry.last_seen.elapsed() <= max_idle;
            if !keep {
                evicted += 1;
            }
            keep
        });
        if evicted > 0 {
            debug!(evicted, remaining = self.contexts.len(), "Evicted idle session contexts");
        }
        evicted
    }

    /// Run `evict_idle` every `every` until the manager is dropped
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration, max_idle: Duration) -> JoinHandle<()> {
        let manager: Weak<Self> = Arc::downgrade(self);
        info!(
            sweep_secs = every.as_secs(),
            idle_secs = max_idle.as_secs(),
            "Starting session sweeper"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let Some(sessions) = manager.upgrade() else {
                    break;
                };
                sessions.evict_idle(max_idle);
            }
        })
    }

    fn ensure(&self, identity: &Identity) {
        let mut entry = self.contexts
            .entry(identity.id.clone())
            .or_insert_with(|| {
                debug!(identity_id = %identity.id, "Creating session context");
                SessionEntry {
                    context: StoreContext::new(identity.clone()),
                    last_seen: Instant::now(),
                }
            });
        entry.last_seen = Instant::now();
    }

    fn snapshot(&self, identity: &Identity) -> StoreContext {
        self.contexts
            .get(&identity.id)
            .map(|entry| entry.context.clone())
            .unwrap_or_else(|| StoreContext::new(identity.clone()))
    }

    async fn refresh_stores(&self, identity: &Identity) {
        let lookup = self.directory.stores_for_identity(&identity.id);
        let stores = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(stores)) => stores,
            Ok(Err(e)) => {
                warn!(identity_id = %identity.id, error = %e, "Store lookup failed");
                return;
            }
            Err(_) => {
                warn!(
                    identity_id = %identity.id,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Store lookup timed out"
                );
                return;
            }
        };

        // Signed out while the lookup was in flight
        if let Some(mut entry) = self.contexts.get_mut(&identity.id) {
            if entry.context.apply_stores(stores) {
                debug!(
                    identity_id = %identity.id,
                    store_id = ?entry.context.selected_store_id(),
                    "Selected store changed"
                );
            }
        }
    }

    async fn refresh_role(&self, identity: &Identity) {
        let Some(store_id) = self.contexts
            .get(&identity.id)
            .and_then(|entry| entry.context.selected_store_id().map(str::to_string))
        else {
            return;
        };

        let lookup = self.directory.role_in_store(&identity.id, &store_id);
        let role = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(role)) => role,
            Ok(Err(e)) => {
                warn!(identity_id = %identity.id, store_id = %store_id, error = %e, "Role lookup failed");
                return;
            }
            Err(_) => {
                warn!(
                    identity_id = %identity.id,
                    store_id = %store_id,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Role lookup timed out"
                );
                return;
            }
        };

        if let Some(mut entry) = self.contexts.get_mut(&identity.id) {
            if !entry.context.apply_role(&store_id, role) {
                debug!(identity_id = %identity.id, store_id = %store_id, "Discarded role for deselected store");
            }
        }
    }
}
