//! In-memory grant store.
//!
//! Keyed by user name behind an async `RwLock`; persistence lives outside
//! this service. Mutations take the write lock for their whole critical
//! section so the compare-and-swap in [`GrantStore::replace`] is atomic.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use relaypanel_grants::ports;
use relaypanel_grants::Grant;

/// Store-level failure, mapped to a result code by the handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("user [{0}] exists")]
    Exists(String),
    #[error("user [{0}] not found")]
    NotFound(String),
    #[error("user [{0}] was modified concurrently")]
    Conflict(String),
}

#[derive(Clone, Default)]
pub struct GrantStore {
    grants: Arc<RwLock<HashMap<String, Grant>>>,
}

impl GrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All grants, sorted by user for stable listings.
    pub async fn list(&self) -> Vec<Grant> {
        let grants = self.grants.read().await;
        let mut all: Vec<Grant> = grants.values().cloned().collect();
        all.sort_by(|a, b| a.user.cmp(&b.user));
        all
    }

    pub async fn get(&self, user: &str) -> Option<Grant> {
        self.grants.read().await.get(user).cloned()
    }

    pub async fn contains(&self, user: &str) -> bool {
        self.grants.read().await.contains_key(user)
    }

    /// Insert a new grant; the user must not exist yet.
    pub async fn insert(&self, grant: Grant) -> Result<(), StoreError> {
        let mut grants = self.grants.write().await;
        if grants.contains_key(&grant.user) {
            return Err(StoreError::Exists(grant.user));
        }
        grants.insert(grant.user.clone(), grant);
        Ok(())
    }

    /// Replace a grant if the stored record still matches the `before`
    /// snapshot; a mismatch means someone else changed it in between.
    pub async fn replace(&self, before: &Grant, after: Grant) -> Result<(), StoreError> {
        let mut grants = self.grants.write().await;
        let stored = grants
            .get(&before.user)
            .ok_or_else(|| StoreError::NotFound(before.user.clone()))?;
        if stored != before {
            return Err(StoreError::Conflict(before.user.clone()));
        }
        grants.insert(after.user.clone(), after);
        Ok(())
    }

    /// Remove every listed user. Fails without applying anything if one of
    /// them is missing.
    pub async fn remove(&self, users: &[String]) -> Result<(), StoreError> {
        let mut grants = self.grants.write().await;
        for user in users {
            if !grants.contains_key(user) {
                return Err(StoreError::NotFound(user.clone()));
            }
        }
        for user in users {
            grants.remove(user);
        }
        Ok(())
    }

    /// Flip the enable flag on every listed user. Fails without applying
    /// anything if one of them is missing.
    pub async fn set_enabled(&self, users: &[String], enable: bool) -> Result<(), StoreError> {
        let mut grants = self.grants.write().await;
        for user in users {
            if !grants.contains_key(user) {
                return Err(StoreError::NotFound(user.clone()));
            }
        }
        for user in users {
            if let Some(grant) = grants.get_mut(user) {
                grant.enable = enable;
            }
        }
        Ok(())
    }

    /// High-water mark for one server, 0 if it has no granted ports.
    pub async fn max_port(&self, server: &str) -> u16 {
        let grants = self.grants.read().await;
        grants
            .values()
            .filter(|g| g.server == server)
            .map(|g| ports::max_port_in(&g.ports))
            .max()
            .unwrap_or(0)
    }

    /// High-water marks for every server that owns at least one grant.
    pub async fn max_ports(&self) -> HashMap<String, u16> {
        let grants = self.grants.read().await;
        ports::max_ports_by_server(grants.values())
    }
}
