//! Short-lived cache of identity roles, keyed by lowercased email

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use wd_shared::config::RoleCacheConfig;

use crate::domain::entities::identity::Role;
use crate::services::sweeper::Sweepable;

#[derive(Debug, Clone)]
struct CachedRole {
    role: Role,
    cached_at: Instant,
}

/// One entry in [`RoleCacheStats`]
#[derive(Debug, Clone, Serialize)]
pub struct RoleCacheEntry {
    pub email: String,
    pub role: Role,
    pub age_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleCacheStats {
    pub size: usize,
    pub ttl_secs: u64,
    pub entries: Vec<RoleCacheEntry>,
}

pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

/// Role lookups cached for `ttl`.
///
/// Expired entries are never returned. They are removed lazily on read and
/// by the periodic [`sweep`](RoleCache::sweep).
pub struct RoleCache {
    entries: RwLock<HashMap<String, CachedRole>>,
    ttl: Duration,
}

impl RoleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn from_config(config: &RoleCacheConfig) -> Self {
        Self::new(config.ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, email: &str) -> Option<Role> {
        let key = normalize_email(email);
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                None => return None,
                Some(cached) if cached.cached_at.elapsed() < self.ttl => return Some(cached.role),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&key)
            .is_some_and(|cached| cached.cached_at.elapsed() >= self.ttl)
        {
            entries.remove(&key);
        }
        None
    }

    pub async fn set(&self, email: &str, role: Role) {
        self.entries.write().await.insert(
            normalize_email(email),
            CachedRole {
                role,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for `email`. Returns whether one existed.
    pub async fn invalidate(&self, email: &str) -> bool {
        let removed = self.entries.write().await.remove(&normalize_email(email)).is_some();
        if removed {
            debug!(email, "Invalidated cached role");
        }
        removed
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Remove expired entries
    pub async fn sweep(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, cached| cached.cached_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub async fn stats(&self) -> RoleCacheStats {
        let entries = self.entries.read().await;
        let mut listed: Vec<RoleCacheEntry> = entries
            .iter()
            .map(|(email, cached)| RoleCacheEntry {
                email: email.clone(),
                role: cached.role,
                age_secs: cached.cached_at.elapsed().as_secs(),
            })
            .collect();
        listed.sort_by(|a, b| a.email.cmp(&b.email));

        RoleCacheStats {
            size: listed.len(),
            ttl_secs: self.ttl.as_secs(),
            entries: listed,
        }
    }
}

#[async_trait]
impl Sweepable for RoleCache {
    fn name(&self) -> &'static str {
        "role_cache"
    }

    async fn sweep(&self) -> usize {
        RoleCache::sweep(self).await
    }
}
