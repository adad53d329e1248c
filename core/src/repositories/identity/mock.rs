//! In-memory identity directory for tests and local development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::identity::{Identity, Role};
use crate::errors::{DomainError, PersistenceError};

use super::r#trait::IdentityRepository;

/// Mock identity repository keyed by subject id
#[derive(Debug, Clone, Default)]
pub struct MockIdentityRepository {
    identities: Arc<RwLock<HashMap<String, Identity>>>,
    lookups: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl MockIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, identity: Identity) {
        self.identities
            .write()
            .await
            .insert(identity.id.clone(), identity);
    }

    pub async fn set_role(&self, subject_id: &str, role: Role) {
        if let Some(identity) = self.identities.write().await.get_mut(subject_id) {
            identity.role = role;
        }
    }

    pub async fn remove(&self, subject_id: &str) {
        self.identities.write().await.remove(subject_id);
    }

    /// Make lookups fail
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of `find_identity` calls so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityRepository for MockIdentityRepository {
    async fn find_identity(
        &self,
        subject_id: &str,
        email: &str,
    ) -> Result<Option<Identity>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable {
                message: "identity directory unreachable".to_string(),
            }
            .into());
        }

        let identities = self.identities.read().await;
        Ok(identities
            .get(subject_id)
            .filter(|identity| identity.email == email)
            .cloned())
    }
}
