use async_trait::async_trait;

use crate::domain::entities::identity::Identity;
use crate::errors::DomainError;

/// Read access to the identity directory
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Find an identity by subject id and email
    ///
    /// Both must match. An identity whose email changed since the credential
    /// was issued is not found.
    ///
    /// # Arguments
    /// * `subject_id` - The `sub` claim
    /// * `email` - The `email` claim
    ///
    /// # Returns
    /// * `Ok(Some(Identity))` - Identity found
    /// * `Ok(None)` - No identity with that id and email
    /// * `Err(DomainError)` - Lookup failed
    async fn find_identity(
        &self,
        subject_id: &str,
        email: &str,
    ) -> Result<Option<Identity>, DomainError>;
}
