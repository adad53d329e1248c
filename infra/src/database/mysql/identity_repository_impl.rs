//! MySQL implementation of the IdentityRepository trait.
//!
//! Reads the `users` table owned by the sign-in service.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use tracing::warn;

use wd_core::domain::entities::identity::{Identity, Role};
use wd_core::errors::DomainError;
use wd_core::repositories::IdentityRepository;

use super::unavailable;

pub struct MySqlIdentityRepository {
    pool: MySqlPool,
}

impl MySqlIdentityRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Identity entity
    fn row_to_identity(row: &sqlx::mysql::MySqlRow) -> Result<Identity, DomainError> {
        let get = |column: &str| -> Result<Option<String>, DomainError> {
            row.try_get::<Option<String>, _>(column)
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get {}: {}", column, e),
                })
        };

        let id = get("id")?.unwrap_or_default();
        let role = match get("role")? {
            Some(value) => value.parse::<Role>().unwrap_or_else(|e| {
                warn!(subject = %id, "{}; treating as user", e);
                Role::User
            }),
            None => Role::User,
        };

        Ok(Identity {
            id,
            email: get("email")?.unwrap_or_default(),
            name: get("name")?.unwrap_or_default(),
            role,
            image: get("avatar_url")?,
        })
    }
}

#[async_trait]
impl IdentityRepository for MySqlIdentityRepository {
    async fn find_identity(
        &self,
        subject_id: &str,
        email: &str,
    ) -> Result<Option<Identity>, DomainError> {
        let query = r#"
            SELECT id, email, name, role, avatar_url
            FROM users
            WHERE id = ? AND email = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(subject_id)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("find identity", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_identity(&row)?)),
            None => Ok(None),
        }
    }
}
