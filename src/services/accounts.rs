use std::sync::Arc;

use crate::auth::CredentialVerifier;
use crate::config::SeedAccount;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User};
use crate::database::store::LedgerStore;
use crate::types::UserRole;

/// User creation with the configured credential encoding
pub struct AccountService {
    store: Arc<dyn LedgerStore>,
    credentials: Arc<dyn CredentialVerifier>,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>, credentials: Arc<dyn CredentialVerifier>) -> Self {
        Self { store, credentials }
    }

    pub async fn create(&self, email: &str, password: &str, role: UserRole, name: &str) -> Result<User, DatabaseError> {
        self.store
            .create_user(NewUser {
                email: email.trim().to_string(),
                password: self.credentials.hash(password),
                role,
                name: name.to_string(),
            })
            .await
    }

    /// Creates the seed admin unless the email is taken. Returns whether it did.
    pub async fn ensure_admin(&self, seed: &SeedAccount) -> Result<bool, DatabaseError> {
        if self.store.find_user_by_email(&seed.email).await?.is_some() {
            return Ok(false);
        }
        match self.create(&seed.email, &seed.password, UserRole::Admin, "Admin User").await {
            Ok(user) => {
                tracing::info!("Seeded admin account {}", user.email);
                Ok(true)
            }
            // lost a race with another instance
            Err(DatabaseError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
