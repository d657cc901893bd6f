use std::sync::Arc;

use crate::auth::{self, Claims};
use crate::database::models::{NewUser, User};
use crate::database::Store;

use super::ServiceError;

/// Email sign-up: issue confirmation codes and trade them for access tokens
pub struct SignupService {
    store: Arc<dyn Store>,
}

impl SignupService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get or create the user behind `email` and issue a fresh confirmation code.
    ///
    /// Returns the user and the plain code; only its digest is stored. Any code
    /// issued earlier stops working.
    pub async fn request_code(&self, email: &str) -> Result<(User, String), ServiceError> {
        let email = email.trim().to_lowercase();

        let user = match self.store.user_by_email(&email).await? {
            Some(user) => user,
            None => self.register(&email).await?,
        };

        let code = auth::generate_confirmation_code();
        self.store
            .set_confirmation_code(user.id, &auth::hash_confirmation_code(&code))
            .await?;

        // Mail delivery is out of scope; the log line is the outbox
        tracing::info!(target: "yamdb::mail", "Confirmation code for {}: {}", user.email, code);

        Ok((user, code))
    }

    /// Exchange a confirmation code for a JWT. The code is consumed on success.
    pub async fn exchange_code(&self, email: &str, code: &str) -> Result<String, ServiceError> {
        let email = email.trim().to_lowercase();

        let user = self
            .store
            .user_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with email {} not found", email)))?;

        if !auth::verify_confirmation_code(code, &user.confirmation_code) {
            tracing::warn!("Rejected confirmation code for {}", user.email);
            return Err(ServiceError::validation("confirmation_code", "Confirmation code doesn't match"));
        }

        self.store.set_confirmation_code(user.id, "").await?;

        let token = auth::generate_jwt(&Claims::for_user(&user))?;
        tracing::info!("Issued access token for {}", user.username);
        Ok(token)
    }

    async fn register(&self, email: &str) -> Result<User, ServiceError> {
        let username = username_from_email(email);

        if self.store.user_by_username(&username).await?.is_some() {
            return Err(ServiceError::validation(
                "email",
                format!("Username '{}' derived from this email is already taken", username),
            ));
        }

        let user = self
            .store
            .create_user(NewUser {
                email: email.to_string(),
                username,
                ..Default::default()
            })
            .await?;

        tracing::info!("Registered user {} <{}>", user.username, user.email);
        Ok(user)
    }
}

/// Local part of the address, used as the initial username
pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
