//! User directory: registration and profiles.

use crate::error::Result;
use crate::metrics::REGISTRATIONS_TOTAL;
use crate::projection::{FieldSet, UserField, UserView};
use crate::providers::UserRepository;
use crate::types::{Identity, User};
use crate::validation::{RegistrationForm, Validator};
use std::sync::Arc;

/// Registers users and serves their profiles.
pub struct UserDirectory<G> {
    gateway: Arc<G>,
    validator: Validator,
}

impl<G: UserRepository> UserDirectory<G> {
    /// Create a directory.
    #[must_use]
    pub const fn new(gateway: Arc<G>, validator: Validator) -> Self {
        Self { gateway, validator }
    }

    /// Register the caller.
    ///
    /// The stored email is always the verified one, never a client-supplied
    /// value.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input and `UserAlreadyExists` if
    /// the email is taken.
    #[tracing::instrument(skip(self, identity, form), fields(email = %identity.email))]
    pub async fn register(&self, identity: &Identity, form: RegistrationForm) -> Result<User> {
        let result = async {
            let new_user = self.validator.registration(&identity.email, form)?;
            self.gateway.create_user(&new_user).await
        }
        .await;

        match &result {
            Ok(user) => {
                metrics::counter!(REGISTRATIONS_TOTAL, "outcome" => "success").increment(1);
                tracing::info!(user_id = %user.id, "User registered");
            }
            Err(e) => {
                metrics::counter!(REGISTRATIONS_TOTAL, "outcome" => e.outcome()).increment(1);
                if e.is_client_error() {
                    tracing::warn!(error = %e, "Registration rejected");
                } else {
                    tracing::error!(error = %e, "Registration failed");
                }
            }
        }
        result
    }

    /// Load the caller's profile, projected to the requested fields.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for a bad projection and `UserNotFound` if the
    /// caller has not registered.
    #[tracing::instrument(skip(self, identity), fields(email = %identity.email))]
    pub async fn profile(&self, identity: &Identity, fields: Option<&str>) -> Result<UserView> {
        let fields = FieldSet::<UserField>::parse(fields)?;
        self.gateway.find_user(&identity.email, &fields).await
    }
}
