//! User account use-case service.
//!
//! # Responsibility
//! - Provide sign-up, lookup, and deletion entry points for user records.
//! - Derive presentation fields (full name) from stored profile fields.
//!
//! # Invariants
//! - E-mail lookups go through the store's normalization, so they are
//!   case-insensitive without callers lowercasing anything.
//! - Passwords are opaque text here; hashing belongs to the auth layer.

use crate::domain;
use crate::model::record::{Record, RecordId};
use crate::model::value::{FieldMap, FieldValue};
use crate::store::entity_store::{EntityStore, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Request model for creating one user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Service error for user use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    /// Target user does not exist.
    UserNotFound(RecordId),
    /// Store-level failure (validation, duplicates, locks, ...).
    Store(StoreError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UserNotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for UserServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { entity, id } if entity == domain::USER => {
                Self::UserNotFound(id)
            }
            other => Self::Store(other),
        }
    }
}

/// User service facade over the shared entity store.
pub struct UserService {
    store: Arc<EntityStore>,
}

impl UserService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Creates one user account.
    ///
    /// The store lowercases the e-mail before validation and uniqueness, so
    /// two sign-ups differing only in case collide on `email`.
    pub fn sign_up(&self, request: NewUser) -> Result<Record, UserServiceError> {
        let fields = FieldMap::from([
            ("username".to_string(), FieldValue::from(request.username)),
            ("email".to_string(), FieldValue::from(request.email)),
            ("password".to_string(), FieldValue::from(request.password)),
            ("first_name".to_string(), FieldValue::from(request.first_name)),
            ("last_name".to_string(), FieldValue::from(request.last_name)),
        ]);
        Ok(self.store.create(domain::USER, fields)?)
    }

    /// Gets one user by id.
    pub fn get_user(&self, id: RecordId) -> Result<Record, UserServiceError> {
        Ok(self.store.get(domain::USER, id)?)
    }

    /// Finds one user by e-mail, case-insensitively.
    pub fn find_by_email(&self, email: &str) -> Result<Option<Record>, UserServiceError> {
        let mut matches = self.store.find_by(domain::USER, "email", email)?;
        Ok(matches.pop())
    }

    /// Finds one user by username.
    pub fn find_by_username(&self, username: &str) -> Result<Option<Record>, UserServiceError> {
        let mut matches = self.store.find_by(domain::USER, "username", username)?;
        Ok(matches.pop())
    }

    /// Deletes one user. Owned tasks are cascade-deleted by relation policy.
    pub fn delete_user(&self, id: RecordId) -> Result<(), UserServiceError> {
        Ok(self.store.delete(domain::USER, id)?)
    }

    /// Presentation name derived from the stored profile fields.
    pub fn full_name(record: &Record) -> String {
        let first = record.text("first_name").unwrap_or_default();
        let last = record.text("last_name").unwrap_or_default();
        format!("{first} {last}").trim().to_string()
    }
}
