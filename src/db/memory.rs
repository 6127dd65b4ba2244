// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store.
//!
//! Mirrors the Firestore collections with `DashMap`s. Username and email
//! reservations use the map entry API, so concurrent registrations of the
//! same name cannot both succeed.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::db::{trip_not_found, user_conflict};
use crate::error::AppError;
use crate::models::{DocumentId, Trip, TripRecord, User};
use crate::time_utils::format_utc_rfc3339;

#[derive(Default)]
struct Collections {
    users: DashMap<String, User>,
    /// username -> user ID
    usernames: DashMap<String, String>,
    /// email -> user ID
    emails: DashMap<String, String>,
    trips: DashMap<String, TripRecord>,
}

/// Process-local store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Collections>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── User Operations ─────────────────────────────────────────

    pub fn register_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let id = DocumentId::generate()?.to_string();

        match self.inner.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => return Err(user_conflict()),
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
            }
        }

        match self.inner.emails.entry(email.to_string()) {
            Entry::Occupied(_) => {
                self.inner.usernames.remove(username);
                return Err(user_conflict());
            }
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
            }
        }

        let user = User {
            id: id.clone(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };
        self.inner.users.insert(id, user.clone());

        Ok(user)
    }

    pub fn find_user_by_username_or_email(&self, identifier: &str) -> Result<User, AppError> {
        let user_id = self
            .inner
            .usernames
            .get(identifier)
            .or_else(|| self.inner.emails.get(identifier))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", identifier)))?;

        self.inner
            .users
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", identifier)))
    }

    // ─── Trip Operations ─────────────────────────────────────────

    pub fn create_trip(&self, trip: Trip) -> Result<DocumentId, AppError> {
        let id = DocumentId::generate()?;
        self.inner
            .trips
            .insert(id.to_string(), TripRecord::new(id.to_string(), trip));
        Ok(id)
    }

    pub fn get_trip(&self, id: &DocumentId) -> Result<TripRecord, AppError> {
        self.inner
            .trips
            .get(id.as_str())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| trip_not_found(id))
    }

    pub fn list_trips(&self) -> Result<Vec<TripRecord>, AppError> {
        Ok(self
            .inner
            .trips
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    pub fn replace_trip(&self, id: &DocumentId, trip: Trip) -> Result<(), AppError> {
        match self.inner.trips.get_mut(id.as_str()) {
            Some(mut entry) => {
                *entry = TripRecord::new(id.to_string(), trip);
                Ok(())
            }
            None => Err(trip_not_found(id)),
        }
    }

    pub fn delete_trip(&self, id: &DocumentId) -> Result<(), AppError> {
        self.inner
            .trips
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| trip_not_found(id))
    }
}
