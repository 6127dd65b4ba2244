// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile + password digest)
//! - Username/email reservations (uniqueness constraint)
//! - Trips (full-document CRUD)

use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;

use crate::db::{collections, trip_not_found, user_conflict};
use crate::error::AppError;
use crate::models::{DocumentId, Reservation, Trip, TripRecord, User};
use crate::time_utils::format_utc_rfc3339;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Register a new user.
    ///
    /// The OR query up front only produces a friendlier early error; the
    /// create-only reservation documents are what actually keep concurrent
    /// registrations from sharing a username or email.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        if self.find_user_matching(username, email).await?.is_some() {
            return Err(user_conflict());
        }

        let id = DocumentId::generate()?.to_string();
        let reservation = Reservation {
            user_id: id.clone(),
        };

        self.reserve(collections::USERNAMES, username, &reservation)
            .await?;
        if let Err(e) = self
            .reserve(collections::EMAILS, email, &reservation)
            .await
        {
            self.release(collections::USERNAMES, username).await;
            return Err(e);
        }

        let user = User {
            id: id.clone(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        let inserted = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&id)
            .object(&user)
            .execute::<User>()
            .await;

        if let Err(e) = inserted {
            self.release(collections::USERNAMES, username).await;
            self.release(collections::EMAILS, email).await;
            return Err(AppError::Database(e.to_string()));
        }

        tracing::info!(user_id = %id, "User document created");
        Ok(user)
    }

    /// Find a user by username or email.
    pub async fn find_user_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<User, AppError> {
        self.find_user_matching(identifier, identifier)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", identifier)))
    }

    /// First user whose username equals `username` or whose email equals `email`.
    async fn find_user_matching(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let username = username.to_string();
        let email = email.to_string();

        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| {
                q.for_any([
                    q.field("username").eq(username.clone()),
                    q.field("email").eq(email.clone()),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create the reservation document for `key`, failing with a conflict if
    /// it already exists.
    async fn reserve(
        &self,
        collection: &str,
        key: &str,
        reservation: &Reservation,
    ) -> Result<(), AppError> {
        let result = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(reservation_doc_id(key))
            .object(reservation)
            .execute::<Reservation>()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!(collection, "Reservation already taken");
                Err(user_conflict())
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Best-effort removal of a reservation after a failed registration.
    async fn release(&self, collection: &str, key: &str) {
        let Ok(client) = self.get_client() else {
            return;
        };

        if let Err(e) = client
            .fluent()
            .delete()
            .from(collection)
            .document_id(reservation_doc_id(key))
            .execute()
            .await
        {
            tracing::error!(
                collection,
                error = %e,
                "Failed to release reservation; it must be removed manually"
            );
        }
    }

    // ─── Trip Operations ─────────────────────────────────────────

    /// Store a new trip under a freshly generated ID.
    pub async fn create_trip(&self, trip: Trip) -> Result<DocumentId, AppError> {
        let id = DocumentId::generate()?;
        let record = TripRecord::new(id.to_string(), trip);

        let _: TripRecord = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::TRIPS)
            .document_id(id.as_str())
            .object(&record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(id)
    }

    /// Get a trip by ID.
    pub async fn get_trip(&self, id: &DocumentId) -> Result<TripRecord, AppError> {
        self.find_trip(id).await?.ok_or_else(|| trip_not_found(id))
    }

    async fn find_trip(&self, id: &DocumentId) -> Result<Option<TripRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TRIPS)
            .obj()
            .one(id.as_str())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all trips.
    pub async fn list_trips(&self) -> Result<Vec<TripRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TRIPS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite an existing trip document.
    ///
    /// The update carries no field mask, so fields absent from `trip` are
    /// dropped rather than merged. The `Exists` precondition keeps a replace
    /// racing a delete from recreating the trip.
    pub async fn replace_trip(&self, id: &DocumentId, trip: Trip) -> Result<(), AppError> {
        let record = TripRecord::new(id.to_string(), trip);
        let _: TripRecord = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TRIPS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id.as_str())
            .object(&record)
            .execute()
            .await
            .map_err(|e| trip_write_error(id, e))?;
        Ok(())
    }

    /// Delete a trip.
    pub async fn delete_trip(&self, id: &DocumentId) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TRIPS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id.as_str())
            .execute()
            .await
            .map_err(|e| trip_write_error(id, e))
    }
}

/// Map a failed `Exists(true)` precondition to NotFound.
fn trip_write_error(id: &DocumentId, err: FirestoreError) -> AppError {
    match err {
        FirestoreError::DataNotFoundError(_) => trip_not_found(id),
        FirestoreError::DatabaseError(ref e) if e.public.code == "FailedPrecondition" => {
            trip_not_found(id)
        }
        other => AppError::Database(other.to_string()),
    }
}

/// Document ID for a reservation.
///
/// Hex keeps the ID clear of `/`, of `.` and `..`, and of the reserved
/// `__.*__` pattern.
fn reservation_doc_id(key: &str) -> String {
    hex::encode(key)
}
