//! Database layer.
//!
//! [`Database`] fronts either Firestore or the in-memory store; both enforce
//! username/email uniqueness and the same not-found semantics.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::config::StoreBackend;
use crate::error::AppError;
use crate::models::{DocumentId, Trip, TripRecord, User};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Reservation documents keyed by username
    pub const USERNAMES: &str = "usernames";
    /// Reservation documents keyed by email
    pub const EMAILS: &str = "emails";
    pub const TRIPS: &str = "trips";
}

/// Document store handle shared across requests.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// Connect to the configured backend.
    pub async fn connect(backend: &StoreBackend) -> Result<Self, AppError> {
        match backend {
            StoreBackend::Firestore { project_id } => {
                Ok(Self::Firestore(FirestoreDb::new(project_id).await?))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(Self::Memory(MemoryDb::new()))
            }
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Create a user with a unique username and email.
    ///
    /// Fails with [`AppError::Conflict`] if either is already taken.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        match self {
            Self::Firestore(db) => db.register_user(username, email, password_hash).await,
            Self::Memory(db) => db.register_user(username, email, password_hash),
        }
    }

    /// Look up a user whose username or email equals `identifier`.
    pub async fn find_user_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<User, AppError> {
        match self {
            Self::Firestore(db) => db.find_user_by_username_or_email(identifier).await,
            Self::Memory(db) => db.find_user_by_username_or_email(identifier),
        }
    }

    // ─── Trip Operations ─────────────────────────────────────────

    /// Store a new trip and return its assigned ID.
    pub async fn create_trip(&self, trip: Trip) -> Result<DocumentId, AppError> {
        match self {
            Self::Firestore(db) => db.create_trip(trip).await,
            Self::Memory(db) => db.create_trip(trip),
        }
    }

    pub async fn get_trip(&self, id: &DocumentId) -> Result<TripRecord, AppError> {
        match self {
            Self::Firestore(db) => db.get_trip(id).await,
            Self::Memory(db) => db.get_trip(id),
        }
    }

    /// Every stored trip, unpaginated.
    pub async fn list_trips(&self) -> Result<Vec<TripRecord>, AppError> {
        match self {
            Self::Firestore(db) => db.list_trips().await,
            Self::Memory(db) => db.list_trips(),
        }
    }

    /// Replace the whole trip stored under `id`.
    pub async fn replace_trip(&self, id: &DocumentId, trip: Trip) -> Result<(), AppError> {
        match self {
            Self::Firestore(db) => db.replace_trip(id, trip).await,
            Self::Memory(db) => db.replace_trip(id, trip),
        }
    }

    pub async fn delete_trip(&self, id: &DocumentId) -> Result<(), AppError> {
        match self {
            Self::Firestore(db) => db.delete_trip(id).await,
            Self::Memory(db) => db.delete_trip(id),
        }
    }
}

pub(crate) fn trip_not_found(id: &DocumentId) -> AppError {
    AppError::NotFound(format!("Trip {} not found", id))
}

pub(crate) fn user_conflict() -> AppError {
    AppError::Conflict("Username or email already in use".to_string())
}
