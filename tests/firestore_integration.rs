// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! FIRESTORE_EMULATOR_HOST to point at it. They are skipped otherwise.

use tripshare::error::AppError;
use tripshare::models::{DocumentId, Trip, Waypoint};

mod common;
use common::test_db;

/// Unique suffix for test isolation within a shared emulator.
fn unique_suffix() -> String {
    DocumentId::generate().unwrap().to_string()
}

fn test_trip(title: &str) -> Trip {
    Trip {
        title: title.to_string(),
        description: "Integration".to_string(),
        creator_id: "creator".to_string(),
        start_location: "Start".to_string(),
        end_location: "End".to_string(),
        waypoints: vec![Waypoint {
            name: "Mid".to_string(),
            location: "Middle".to_string(),
            description: "Halfway".to_string(),
        }],
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_register_and_find_user() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let username = format!("user_{}", suffix);
    let email = format!("{}@example.com", suffix);

    let user = db.register_user(&username, &email, "digest").await.unwrap();

    let by_name = db.find_user_by_username_or_email(&username).await.unwrap();
    assert_eq!(by_name.id, user.id);

    let by_email = db.find_user_by_username_or_email(&email).await.unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_email.password_hash, "digest");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let username = format!("user_{}", suffix);
    let email = format!("{}@example.com", suffix);

    db.register_user(&username, &email, "digest").await.unwrap();

    let same_name = db
        .register_user(&username, &format!("other_{}", email), "digest")
        .await;
    assert!(matches!(same_name, Err(AppError::Conflict(_))));

    let same_email = db
        .register_user(&format!("other_{}", username), &email, "digest")
        .await;
    assert!(matches!(same_email, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_concurrent_registration_single_winner() {
    require_emulator!();

    let db = test_db().await;
    let username = format!("racer_{}", unique_suffix());

    let attempts = (0..5).map(|i| {
        let db = db.clone();
        let username = username.clone();
        tokio::spawn(async move {
            db.register_user(&username, &format!("{}_{}@example.com", username, i), "d")
                .await
        })
    });

    let mut winners = 0;
    for attempt in attempts {
        if attempt.await.unwrap().is_ok() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_unknown_user_not_found() {
    require_emulator!();

    let db = test_db().await;
    let result = db
        .find_user_by_username_or_email(&format!("ghost_{}", unique_suffix()))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// TRIP TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_trip_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let id = db.create_trip(test_trip("Lifecycle")).await.unwrap();

    let fetched = db.get_trip(&id).await.unwrap();
    assert_eq!(fetched.id, id.to_string());
    assert_eq!(fetched.into_trip(), test_trip("Lifecycle"));

    let listed = db.list_trips().await.unwrap();
    assert!(listed.iter().any(|t| t.id == id.to_string()));

    let mut replacement = test_trip("Replaced");
    replacement.waypoints.clear();
    replacement.description.clear();
    db.replace_trip(&id, replacement.clone()).await.unwrap();
    assert_eq!(db.get_trip(&id).await.unwrap().into_trip(), replacement);

    db.delete_trip(&id).await.unwrap();
    assert!(matches!(db.get_trip(&id).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        db.delete_trip(&id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_replace_missing_trip_not_found() {
    require_emulator!();

    let db = test_db().await;
    let id = DocumentId::generate().unwrap();
    assert!(matches!(
        db.replace_trip(&id, test_trip("Ghost")).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_replace_after_delete_does_not_recreate() {
    require_emulator!();

    let db = test_db().await;
    let id = db.create_trip(test_trip("Short-lived")).await.unwrap();
    db.delete_trip(&id).await.unwrap();

    assert!(matches!(
        db.replace_trip(&id, test_trip("Resurrected")).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(db.get_trip(&id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_dotted_and_reserved_usernames_register() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();

    for username in [".", "..", "__x__"] {
        let email = format!("{}_{}@example.com", username.len(), suffix);
        // Earlier runs against the same emulator may already hold the name.
        match db.register_user(username, &email, "digest").await {
            Ok(_) | Err(AppError::Conflict(_)) => {}
            Err(e) => panic!("{} failed: {}", username, e),
        }
    }
}
