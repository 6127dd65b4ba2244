// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip model for storage and API.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A named stop along a trip. Has no identity outside its trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Waypoint {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
}

/// Trip contents as submitted by clients on create and replace.
///
/// Every field is free text and may be omitted; only lengths are bounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Trip {
    #[validate(length(max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: String,
    /// User ID of the creator. Not checked against the user collection.
    #[serde(alias = "creatorid")]
    #[validate(length(max = 200))]
    pub creator_id: String,
    #[serde(alias = "startlocation")]
    #[validate(length(max = 200))]
    pub start_location: String,
    #[serde(alias = "endlocation")]
    #[validate(length(max = 200))]
    pub end_location: String,
    #[validate(length(max = 500), nested)]
    pub waypoints: Vec<Waypoint>,
}

/// Stored trip record (ID also used as document ID).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub creator_id: String,
    pub start_location: String,
    pub end_location: String,
    pub waypoints: Vec<Waypoint>,
}

impl TripRecord {
    /// Build the record that fully replaces whatever was stored under `id`.
    pub fn new(id: String, trip: Trip) -> Self {
        Self {
            id,
            title: trip.title,
            description: trip.description,
            creator_id: trip.creator_id,
            start_location: trip.start_location,
            end_location: trip.end_location,
            waypoints: trip.waypoints,
        }
    }

    /// Trip contents without the ID.
    pub fn into_trip(self) -> Trip {
        Trip {
            title: self.title,
            description: self.description,
            creator_id: self.creator_id,
            start_location: self.start_location,
            end_location: self.end_location,
            waypoints: self.waypoints,
        }
    }
}
