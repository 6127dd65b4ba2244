// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod id;
pub mod trip;
pub mod user;

pub use id::DocumentId;
pub use trip::{Trip, TripRecord, Waypoint};
pub use user::{Reservation, User};
