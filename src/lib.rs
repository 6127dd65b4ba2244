// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Tripshare: plan and share trips
//!
//! This crate provides the backend API for user accounts (registration,
//! login, token refresh) and shared trip plans stored in a document database.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{PasswordHasher, TokenService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub passwords: PasswordHasher,
    pub tokens: TokenService,
}

impl AppState {
    /// Build state from config and an already connected store.
    pub fn new(config: Config, db: Database) -> Self {
        let passwords = PasswordHasher::new(config.bcrypt_cost);
        let tokens = TokenService::new(&config.tokens);
        Self {
            config,
            db,
            passwords,
            tokens,
        }
    }
}
