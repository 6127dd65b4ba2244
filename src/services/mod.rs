// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - authentication primitives.

pub mod password;
pub mod token;

pub use password::{HashError, PasswordHasher};
pub use token::{Identity, TokenDetails, TokenError, TokenKind, TokenService};
