// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Email/password accounts kept next to the documents.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{OptionalExtension, params};
use tracing::{info, warn};

use crate::docstore::Backend;
use crate::error::{Error, Result};
use crate::models::AuthUser;

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

/// Argon2id with default parameters, stored as a PHC string that carries
/// its own salt and settings.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "stored password hash is unreadable");
            false
        }
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !EMAIL.is_match(&email) {
        return Err(Error::InvalidEmail(email));
    }
    Ok(email)
}

/// Create an account. Refused unless `allow_signup` is set.
pub fn sign_up(
    backend: &Backend,
    allow_signup: bool,
    email: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<AuthUser> {
    if !allow_signup {
        return Err(Error::SignupDisabled);
    }
    let email = normalize_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::WeakPassword(MIN_PASSWORD_LEN));
    }
    let display_name = display_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let uid = uuid::Uuid::new_v4().simple().to_string();
    let hash = hash_password(password)?;

    backend.with_conn(|conn| {
        let exists: Option<String> = conn
            .query_row(
                "SELECT uid FROM accounts WHERE email=?1",
                params![email],
                |r| r.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(Error::AccountExists(email.clone()));
        }
        conn.execute(
            "INSERT INTO accounts(uid, email, display_name, password_hash)
             VALUES (?1, ?2, ?3, ?4)",
            params![uid, email, display_name, hash],
        )?;
        Ok(())
    })?;
    info!(uid = %uid, "account created");
    Ok(AuthUser {
        uid,
        email,
        display_name,
    })
}

pub fn sign_in(backend: &Backend, email: &str, password: &str) -> Result<AuthUser> {
    let email = normalize_email(email).map_err(|_| Error::InvalidCredentials)?;
    let row: Option<(String, Option<String>, String)> = backend.with_conn(|conn| {
        Ok(conn
            .query_row(
                "SELECT uid, display_name, password_hash FROM accounts WHERE email=?1",
                params![email],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?)
    })?;
    match row {
        Some((uid, display_name, hash)) if verify_password(password, &hash) => {
            Ok(AuthUser {
                uid,
                email,
                display_name,
            })
        }
        _ => {
            warn!("sign-in refused");
            Err(Error::InvalidCredentials)
        }
    }
}
