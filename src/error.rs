// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

/// Ledger and document store error variants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not signed in")]
    NotSignedIn,
    #[error("no active book")]
    NoActiveStore,
    #[error("permission denied for '{0}'")]
    PermissionDenied(String),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("invalid document path '{0}'")]
    InvalidPath(String),
    #[error("document store unavailable")]
    Unavailable,
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount must not exceed {0}")]
    AmountTooLarge(rust_decimal::Decimal),
    #[error("name must not be empty")]
    EmptyName,
    #[error("cannot delete the only remaining book")]
    LastStore,
    #[error("confirmation does not match the book name")]
    ConfirmationMismatch,
    #[error("reorder list must contain every existing item exactly once")]
    InvalidReorder,
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("an account already exists for {0}")]
    AccountExists(String),
    #[error("sign-up is disabled")]
    SignupDisabled,
    #[error("transaction '{0}' already exists")]
    MigrationConflict(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotSignedIn => "NOT_SIGNED_IN",
            Self::NoActiveStore => "NO_ACTIVE_STORE",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidPath(_) => "INVALID_PATH",
            Self::Unavailable => "UNAVAILABLE",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::AmountTooLarge(_) => "AMOUNT_TOO_LARGE",
            Self::EmptyName => "EMPTY_NAME",
            Self::LastStore => "LAST_STORE",
            Self::ConfirmationMismatch => "CONFIRMATION_MISMATCH",
            Self::InvalidReorder => "INVALID_REORDER",
            Self::InvalidEmail(_) => "INVALID_EMAIL",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountExists(_) => "ACCOUNT_EXISTS",
            Self::SignupDisabled => "SIGNUP_DISABLED",
            Self::MigrationConflict(_) => "MIGRATION_CONFLICT",
            Self::PasswordHash(_) => "PASSWORD_HASH",
            Self::Sqlite(_) => "STORAGE",
            Self::Json(_) => "ENCODING",
        }
    }

    /// Text suitable for a toast. Auth and validation failures get their own
    /// wording, everything coming back from the backend collapses to one
    /// generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid email or password.".to_string(),
            Self::AccountExists(_) => "An account with this email already exists.".to_string(),
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::WeakPassword(n) => format!("Password must be at least {} characters.", n),
            Self::SignupDisabled => "Sign-up is currently closed.".to_string(),
            Self::NonPositiveAmount
            | Self::AmountTooLarge(_)
            | Self::MigrationConflict(_)
            | Self::EmptyName
            | Self::LastStore
            | Self::ConfirmationMismatch
            | Self::InvalidReorder
            | Self::NotSignedIn
            | Self::NoActiveStore => {
                let mut msg = self.to_string();
                if let Some(first) = msg.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                msg.push('.');
                msg
            }
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}
