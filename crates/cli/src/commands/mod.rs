//! Command implementations.
//!
//! Each function performs one user-facing action against a
//! [`StorefrontContext`](bookbarn_storefront::StorefrontContext) and prints
//! its result through [`crate::output`].

pub mod account;
pub mod backoffice;
pub mod shop;

use std::io::BufRead;

use bookbarn_storefront::{ApiError, StoreOutcome, StoreSnapshot};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A cart or wishlist call failed; the message comes from the store.
    #[error("{0}")]
    Store(String),

    /// The command needs a signed-in user.
    #[error("not signed in; run `bookbarn login` first")]
    NotSignedIn,

    /// Reading input or a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An argument was rejected before contacting the backend.
    #[error("{0}")]
    InvalidArgument(String),
}

/// Turn a store outcome into a command result.
fn check(outcome: StoreOutcome) -> Result<(), CommandError> {
    match outcome {
        StoreOutcome::Applied | StoreOutcome::Stale => Ok(()),
        StoreOutcome::Failed(message) => Err(CommandError::Store(message)),
        StoreOutcome::Skipped | StoreOutcome::Cancelled => Err(CommandError::NotSignedIn),
    }
}

/// Fail if the fetch made when the session was established did not succeed.
fn fetched<T>(snapshot: &StoreSnapshot<T>) -> Result<(), CommandError> {
    match &snapshot.error {
        Some(message) => Err(CommandError::Store(message.clone())),
        None => Ok(()),
    }
}

/// Use `provided` or read one line from stdin.
fn read_secret(provided: Option<String>, what: &str) -> Result<SecretString, CommandError> {
    let value = match provided {
        Some(value) => value,
        None => {
            tracing::info!("Reading {what} from stdin");
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if value.is_empty() {
        return Err(CommandError::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(SecretString::from(value))
}
