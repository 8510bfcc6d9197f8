// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{io, result};

use reqwest::StatusCode;
use thiserror::Error;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("the server could not be reached; try again later ({0})")]
    Unreachable(reqwest::Error),
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("server responded with {status}: {}", .message.as_deref().unwrap_or("no details given"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("the session is no longer valid; log in again with `menuctl login`")]
    SessionExpired,
    #[error("you must log in as an administrator first (`menuctl login`)")]
    LoginRequired,
    #[error("the account is not authorized to administer this menu")]
    NotAuthorized,
    #[error("invalid product: {0}")]
    Validation(#[from] Validation),
    #[error("password retrieval error: {0}")]
    Password(#[from] Password),
    #[error("internal communication error: {0}")]
    Internal(#[from] Internal),
    #[error("command execution failed")]
    Command,
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// The HTTP status the server answered with, if this error carries one.
    pub(crate) const fn status(&self) -> Option<StatusCode> {
        match *self {
            Self::Status { status, .. } => Some(status),
            Self::Io(_)
            | Self::Json(_)
            | Self::Unreachable(_)
            | Self::Http(_)
            | Self::SessionExpired
            | Self::LoginRequired
            | Self::NotAuthorized
            | Self::Validation(_)
            | Self::Password(_)
            | Self::Internal(_)
            | Self::Command
            | Self::Cancelled => None,
        }
    }
}

impl From<pinentry::Error> for Error {
    fn from(value: pinentry::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(
            clippy::wildcard_enum_match_arm,
            clippy::match_wildcard_for_single_variants
        )]
        match value {
            pinentry::Error::Cancelled | pinentry::Error::Timeout => Self::Cancelled,
            pinentry::Error::Io(e) => Self::Io(e),
            _ => Self::Password(Password::Pinentry(value)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_connect() || value.is_timeout() {
            Self::Unreachable(value)
        } else if value.is_decode() {
            Self::Http(value)
        } else if let Some(status) = value.status() {
            Self::Status {
                status,
                message: None,
            }
        } else {
            Self::Http(value)
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Io(value.into())
    }
}

#[derive(Error, Debug, PartialEq)]
pub(crate) enum Validation {
    #[error("a title is required")]
    TitleMissing,
    #[error("{field} must be between {min} and {max} characters long (got {len})")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        len: usize,
    },
    #[error(r#"a product named "{}" already exists"#, .0.escape_default())]
    DuplicateTitle(String),
    #[error("price must be between {min} and {max} (got {price})")]
    Price { min: f64, max: f64, price: f64 },
}

#[derive(Error, Debug)]
pub(crate) enum Password {
    #[error("no password prompt available")]
    NoPrompt,
    #[error("Pinentry implementation error: {0}")]
    Pinentry(pinentry::Error),
}

#[derive(Error, Debug)]
pub(crate) enum Internal {
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Self {
        Self::Internal(value.into())
    }
}
