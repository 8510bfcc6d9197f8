// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    error::Result,
    http::{self, Endpoints},
    session::Session,
};

use super::state::AuthState;

/// Mints a fresh access token from the server-held refresh credential.
#[async_trait]
pub(crate) trait Refresh: Send + Sync {
    /// On success the session has already been replaced by the time this
    /// returns, and the new token is handed back for immediate use. On failure
    /// the session is left exactly as it was.
    async fn refresh(&self) -> Result<SecretString>;
}

#[async_trait]
impl<T: Refresh + ?Sized> Refresh for Arc<T> {
    async fn refresh(&self) -> Result<SecretString> {
        (**self).refresh().await
    }
}

#[derive(Deserialize)]
struct User {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "isAdmin", default)]
    is_admin: bool,
}

#[derive(Deserialize)]
struct Refreshed {
    user: User,
    token: SecretString,
}

pub(crate) struct TokenRefresher {
    http: reqwest::Client,
    endpoints: Endpoints,
    state: Arc<AuthState>,
}

impl TokenRefresher {
    pub(crate) fn new(http: reqwest::Client, endpoints: Endpoints, state: Arc<AuthState>) -> Self {
        Self {
            http,
            endpoints,
            state,
        }
    }
}

#[async_trait]
impl Refresh for TokenRefresher {
    async fn refresh(&self) -> Result<SecretString> {
        debug!("Requesting a new access token");
        let resp = self.http.get(self.endpoints.refresh()?).send().await?;
        let refreshed: Refreshed = http::check(resp).await?.json().await?;

        debug!(
            "Refreshed session for user {} (admin: {})",
            refreshed.user.id, refreshed.user.is_admin
        );
        self.state.set_session(Session::authenticated(
            refreshed.user.id,
            refreshed.user.is_admin,
            refreshed.token.clone(),
        ));
        Ok(refreshed.token)
    }
}
