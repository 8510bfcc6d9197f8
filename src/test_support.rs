// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Arc, time::Duration};

use reqwest::{cookie::CookieStore as _, header::HeaderValue};
use secrecy::SecretString;
use url::Url;
use wiremock::MockServer;

use crate::{
    api::Api,
    auth::{refresh::TokenRefresher, state::AuthState},
    cookies::Jar,
    error::Result,
    http::{self, Endpoints},
    preference::{self, Preference},
    session::Session,
    storage,
};

/// A mock API server plus the client-side pieces wired to talk to it.
pub(crate) struct Harness {
    pub(crate) server: MockServer,
    pub(crate) state: Arc<AuthState>,
    pub(crate) preference: storage::Memory<preference::Data>,
    pub(crate) jar: Arc<Jar>,
    pub(crate) http: reqwest::Client,
    pub(crate) endpoints: Endpoints,
}

impl Harness {
    pub(crate) async fn start(persist: bool) -> Result<Self> {
        let server = MockServer::start().await;
        let preference = storage::Memory::<preference::Data>::new();
        let mut seeded = Preference::new(Box::new(preference.clone()));
        seeded.store(persist).await?;

        let state = Arc::new(AuthState::load(seeded).await?);
        let jar = Arc::new(Jar::default());
        let http = http::client(Arc::clone(&jar), Duration::from_secs(5))?;
        let endpoints = Endpoints::new(Url::parse(&format!("{}/api", server.uri()))?);

        Ok(Self {
            server,
            state,
            preference,
            jar,
            http,
            endpoints,
        })
    }

    pub(crate) fn refresher(&self) -> Arc<TokenRefresher> {
        Arc::new(TokenRefresher::new(
            self.http.clone(),
            self.endpoints.clone(),
            Arc::clone(&self.state),
        ))
    }

    pub(crate) fn api(&self) -> Api {
        Api::new(
            self.http.clone(),
            self.endpoints.clone(),
            Arc::clone(&self.state),
            self.refresher(),
        )
    }

    pub(crate) fn sign_in(&self, token: &str) {
        self.state.set_session(Session::authenticated(
            "u1",
            true,
            SecretString::new(token.to_owned()),
        ));
    }

    pub(crate) fn plant_cookie(&self, cookie: &'static str) {
        self.jar.set_cookies(
            &mut [HeaderValue::from_static(cookie)].iter(),
            self.endpoints.base(),
        );
    }

    /// How many requests the server has seen for `path` (relative to `/api/`).
    pub(crate) async fn hits(&self, path: &str) -> usize {
        let wanted = format!("/api/{path}");
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.path() == wanted)
            .count()
    }
}
