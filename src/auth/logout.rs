// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use log::{debug, warn};

use crate::{
    cookies::Jar,
    error::Result,
    http::{self, Endpoints},
};

use super::state::AuthState;

/// Tells the server to forget the refresh credential, then forgets everything
/// locally whether or not the server heard.
pub(crate) struct Logout {
    http: reqwest::Client,
    endpoints: Endpoints,
    state: Arc<AuthState>,
    jar: Arc<Jar>,
}

impl Logout {
    pub(crate) fn new(
        http: reqwest::Client,
        endpoints: Endpoints,
        state: Arc<AuthState>,
        jar: Arc<Jar>,
    ) -> Self {
        Self {
            http,
            endpoints,
            state,
            jar,
        }
    }

    pub(crate) async fn logout(&self) {
        match self.notify().await {
            Ok(()) => debug!("Server ended the session"),
            Err(e) => warn!("Could not end the session on the server: {}", e),
        }

        self.state.clear_session();
        self.jar.clear();
    }

    async fn notify(&self) -> Result<()> {
        let resp = self.http.post(self.endpoints.logout()?).send().await?;
        let _resp = http::check(resp).await?;
        Ok(())
    }
}
