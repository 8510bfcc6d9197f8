// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Arc, time::Duration};

use log::debug;
use reqwest::{cookie::CookieStore, Response};
use serde::Deserialize;
use url::Url;

use crate::{
    error::{Error, Result},
    metadata,
};

/// Where the API lives. Paths are resolved relative to the base, so a base of
/// `https://example.com/api` reaches login at `https://example.com/api/auth/login`.
#[derive(Clone, Debug)]
pub(crate) struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub(crate) fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    pub(crate) const fn base(&self) -> &Url {
        &self.base
    }

    pub(crate) fn join(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    pub(crate) fn login(&self) -> Result<Url> {
        self.join("auth/login")
    }

    pub(crate) fn refresh(&self) -> Result<Url> {
        self.join("auth/refresh")
    }

    pub(crate) fn logout(&self) -> Result<Url> {
        self.join("auth/logout")
    }
}

/// Builds the one HTTP client the process shares. Every request it sends
/// carries whatever credentials the server left in `jar`.
pub(crate) fn client<C: CookieStore + 'static>(
    jar: Arc<C>,
    timeout: Duration,
) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(metadata::USER_AGENT.as_str())
        .cookie_provider(jar)
        .timeout(timeout)
        .build()?)
}

#[derive(Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

/// Turns a non-success response into [`Error::Status`], keeping the server's
/// `msg` when it sent one.
pub(crate) async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.msg,
        Err(e) => {
            debug!("Error response carried no readable message: {}", e);
            None
        }
    };
    Err(Error::Status { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_without_trailing_slash_keeps_its_path() -> Result<()> {
        let endpoints = Endpoints::new(Url::parse("https://example.com/api")?);
        assert_eq!(
            endpoints.refresh()?.as_str(),
            "https://example.com/api/auth/refresh"
        );
        Ok(())
    }

    #[test]
    fn leading_slashes_stay_under_the_base() -> Result<()> {
        let endpoints = Endpoints::new(Url::parse("https://example.com/api/")?);
        assert_eq!(
            endpoints.join("/products/42")?.as_str(),
            "https://example.com/api/products/42"
        );
        Ok(())
    }
}
