// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The credentials the server hands out as cookies (the refresh credential in
//! particular). Nothing outside the HTTP client looks inside them.

use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};

use cookie::Cookie;
use log::{debug, warn};
use reqwest::{cookie::CookieStore, header::HeaderValue};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::{error::Result, storage};

pub(crate) const FILE_NAME: &str = "cookies.json";

/// Cookie values by host, then by name. Cookies are scoped to the host that
/// set them; `Domain` and `Path` attributes are not honored.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Data {
    hosts: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Default)]
pub(crate) struct Jar {
    data: RwLock<Data>,
}

impl Jar {
    pub(crate) fn new(data: Data) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    pub(crate) fn snapshot(&self) -> Data {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn clear(&self) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .hosts
            .clear();
    }

    fn accept(&self, set_cookie: &str, host: &str) {
        let cookie = match Cookie::parse(set_cookie) {
            Ok(cookie) => cookie,
            Err(e) => {
                warn!("Ignoring malformed cookie from {}: {}", host, e);
                return;
            }
        };

        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let cookies = data.hosts.entry(host.to_owned()).or_default();
        if is_removal(&cookie) {
            debug!("Server removed cookie {} for {}", cookie.name(), host);
            let _removed = cookies.remove(cookie.name());
        } else {
            debug!("Server set cookie {} for {}", cookie.name(), host);
            let _previous = cookies.insert(cookie.name().to_owned(), cookie.value().to_owned());
        }
        if cookies.is_empty() {
            let _removed = data.hosts.remove(host);
        }
    }
}

fn is_removal(cookie: &Cookie<'_>) -> bool {
    cookie.value().is_empty()
        || cookie
            .max_age()
            .is_some_and(|age| age <= time::Duration::ZERO)
        || cookie
            .expires_datetime()
            .is_some_and(|at| at <= OffsetDateTime::now_utc())
}

impl CookieStore for Jar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let Some(host) = url.host_str() else {
            return;
        };
        for header in cookie_headers {
            match header.to_str() {
                Ok(set_cookie) => self.accept(set_cookie, host),
                Err(e) => warn!("Ignoring non-text cookie from {}: {}", host, e),
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let host = url.host_str()?;
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let header = data
            .hosts
            .get(host)?
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&header).ok()
    }
}

/// A jar tied to the storage it was loaded from.
pub(crate) struct Persisted {
    jar: std::sync::Arc<Jar>,
    storage: Box<dyn storage::Storage<Data>>,
}

impl Persisted {
    pub(crate) async fn open(mut storage: Box<dyn storage::Storage<Data>>) -> Result<Self> {
        let data = storage.get().await?.unwrap_or_default();
        Ok(Self {
            jar: std::sync::Arc::new(Jar::new(data)),
            storage,
        })
    }

    pub(crate) fn jar(&self) -> std::sync::Arc<Jar> {
        std::sync::Arc::clone(&self.jar)
    }

    /// Writes the jar out when the user asked to stay signed in, and removes
    /// any stored copy otherwise.
    pub(crate) async fn save(&mut self, keep: bool) -> Result<()> {
        if keep {
            self.storage.update(&self.jar.snapshot()).await
        } else {
            self.storage.clear().await
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Result;

    use super::*;

    fn url(s: &str) -> Result<Url> {
        Ok(Url::parse(s)?)
    }

    fn header_for(jar: &Jar, at: &str) -> Result<Option<String>> {
        Ok(jar
            .cookies(&url(at)?)
            .and_then(|value| value.to_str().ok().map(str::to_owned)))
    }

    #[test]
    fn returns_cookies_to_the_host_that_set_them() -> Result<()> {
        let jar = Jar::default();
        let set = [HeaderValue::from_static(
            "jwt=abc; HttpOnly; Path=/; Max-Age=86400",
        )];
        jar.set_cookies(&mut set.iter(), &url("http://api.example.com/auth/login")?);

        assert_eq!(
            header_for(&jar, "http://api.example.com/auth/refresh")?,
            Some("jwt=abc".to_owned())
        );
        assert_eq!(header_for(&jar, "http://other.example.com/")?, None);
        Ok(())
    }

    #[test]
    fn cleared_cookie_is_forgotten() -> Result<()> {
        let jar = Jar::default();
        let at = url("http://api.example.com/auth/logout")?;
        jar.set_cookies(&mut [HeaderValue::from_static("jwt=abc")].iter(), &at);
        jar.set_cookies(
            &mut [HeaderValue::from_static(
                "jwt=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            )]
            .iter(),
            &at,
        );

        assert_eq!(header_for(&jar, "http://api.example.com/")?, None);
        assert_eq!(jar.snapshot(), Data::default());
        Ok(())
    }

    #[tokio::test]
    async fn saved_only_when_kept() -> Result<()> {
        let memory = storage::Memory::<Data>::new();
        let mut persisted = Persisted::open(Box::new(memory.clone())).await?;
        persisted.jar().set_cookies(
            &mut [HeaderValue::from_static("jwt=abc")].iter(),
            &url("http://api.example.com/")?,
        );

        persisted.save(true).await?;
        let reopened = Persisted::open(Box::new(memory.clone())).await?;
        assert_eq!(
            header_for(&reopened.jar(), "http://api.example.com/")?,
            Some("jwt=abc".to_owned())
        );

        persisted.save(false).await?;
        let reopened = Persisted::open(Box::new(memory)).await?;
        assert_eq!(header_for(&reopened.jar(), "http://api.example.com/")?, None);
        Ok(())
    }
}
