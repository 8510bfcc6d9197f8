// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use log::{debug, info};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    cookies::Jar,
    error::{Error, Result},
    http::{self, Endpoints},
    session::{Identity, Session},
};

use super::state::AuthState;

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct Details {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "isAdmin", default)]
    is_admin: bool,
}

#[derive(Deserialize)]
struct LoggedIn {
    token: SecretString,
    details: Details,
}

/// Exchanges an email and password for a session. The server answers with the
/// access token in the body and leaves the refresh credential in a cookie.
pub(crate) struct Login {
    http: reqwest::Client,
    endpoints: Endpoints,
    state: Arc<AuthState>,
    jar: Arc<Jar>,
}

impl Login {
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

    /// Signs in. Only administrators get a session; anyone else is turned away
    /// with [`Error::NotAuthorized`], the session stays as it was and the
    /// credential the server handed out is dropped.
    pub(crate) async fn login(&self, email: &str, password: &SecretString) -> Result<Identity> {
        debug!("Logging in as {}", email);
        let resp = self
            .http
            .post(self.endpoints.login()?)
            .json(&Credentials {
                email,
                password: password.expose_secret(),
            })
            .send()
            .await?;
        let logged_in: LoggedIn = http::check(resp).await?.json().await?;

        if !logged_in.details.is_admin {
            info!(
                "User {} signed in but is not an administrator",
                logged_in.details.id
            );
            self.jar.clear();
            return Err(Error::NotAuthorized);
        }

        let session = Session::authenticated(logged_in.details.id, true, logged_in.token);
        let identity = session.identity().cloned().ok_or(Error::LoginRequired)?;
        self.state.set_session(session);
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use secrecy::ExposeSecret as _;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, ResponseTemplate,
    };

    use crate::{cookies::Data, test_support::Harness};

    use super::*;

    fn login(harness: &Harness) -> Login {
        Login::new(
            harness.http.clone(),
            harness.endpoints.clone(),
            Arc::clone(&harness.state),
            Arc::clone(&harness.jar),
        )
    }

    fn password() -> SecretString {
        SecretString::new("hunter22".to_owned())
    }

    #[tokio::test]
    async fn administrator_gets_a_session() -> Result<()> {
        let harness = Harness::start(false).await?;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "a@b.c", "password": "hunter22" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "jwt=refresh-credential; HttpOnly; Path=/")
                    .set_body_json(json!({
                        "token": "tok1",
                        "details": { "_id": "u1", "isAdmin": true },
                    })),
            )
            .expect(1)
            .mount(&harness.server)
            .await;

        let identity = login(&harness).login("a@b.c", &password()).await?;

        assert_eq!(identity.user_id(), "u1");
        assert_eq!(
            harness.state.access_token().map(|t| t.expose_secret().clone()),
            Some("tok1".to_owned())
        );
        assert_ne!(harness.jar.snapshot(), Data::default());
        Ok(())
    }

    #[tokio::test]
    async fn non_administrator_is_refused() -> Result<()> {
        let harness = Harness::start(false).await?;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "jwt=guest-credential; HttpOnly; Path=/")
                    .set_body_json(json!({
                        "token": "tok1",
                        "details": { "_id": "u9", "isAdmin": false },
                    })),
            )
            .expect(1)
            .mount(&harness.server)
            .await;

        let result = login(&harness).login("guest@b.c", &password()).await;

        assert!(matches!(result, Err(Error::NotAuthorized)));
        assert!(harness.state.session().is_logged_out());
        assert_eq!(harness.jar.snapshot(), Data::default());
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_is_reported_as_such() -> Result<()> {
        let harness = Harness::start(false).await?;
        let login = Login::new(
            harness.http.clone(),
            Endpoints::new(url::Url::parse("http://127.0.0.1:9/api/")?),
            Arc::clone(&harness.state),
            Arc::clone(&harness.jar),
        );

        let result = login.login("a@b.c", &password()).await;

        assert!(matches!(result, Err(Error::Unreachable(_))));
        assert!(harness.state.session().is_logged_out());
        Ok(())
    }

    #[tokio::test]
    async fn rejected_credentials_carry_the_server_message() -> Result<()> {
        let harness = Harness::start(false).await?;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "msg": "Wrong password" })),
            )
            .mount(&harness.server)
            .await;

        match login(&harness).login("a@b.c", &password()).await {
            Err(Error::Status { status, message }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message.as_deref(), Some("Wrong password"));
            }
            other => panic!("unexpected login result: {other:?}"),
        }
        assert!(harness.state.session().is_logged_out());
        Ok(())
    }
}
