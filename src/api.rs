// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Method, Response, StatusCode};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;

use crate::{
    auth::{refresh::Refresh, state::AuthState},
    client::{self, Product, ProductInput},
    error::{Error, Result},
    http::{self, Endpoints},
};

#[derive(Clone, Debug)]
pub(crate) struct Request {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
}

impl Request {
    pub(crate) fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub(crate) fn with_json<T: serde::Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// One request on its way through [`Api::send`]. The `retried` flag is what
/// stops a 401 from turning into a refresh loop.
struct Outgoing {
    req: Request,
    token: Option<SecretString>,
    retried: bool,
}

impl Outgoing {
    const fn new(req: Request) -> Self {
        Self {
            req,
            token: None,
            retried: false,
        }
    }

    /// Marks the request as retried, returning whether it had not been before.
    fn claim_retry(&mut self) -> bool {
        !std::mem::replace(&mut self.retried, true)
    }
}

/// The authenticated side of the HTTP client. Requests carry whatever access
/// token the session holds when they are sent.
pub(crate) struct Api {
    http: reqwest::Client,
    endpoints: Endpoints,
    state: Arc<AuthState>,
    refresher: Arc<dyn Refresh>,
}

impl Api {
    pub(crate) fn new(
        http: reqwest::Client,
        endpoints: Endpoints,
        state: Arc<AuthState>,
        refresher: Arc<dyn Refresh>,
    ) -> Self {
        Self {
            http,
            endpoints,
            state,
            refresher,
        }
    }

    /// Sends `req`. A 401 is answered by one refresh and one resend with the
    /// new token; whatever happens after that goes back to the caller. A 403
    /// anywhere ends the session.
    pub(crate) async fn send(&self, req: Request) -> Result<Response> {
        let mut outgoing = Outgoing::new(req);
        loop {
            let token = outgoing.token.clone().or_else(|| self.state.access_token());
            match self.dispatch(&outgoing.req, token.as_ref()).await {
                Err(e) if e.status() == Some(StatusCode::UNAUTHORIZED) && outgoing.claim_retry() => {
                    debug!(
                        "{} {} was unauthorized; refreshing the access token",
                        outgoing.req.method, outgoing.req.path
                    );
                    match self.refresher.refresh().await {
                        Ok(fresh) => outgoing.token = Some(fresh),
                        Err(e) => return self.settle(Err(e)),
                    }
                }
                result => return self.settle(result),
            }
        }
    }

    async fn dispatch(&self, req: &Request, token: Option<&SecretString>) -> Result<Response> {
        let mut builder = self
            .http
            .request(req.method.clone(), self.endpoints.join(&req.path)?);
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = req.body.as_ref() {
            builder = builder.json(body);
        }
        http::check(builder.send().await?).await
    }

    fn settle(&self, result: Result<Response>) -> Result<Response> {
        match result {
            Err(e) if e.status() == Some(StatusCode::FORBIDDEN) => {
                warn!("The server refused this session ({}); signing out", e);
                self.state.clear_session();
                Err(Error::SessionExpired)
            }
            other => other,
        }
    }
}

#[async_trait]
pub(crate) trait Executor: TryInto<Request, Error = Error> + Send + Sized {
    type Response: for<'de> Deserialize<'de> + Send;

    async fn execute(self, api: &Api) -> Result<Self::Response> {
        let resp = api.send(self.try_into()?).await?;
        Ok(resp.json().await?)
    }
}

pub(crate) struct ListProducts;

impl TryFrom<ListProducts> for Request {
    type Error = Error;

    fn try_from(_: ListProducts) -> Result<Self> {
        Ok(Self::new(Method::GET, "products"))
    }
}

impl Executor for ListProducts {
    type Response = Vec<Product>;
}

pub(crate) struct CreateProduct {
    pub(crate) product: ProductInput,
}

impl TryFrom<CreateProduct> for Request {
    type Error = Error;

    fn try_from(value: CreateProduct) -> Result<Self> {
        Self::new(Method::POST, "products").with_json(&value.product)
    }
}

impl Executor for CreateProduct {
    type Response = Product;
}

pub(crate) struct UpdateProduct {
    pub(crate) id: String,
    pub(crate) product: ProductInput,
}

impl TryFrom<UpdateProduct> for Request {
    type Error = Error;

    fn try_from(value: UpdateProduct) -> Result<Self> {
        Self::new(Method::PUT, format!("products/{}", value.id)).with_json(&value.product)
    }
}

impl Executor for UpdateProduct {
    type Response = Product;
}

pub(crate) struct DeleteProduct {
    pub(crate) id: String,
}

impl TryFrom<DeleteProduct> for Request {
    type Error = Error;

    fn try_from(value: DeleteProduct) -> Result<Self> {
        Ok(Self::new(Method::DELETE, format!("products/{}", value.id)))
    }
}

#[async_trait]
impl Executor for DeleteProduct {
    type Response = ();

    async fn execute(self, api: &Api) -> Result<()> {
        // The body, if any, is just a confirmation message.
        let _resp = api.send(self.try_into()?).await?;
        Ok(())
    }
}

#[async_trait]
impl client::Client for Api {
    async fn list_products(&self) -> Result<Vec<Product>> {
        ListProducts.execute(self).await
    }

    async fn create_product(&self, product: ProductInput) -> Result<Product> {
        CreateProduct { product }.execute(self).await
    }

    async fn update_product(&self, id: &str, product: ProductInput) -> Result<Product> {
        UpdateProduct {
            id: id.to_owned(),
            product,
        }
        .execute(self)
        .await
    }

    async fn delete_product(&self, id: &str) -> Result<()> {
        DeleteProduct { id: id.to_owned() }.execute(self).await
    }
}
