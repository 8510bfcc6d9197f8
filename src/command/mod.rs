// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::{
    api::Api,
    auth::{gate::Gate, login::Login, logout::Logout, state::AuthState},
    error::Result,
    password::Prompt,
};

pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod products;
pub(crate) mod qr;
pub(crate) mod whoami;

/// Everything a command may need, built once per run.
pub(crate) struct Context {
    pub(crate) state: Arc<AuthState>,
    pub(crate) gate: Gate,
    pub(crate) api: Api,
    pub(crate) login: Login,
    pub(crate) logout: Logout,
    pub(crate) prompt: Box<dyn Prompt>,
    pub(crate) http: reqwest::Client,
    pub(crate) site: Url,
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, ctx: &Context) -> Result<()>;
}
