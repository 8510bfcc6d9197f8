// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    missing_doc_code_examples,
    private_doc_tests,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod api;
mod auth;
mod client;
mod command;
mod cookies;
mod error;
mod http;
mod metadata;
mod password;
mod preference;
mod session;
mod storage;
#[cfg(test)]
mod test_support;
mod validation;

use std::{num::NonZeroU64, path::PathBuf, process, sync::Arc, time::Duration};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use error::Result;
use log::{debug, error, warn};
use url::Url;

use crate::{
    api::Api,
    auth::{
        gate::Gate,
        login::Login,
        logout::Logout,
        refresh::{Refresh, TokenRefresher},
        state::AuthState,
    },
    cookies::Persisted,
    http::Endpoints,
    preference::Preference,
};

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Command),
    Logout(command::logout::Command),
    Whoami(command::whoami::Command),
    #[command(subcommand)]
    Products(command::products::Command),
    Qr(command::qr::Command),
}

#[async_trait]
impl command::Command for Command {
    async fn execute(self, ctx: &command::Context) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(ctx).await,
            Self::Logout(cmd) => cmd.execute(ctx).await,
            Self::Whoami(cmd) => cmd.execute(ctx).await,
            Self::Products(cmd) => cmd.execute(ctx).await,
            Self::Qr(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the menu API.
    #[arg(long, env = "MENUCTL_URL", default_value = "http://127.0.0.1:3000/api/", value_parser = Url::parse)]
    url: Url,

    /// The URL of the public menu site, which serves static assets like the QR
    /// code. Defaults to the origin of the API URL.
    #[arg(long, env = "MENUCTL_SITE_URL", value_parser = Url::parse)]
    site_url: Option<Url>,

    /// How long to wait for the server before giving up, in seconds.
    #[arg(long, env = "MENUCTL_TIMEOUT", default_value = "30")]
    timeout: NonZeroU64,

    /// The path to the Pinentry program to use when asking for the password.
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pinentry_program: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

fn site_url(args: &Args) -> Result<Url> {
    match args.site_url.as_ref() {
        Some(site) => Ok(Endpoints::new(site.clone()).base().clone()),
        None => Ok(args.url.join("/")?),
    }
}

async fn run(args: Args) -> Result<()> {
    let prompt: Vec<Box<dyn password::Prompt>> = vec![
        Box::new(args.pinentry_program.clone().map_or_else(
            password::PinentryPrompt::new,
            password::PinentryPrompt::new_with_executable,
        )),
        Box::new(password::RpasswordPrompt),
    ];

    let state = Arc::new(
        AuthState::load(Preference::new(storage::open(preference::FILE_NAME))).await?,
    );
    let mut persisted = Persisted::open(storage::open(cookies::FILE_NAME)).await?;
    let jar = persisted.jar();

    let http = http::client(Arc::clone(&jar), Duration::from_secs(args.timeout.get()))?;
    let endpoints = Endpoints::new(args.url.clone());
    let site = site_url(&args)?;
    debug!("Using API at {} and site at {}", endpoints.base(), site);

    let refresher: Arc<dyn Refresh> = Arc::new(TokenRefresher::new(
        http.clone(),
        endpoints.clone(),
        Arc::clone(&state),
    ));
    let ctx = command::Context {
        state: Arc::clone(&state),
        gate: Gate::new(Arc::clone(&state), Arc::clone(&refresher)),
        api: Api::new(
            http.clone(),
            endpoints.clone(),
            Arc::clone(&state),
            refresher,
        ),
        login: Login::new(
            http.clone(),
            endpoints.clone(),
            Arc::clone(&state),
            Arc::clone(&jar),
        ),
        logout: Logout::new(http.clone(), endpoints, Arc::clone(&state), jar),
        prompt: Box::new(prompt),
        http,
        site,
    };

    let result = command::Command::execute(args.command, &ctx).await;
    if let Err(e) = persisted.save(state.persist()).await {
        warn!("Could not save the session credentials: {}", e);
    }

    result
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("MENUCTL_LOG", "warn")
        .write_style("MENUCTL_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
