// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::{debug, error};
use reqwest::StatusCode;

use crate::{
    error::{self, Error, Result},
    password::{Prompt as _, RequestBuilder},
};

use super::Context;

const ATTEMPTS: usize = 3;

/// Log in as an administrator.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The email address of the account.
    #[arg(short, long, env = "MENUCTL_EMAIL")]
    email: String,

    /// Keep the session across runs until `menuctl logout`.
    #[arg(long, overrides_with = "no_stay_signed_in")]
    stay_signed_in: bool,

    /// Forget the session when this run ends.
    #[arg(long, overrides_with = "stay_signed_in")]
    no_stay_signed_in: bool,
}

impl Command {
    const fn stay_signed_in(&self) -> Option<bool> {
        match (self.stay_signed_in, self.no_stay_signed_in) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            (false, false) => None,
        }
    }
}

fn session_hint(persist: bool) -> &'static str {
    if persist {
        "You will stay signed in until you log out."
    } else {
        "This session ends when menuctl exits. Log in with --stay-signed-in to keep it for later commands."
    }
}

/// Whether a failed login is worth asking for the password again.
fn is_rejection(e: &Error) -> bool {
    matches!(
        e.status(),
        Some(StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND)
    )
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &Context) -> Result<()> {
        if let Some(persist) = self.stay_signed_in() {
            ctx.state.set_persist(persist).await?;
        }

        let mut last_error: Option<String> = None;
        for attempt in 1..=ATTEMPTS {
            let mut req = RequestBuilder::new(&self.email);
            if let Some(e) = last_error.as_deref() {
                req = req.with_error(e);
            }
            let password = ctx
                .prompt
                .prompt(req.into_request())
                .await?
                .ok_or(error::Password::NoPrompt)?;

            match ctx.login.login(&self.email, &password).await {
                Ok(identity) => {
                    println!("Logged in as {}", identity.user_id());
                    println!("{}", session_hint(ctx.state.persist()));
                    return Ok(());
                }
                Err(e) if attempt < ATTEMPTS && is_rejection(&e) => {
                    debug!("Login attempt {} was rejected: {}", attempt, e);
                    last_error = Some(match e {
                        Error::Status {
                            message: Some(message),
                            ..
                        } => message,
                        other => other.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        error!("Giving up after {} login attempts", ATTEMPTS);
        Err(Error::Command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stay_signed_in_is_tri_state() {
        let parse = |args: &[&str]| {
            Command::try_parse_from(["login", "--email", "a@b.c"].iter().chain(args.iter()))
                .map(|cmd| cmd.stay_signed_in())
        };

        assert_eq!(parse(&[]).ok(), Some(None));
        assert_eq!(parse(&["--stay-signed-in"]).ok(), Some(Some(true)));
        assert_eq!(parse(&["--no-stay-signed-in"]).ok(), Some(Some(false)));
        assert_eq!(
            parse(&["--stay-signed-in", "--no-stay-signed-in"]).ok(),
            Some(Some(false))
        );
    }

    #[test]
    fn short_lived_session_points_at_stay_signed_in() {
        assert!(session_hint(false).contains("--stay-signed-in"));
        assert!(!session_hint(true).contains("--stay-signed-in"));
    }

    #[test]
    fn bad_credentials_are_worth_retrying() {
        let rejected = Error::Status {
            status: StatusCode::UNAUTHORIZED,
            message: Some("Wrong password".to_owned()),
        };
        let broken = Error::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };

        assert!(is_rejection(&rejected));
        assert!(!is_rejection(&broken));
        assert!(!is_rejection(&Error::NotAuthorized));
    }
}
