// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use futures_util::lock::Mutex;
use log::debug;

use crate::{
    error::{Error, Result},
    session::Identity,
};

use super::{refresh::Refresh, state::AuthState};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Bootstrap {
    Pending,
    Authenticated,
    Unauthenticated,
}

/// Decides, once per process, whether a previous session can be picked back
/// up before anything that needs one runs.
pub(crate) struct Gate {
    state: Arc<AuthState>,
    refresher: Arc<dyn Refresh>,
    status: Mutex<Bootstrap>,
}

impl Gate {
    pub(crate) fn new(state: Arc<AuthState>, refresher: Arc<dyn Refresh>) -> Self {
        Self {
            state,
            refresher,
            status: Mutex::new(Bootstrap::Pending),
        }
    }

    /// Runs the bootstrap the first time it is called and returns the state it
    /// settled in. Later calls, including concurrent ones, wait for and reuse
    /// that outcome.
    pub(crate) async fn resolve(&self) -> Bootstrap {
        let mut status = self.status.lock().await;
        if *status == Bootstrap::Pending {
            *status = self.bootstrap().await;
        }
        *status
    }

    async fn bootstrap(&self) -> Bootstrap {
        if !self.state.persist() {
            debug!("Not staying signed in; skipping session refresh");
            return Bootstrap::Unauthenticated;
        }

        match self.refresher.refresh().await {
            Ok(_) => {
                debug!("Picked up the previous session");
                Bootstrap::Authenticated
            }
            Err(e) => {
                debug!("Could not pick up the previous session: {}", e);
                self.state.clear_session();
                Bootstrap::Unauthenticated
            }
        }
    }

    /// Lets a caller through only once bootstrap has settled and an
    /// administrator is signed in.
    pub(crate) async fn admit(&self) -> Result<Identity> {
        let _settled = self.resolve().await;
        match self.state.session().identity() {
            Some(identity) if identity.is_admin() => Ok(identity.clone()),
            Some(identity) => {
                debug!(
                    "User {} is signed in but is not an administrator",
                    identity.user_id()
                );
                Err(Error::LoginRequired)
            }
            None => Err(Error::LoginRequired),
        }
    }
}
