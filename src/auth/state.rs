// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use futures_util::lock::Mutex;
use log::debug;
use secrecy::SecretString;
use tokio::sync::watch;

use crate::{error::Result, preference::Preference, session::Session};

/// Holds the current session and the "stay signed in" flag. It is the only
/// writer of either; everyone else reads through it or subscribes to it.
pub(crate) struct AuthState {
    session: watch::Sender<Session>,
    persist: watch::Sender<bool>,
    preference: Mutex<Preference>,
}

impl AuthState {
    /// Starts logged out, with the flag as last written to `preference`.
    pub(crate) async fn load(mut preference: Preference) -> Result<Self> {
        let persist = preference.load().await?;
        debug!("Loaded stay-signed-in preference: {}", persist);
        Ok(Self {
            session: watch::Sender::new(Session::LoggedOut),
            persist: watch::Sender::new(persist),
            preference: Mutex::new(preference),
        })
    }

    pub(crate) fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub(crate) fn access_token(&self) -> Option<SecretString> {
        self.session.borrow().access_token().cloned()
    }

    /// Replaces the session as a whole. Readers see either the previous value
    /// or this one, never a mix.
    pub(crate) fn set_session(&self, session: Session) {
        let _previous = self.session.send_replace(session);
    }

    pub(crate) fn clear_session(&self) {
        self.set_session(Session::LoggedOut);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub(crate) fn persist(&self) -> bool {
        *self.persist.borrow()
    }

    /// Writes the flag through to durable storage, then changes it. A failed
    /// write leaves the flag as it was.
    pub(crate) async fn set_persist(&self, persist: bool) -> Result<()> {
        let mut preference = self.preference.lock().await;
        preference.store(persist).await?;
        let _previous = self.persist.send_replace(persist);
        Ok(())
    }
}
