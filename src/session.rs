// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use secrecy::SecretString;

/// Who is signed in, together with the bearer token that proves it. The token
/// only ever exists alongside a user, so the logged-out state carries neither.
#[derive(Clone, Debug, Default)]
pub(crate) enum Session {
    #[default]
    LoggedOut,
    Authenticated(Identity),
}

impl Session {
    pub(crate) fn authenticated(
        user_id: impl Into<String>,
        is_admin: bool,
        access_token: SecretString,
    ) -> Self {
        Self::Authenticated(Identity {
            user_id: user_id.into(),
            is_admin,
            access_token,
        })
    }

    pub(crate) const fn identity(&self) -> Option<&Identity> {
        match *self {
            Self::LoggedOut => None,
            Self::Authenticated(ref identity) => Some(identity),
        }
    }

    pub(crate) fn access_token(&self) -> Option<&SecretString> {
        self.identity().map(Identity::access_token)
    }

    pub(crate) const fn is_logged_out(&self) -> bool {
        matches!(*self, Self::LoggedOut)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Identity {
    user_id: String,
    is_admin: bool,
    access_token: SecretString,
}

impl Identity {
    pub(crate) fn user_id(&self) -> &str {
        &self.user_id
    }

    pub(crate) const fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub(crate) const fn access_token(&self) -> &SecretString {
        &self.access_token
    }
}
