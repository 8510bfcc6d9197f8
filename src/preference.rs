// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The durable "stay signed in" flag.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{error::Result, storage};

pub(crate) const FILE_NAME: &str = "preferences.json";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Data {
    persist: bool,
}

pub(crate) struct Preference {
    storage: Box<dyn storage::Storage<Data>>,
}

impl Preference {
    pub(crate) fn new(storage: Box<dyn storage::Storage<Data>>) -> Self {
        Self { storage }
    }

    /// Reads the flag, treating a missing or never-written value as `false`.
    pub(crate) async fn load(&mut self) -> Result<bool> {
        Ok(self.storage.get().await?.is_some_and(|data| data.persist))
    }

    pub(crate) async fn store(&mut self, persist: bool) -> Result<()> {
        if persist && !storage::IsPersistent::is_persistent(&self.storage) {
            warn!("Staying signed in was requested, but there is nowhere durable to remember it");
        }
        self.storage.update(&Data { persist }).await
    }
}
