// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::error::Result;

use super::Context;

/// Show who is signed in.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let identity = ctx.gate.admit().await?;
        println!("User:           {}", identity.user_id());
        println!("Administrator:  {}", identity.is_admin());
        println!("Stay signed in: {}", ctx.state.persist());
        Ok(())
    }
}
