// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{fs, path::PathBuf};

use async_trait::async_trait;
use clap::Parser;
use log::debug;
use url::Url;

use crate::{error::Result, http};

use super::Context;

const IMAGE: &str = "golfo-nuevo-qr.webp";

/// Download the QR code that links to the public menu.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// Where to save the image.
    #[arg(
        short,
        long,
        default_value = "qr-menu-golfo-nuevo.webp",
        value_hint = clap::ValueHint::FilePath
    )]
    output: PathBuf,
}

async fn download(client: &reqwest::Client, site: &Url) -> Result<Vec<u8>> {
    let url = site.join(IMAGE)?;
    debug!("Downloading {}", url);
    let resp = http::check(client.get(url).send().await?).await?;
    Ok(resp.bytes().await?.to_vec())
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let _identity = ctx.gate.admit().await?;
        let image = download(&ctx.http, &ctx.site).await?;
        fs::write(&self.output, &image)?;
        println!("Saved {} bytes to {}", image.len(), self.output.display());
        Ok(())
    }
}
