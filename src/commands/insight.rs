// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::context::AppContext;
use crate::insight::InsightClient;
use anyhow::Result;

pub fn handle(ctx: &AppContext, cfg: &Config) -> Result<()> {
    let client = InsightClient::from_config(cfg)?;
    println!("{}", client.describe(ctx.transactions(), ctx.categories()));
    Ok(())
}
