//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, context: &SessionContext) -> Result<()> {
    context
        .pipeline()?
        .logout()
        .await
        .context("Failed to clear session")?;

    output::success("Logged out");

    Ok(())
}
