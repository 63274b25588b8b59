//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, context: &SessionContext) -> Result<()> {
    context
        .load()?
        .context("No active session. Run 'clearair login' first.")?;

    eprintln!("{}", "Refreshing session...".dimmed());

    context
        .pipeline()?
        .refresh_now()
        .await
        .context("Failed to refresh session")?;

    let session = context
        .load()?
        .context("Session disappeared after refresh")?;

    output::success("Session refreshed successfully");
    output::field("Issued at", &session.issued_at.to_rfc3339());

    Ok(())
}
