//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub fn run(_args: WhoamiArgs, context: &SessionContext) -> Result<()> {
    let session = context
        .load()?
        .context("No active session. Run 'clearair login' first.")?;

    output::field("API", context.api().as_str());
    output::field("Session file", &context.session_file().display().to_string());
    output::field("Issued at", &session.issued_at.to_rfc3339());

    Ok(())
}
