//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use clearair_core::Credentials;

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "CLEARAIR_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, context: &SessionContext) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    context
        .pipeline()?
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", credentials.email());
    output::field("API", context.api().as_str());

    Ok(())
}
