//! Subcommand implementations.

mod login;
mod logout;
mod refresh_token;
mod request;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use crate::session::SessionContext;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store a session
    Login(login::LoginArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Send an authenticated request
    Request(request::RequestArgs),

    /// Exchange the refresh token for a new pair
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Sign out and forget the session
    Logout(logout::LogoutArgs),
}

pub async fn handle(command: Command, context: &SessionContext) -> Result<()> {
    match command {
        Command::Login(args) => login::run(args, context).await,
        Command::Whoami(args) => whoami::run(args, context),
        Command::Request(args) => request::run(args, context).await,
        Command::RefreshToken(args) => refresh_token::run(args, context).await,
        Command::Logout(args) => logout::run(args, context).await,
    }
}
