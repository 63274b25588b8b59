//! Request command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use clearair_core::{Method, RequestDescriptor};

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: Method,

    /// Path relative to the API base URL (e.g., /progress/streak)
    pub path: String,

    /// JSON request body
    #[arg(long, short)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short, value_parser = parse_query)]
    pub query: Vec<(String, String)>,

    /// Extra header as "Name: value" (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

pub async fn run(args: RequestArgs, context: &SessionContext) -> Result<()> {
    let mut request = RequestDescriptor::new(args.method, &args.path);
    for (key, value) in args.query {
        request = request.query(key, value);
    }
    for (name, value) in args.headers {
        request = request.header(name, value);
    }
    if let Some(data) = &args.data {
        let body: serde_json::Value =
            serde_json::from_str(data).context("Request body is not valid JSON")?;
        request = request.json(&body)?;
    }

    let response = context
        .pipeline()?
        .send(request)
        .await
        .context("Request failed")?;

    eprintln!("{}", format!("HTTP {}", response.status).dimmed());

    match response.json::<serde_json::Value>() {
        Ok(value) => output::json_pretty(&value)?,
        Err(_) if response.body.is_empty() => {}
        Err(_) => println!("{}", response.text()),
    }

    if !response.is_success() {
        bail!("Server responded with status {}", response.status);
    }

    Ok(())
}

fn parse_query(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

fn parse_header(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{}'", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
