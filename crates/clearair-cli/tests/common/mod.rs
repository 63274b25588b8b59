use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;
use tokio::process::Command;

/// An isolated session file for one test.
pub struct Sandbox {
    _dir: TempDir,
    session_file: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let session_file = dir.path().join("session.json");
        Self {
            _dir: dir,
            session_file,
        }
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }
}

/// Run the CLI binary against `api` with the sandbox's session file.
pub async fn run_cli(sandbox: &Sandbox, api: &str, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_clearair"))
        .args(args)
        .arg("--api")
        .arg(api)
        .arg("--session-file")
        .arg(sandbox.session_file())
        .env_remove("CLEARAIR_API")
        .env_remove("CLEARAIR_SESSION_FILE")
        .env_remove("CLEARAIR_PASSWORD")
        .env("NO_COLOR", "1")
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(sandbox: &Sandbox, api: &str, args: &[&str]) -> String {
    let output = run_cli(sandbox, api, args).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(sandbox: &Sandbox, api: &str, args: &[&str]) -> String {
    let output = run_cli(sandbox, api, args).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
