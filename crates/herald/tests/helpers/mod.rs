#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use snapbox::{
    Assert,
    cmd::{Command, cargo_bin},
};
use tempfile::TempDir;

/// Every variable `herald` reads, so the developer's (or CI's) environment can't leak in.
const HERALD_VARS: &[&str] = &[
    "OWNER_ARNS_NAME",
    "TOTAL_APPS",
    "ARNS_GATEWAY",
    "DEPLOY_FILE_PATH",
    "DEPLOY_FILE_SIZE",
    "DEPLOY_DURATION_MS",
    "DEPLOY_FAILED",
    "DEPLOY_TX_ID",
    "SOCIAL_DM_RECIPIENT",
    "HERALD_ANNOUNCE_MODE",
    "TWITTER_ACCESS_TOKEN",
    "TWITTER_BEARER_TOKEN",
    "TWITTER_API_URL",
    "DISCORD_WEBHOOK_URL",
    "GITHUB_TOKEN",
    "GH_TOKEN",
    "GITHUB_REPOSITORY",
    "GITHUB_API_URL",
];

/// A closed local port: connections fail immediately instead of timing out.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// `herald`, run in an empty directory (outside any git repository) with a clean environment.
pub fn herald(working_dir: &TempDir) -> Command {
    let mut command = Command::new(cargo_bin!("herald"))
        .current_dir(working_dir.path())
        .env("NO_COLOR", "1")
        .with_assert(Assert::new().action_env("SNAPSHOTS"));
    for name in HERALD_VARS {
        command = command.env_remove(name);
    }
    command
}

pub fn working_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

pub fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
