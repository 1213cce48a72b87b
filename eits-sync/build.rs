//! Build script for eits-sync
//!
//! Exports `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE`, which `main`
//! prints in the startup banner so a log can be traced to the binary that
//! wrote it. Outside a git checkout the hash is "unknown".

use std::process::Command;

fn git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}

fn main() {
    let timestamp = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false);

    for (name, value) in [
        ("GIT_HASH", git_hash().unwrap_or_else(|| "unknown".to_string())),
        ("BUILD_TIMESTAMP", timestamp),
        (
            "BUILD_PROFILE",
            std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
    ] {
        println!("cargo:rustc-env={}={}", name, value);
    }
}
