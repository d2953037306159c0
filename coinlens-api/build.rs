//! Build script for coinlens-api
//!
//! Exports the build identification printed in the startup banner:
//! `GIT_HASH`, `BUILD_TIMESTAMP` (UTC, honours `SOURCE_DATE_EPOCH`) and
//! `BUILD_PROFILE`.

use std::process::Command;

use chrono::{DateTime, SecondsFormat, Utc};

/// Run git in the package directory, returning trimmed stdout on success
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn build_timestamp() -> String {
    let stamp = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    stamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn main() {
    // "<hash>-dirty" when the working tree has local changes
    let git_hash = git(&["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp());
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
        println!("cargo:rerun-if-changed={}/HEAD", git_dir);
        println!("cargo:rerun-if-changed={}/index", git_dir);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
