//! Stamps the binary with the values served by `/api/buildinfo` and logged at
//! startup: `GIT_HASH`, `BUILD_TIMESTAMP`, `BUILD_PROFILE`.
//!
//! No `rerun-if-changed` directives are emitted, so Cargo reruns this on
//! every build and the stamp stays current.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

/// Short commit id, suffixed `-dirty` when the worktree has local edits
fn git_hash() -> String {
    let Some(hash) = git(&["rev-parse", "--short=8", "HEAD"]) else {
        return "unknown".to_string();
    };
    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{}-dirty", hash),
        _ => hash,
    }
}

/// RFC 3339 local time, or `SOURCE_DATE_EPOCH` for reproducible builds
fn build_timestamp() -> String {
    let pinned = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0));

    match pinned {
        Some(utc) => utc.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        None => chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
    }
}

fn main() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp());
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}
