// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    // Re-run build script if git HEAD changes
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=NAKAMA_BOOTH_VERSION");

    // Packagers can pin the version explicitly
    let version = std::env::var("NAKAMA_BOOTH_VERSION").unwrap_or_else(|_| git_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Crate version, plus the short commit hash when built from a checkout
fn git_version() -> String {
    let package = env!("CARGO_PKG_VERSION");

    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if hash.is_empty() {
                package.to_string()
            } else {
                format!("{}-{}", package, hash)
            }
        }
        _ => package.to_string(),
    }
}
