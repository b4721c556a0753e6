//! Embeds the build version as `STACK_STARTER_VERSION`.
use std::process::Command;

fn main() {
    // Release pipelines export STACK_STARTER_VERSION; local builds use git describe.
    if let Ok(version) = std::env::var("STACK_STARTER_VERSION") {
        println!("cargo:rustc-env=STACK_STARTER_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !version.is_empty() {
            println!("cargo:rustc-env=STACK_STARTER_VERSION={version}");
        }
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=STACK_STARTER_VERSION");
}
