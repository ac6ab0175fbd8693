use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn main() {
    let commit = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let branch = git(&["branch", "--show-current"]).unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GH_SELFUPDATE_GIT_COMMIT={}", commit);
    println!("cargo:rustc-env=GH_SELFUPDATE_GIT_BRANCH={}", branch);

    // Only the first tag is used when HEAD carries several
    if let Some(tag) = git(&["tag", "--points-at", "HEAD"]).and_then(|t| t.lines().next().map(str::to_string)) {
        println!("cargo:rustc-env=GH_SELFUPDATE_GIT_TAG={}", tag);
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
}
