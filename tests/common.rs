use gh_selfupdate::Platform;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// Each integration test binary uses a different subset of these helpers.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub config_path: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.json");
        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_gh-selfupdate"));

        Self {
            _temp_dir: temp_dir,
            config_path,
            bin_path,
        }
    }

    /// Command isolated from the user's config, tokens and git config.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("GH_SELFUPDATE_CONFIG", &self.config_path);
        cmd.env("HOME", self._temp_dir.path());
        cmd.env("XDG_CONFIG_HOME", self._temp_dir.path().join("config"));
        cmd.env_remove("GITHUB_TOKEN");
        cmd.env_remove("GH_SELFUPDATE_ENTERPRISE_BASE_URL");
        cmd.env_remove("GH_SELFUPDATE_ENTERPRISE_UPLOAD_URL");
        cmd.env_remove("GH_SELFUPDATE_FILTERS");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self._temp_dir.path().join(name)
    }
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.status.success(),
            "Command unexpectedly succeeded\nstdout: {}",
            self.stdout
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// `tool_<os>_<arch><ext>` for the platform the tests run on.
#[allow(dead_code)]
pub fn asset_name(ext: &str) -> String {
    let platform = Platform::current();
    format!("tool_{}_{}{}", platform.os, platform.arch, ext)
}

/// A release in the shape returned by the GitHub releases API.
#[allow(dead_code)]
pub fn release_json(tag: &str, draft: bool, prerelease: bool, assets: &[(u64, &str)]) -> Value {
    let assets: Vec<Value> = assets
        .iter()
        .map(|(id, name)| {
            json!({
                "id": id,
                "name": name,
                "browser_download_url": format!("https://example.com/download/{}/{}", tag, name),
                "size": 1024,
            })
        })
        .collect();
    json!({
        "tag_name": tag,
        "name": format!("Release {}", tag),
        "draft": draft,
        "prerelease": prerelease,
        "published_at": "2024-05-01T12:00:00Z",
        "body": format!("Changes in {}", tag),
        "html_url": format!("https://example.com/owner/tool/releases/tag/{}", tag),
        "assets": assets,
    })
}
