//! Downloading a detected release and swapping it in for an executable.

use crate::decompress::extract_command;
use crate::error::{Error, Result};
use crate::source::ReleaseSource;
use crate::types::Release;
use crate::updater::Updater;
use semver::Version;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;

impl<S: ReleaseSource> Updater<S> {
    /// Download `release`, validate it when a validator is configured, and
    /// replace the executable at `exe_path` with it.
    pub async fn update_to(&self, release: &Release, exe_path: &Path) -> Result<()> {
        let owner = release.repo_owner();
        let repo = release.repo_name();

        let asset = self
            .source
            .download_asset(owner, repo, release.asset_id())
            .await
            .map_err(|e| Error::Download {
                asset_id: release.asset_id(),
                reason: e.to_string(),
            })?;

        if let Some(validator) = &self.validator {
            let validation_name = format!("{}{}", release.asset_name(), validator.suffix());
            let validation_id = release
                .validation_asset_id()
                .ok_or(Error::ValidationAssetMissing {
                    name: validation_name.clone(),
                })?;
            let validation = self
                .source
                .download_asset(owner, repo, validation_id)
                .await
                .map_err(|e| Error::Download {
                    asset_id: validation_id,
                    reason: e.to_string(),
                })?;
            validator
                .validate(&asset, &validation)
                .map_err(|reason| Error::ValidationFailed {
                    asset: release.asset_name().to_string(),
                    reason,
                })?;
            tracing::info!("Validated {} with {}", release.asset_name(), validation_name);
        }

        let staging = TempDir::new()?;
        let asset_path = staging.path().join(release.asset_name());
        fs::write(&asset_path, &asset)?;

        let cmd = command_name(exe_path)?;
        let new_exe = extract_command(
            &asset_path,
            &staging.path().join("extracted"),
            &cmd,
            self.platform,
        )?;

        replace_executable(&new_exe, exe_path)?;
        tracing::info!(
            "Updated {} to {}",
            exe_path.display(),
            release.version()
        );
        Ok(())
    }

    /// Update the executable at `exe_path` when the latest release is newer
    /// than `current`. Returns the latest release either way.
    pub async fn update_command(
        &self,
        exe_path: &Path,
        current: &Version,
        owner: &str,
        repo: &str,
    ) -> Result<Release> {
        let latest = self.detect_latest(owner, repo).await?;
        if latest.version() <= current {
            tracing::info!("Current binary is the latest version {}", current);
            return Ok(latest);
        }

        tracing::info!(
            "Updating {} from {} to {}",
            exe_path.display(),
            current,
            latest.version()
        );
        self.update_to(&latest, exe_path).await?;
        Ok(latest)
    }

    /// [`update_command`](Self::update_command) on the running executable.
    pub async fn update_self(
        &self,
        current: &Version,
        owner: &str,
        repo: &str,
    ) -> Result<Release> {
        let exe_path = std::env::current_exe()?;
        self.update_command(&exe_path, current, owner, repo).await
    }
}

/// Name of the command inside a release asset, `tool` for both `tool` and
/// `tool.exe`.
fn command_name(exe_path: &Path) -> Result<String> {
    let file_name = command_file_name(exe_path)?;
    if let Some(stem) = file_name.strip_suffix(".exe") {
        return Ok(stem.to_string());
    }
    Ok(file_name)
}

/// Put `new_exe` in place of `target`.
///
/// The new binary is copied next to the target first so the final step is a
/// rename within one directory. If that rename fails the previous binary is
/// moved back.
pub fn replace_executable(new_exe: &Path, target: &Path) -> Result<()> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = command_file_name(target)?;
    let new_path = dir.join(format!(".{}.new", file_name));
    let old_path = dir.join(format!(".{}.old", file_name));

    fs::copy(new_exe, &new_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&new_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&new_path, perms)?;
    }

    if old_path.exists() {
        fs::remove_file(&old_path)?;
    }

    if let Err(e) = fs::rename(target, &old_path) {
        let _ = fs::remove_file(&new_path);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&new_path, target) {
        tracing::warn!("Could not move new executable into place, restoring: {}", e);
        fs::rename(&old_path, target)?;
        let _ = fs::remove_file(&new_path);
        return Err(e.into());
    }

    if cfg!(windows) {
        // A running image cannot be deleted on Windows; the next update removes it.
        tracing::debug!("Leaving previous executable at {}", old_path.display());
    } else if let Err(e) = fs::remove_file(&old_path) {
        tracing::warn!("Could not remove {}: {}", old_path.display(), e);
    }

    Ok(())
}

fn command_file_name(target: &Path) -> Result<String> {
    target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file path", target.display()),
            ))
        })
}
