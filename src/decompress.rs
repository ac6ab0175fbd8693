use crate::error::{Error, Result};
use crate::platform::{Os, Platform};
use flate2::read::GzDecoder;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tar::Archive;
use walkdir::WalkDir;
use xz2::read::XzDecoder;

/// Unpack a downloaded asset and return the path of the command inside it.
///
/// Archives (`.zip`, `.tar.gz`, `.tgz`, `.tar.xz`) are unpacked into
/// `extract_dir` and searched for `cmd`. Single-file compression (`.gz`,
/// `.gzip`, `.xz`) is decoded to `extract_dir/cmd`. Anything else is taken to
/// be the executable itself.
pub fn extract_command(
    asset_path: &Path,
    extract_dir: &Path,
    cmd: &str,
    platform: Platform,
) -> Result<PathBuf> {
    let asset_name = asset_path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let fail = |reason: String| Error::Decompress {
        archive: asset_name.clone(),
        reason,
    };

    fs::create_dir_all(extract_dir)?;

    if asset_name.ends_with(".zip") {
        tracing::info!("Extracting {}...", asset_name);
        extract_zip(asset_path, extract_dir).map_err(fail)?;
    } else if asset_name.ends_with(".tar.gz") || asset_name.ends_with(".tgz") {
        tracing::info!("Extracting {}...", asset_name);
        let decoder = GzDecoder::new(fs::File::open(asset_path)?);
        Archive::new(decoder)
            .unpack(extract_dir)
            .map_err(|e| fail(e.to_string()))?;
    } else if asset_name.ends_with(".tar.xz") {
        tracing::info!("Extracting {}...", asset_name);
        let decoder = XzDecoder::new(fs::File::open(asset_path)?);
        Archive::new(decoder)
            .unpack(extract_dir)
            .map_err(|e| fail(e.to_string()))?;
    } else if asset_name.ends_with(".gz") || asset_name.ends_with(".gzip") {
        let decoder = GzDecoder::new(fs::File::open(asset_path)?);
        return decode_single(decoder, &extract_dir.join(binary_name(cmd, platform)))
            .map_err(|e| fail(e.to_string()));
    } else if asset_name.ends_with(".xz") {
        let decoder = XzDecoder::new(fs::File::open(asset_path)?);
        return decode_single(decoder, &extract_dir.join(binary_name(cmd, platform)))
            .map_err(|e| fail(e.to_string()));
    } else {
        tracing::debug!("{} is not compressed", asset_name);
        return Ok(asset_path.to_path_buf());
    }

    find_command(extract_dir, cmd, platform).ok_or_else(|| {
        fail(format!(
            "could not find executable '{}' in extracted archive",
            cmd
        ))
    })
}

fn binary_name(cmd: &str, platform: Platform) -> String {
    if platform.is_windows() && !cmd.ends_with(".exe") {
        format!("{}.exe", cmd)
    } else {
        cmd.to_string()
    }
}

fn decode_single<R: Read>(mut decoder: R, out_path: &Path) -> io::Result<PathBuf> {
    let mut out = fs::File::create(out_path)?;
    io::copy(&mut decoder, &mut out)?;
    Ok(out_path.to_path_buf())
}

fn extract_zip(archive_path: &Path, extract_dir: &Path) -> std::result::Result<(), String> {
    let file = fs::File::open(archive_path).map_err(|e| e.to_string())?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| e.to_string())?;
        let Some(relative) = file.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!("Skipping malicious path in zip: {}", file.name());
            continue;
        };
        let outpath = extract_dir.join(relative);

        if file.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| e.to_string())?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).map_err(|e| e.to_string())?;
            }
            let mut outfile = fs::File::create(&outpath).map_err(|e| e.to_string())?;
            io::copy(&mut file, &mut outfile).map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

/// Names an unpacked command may carry: `cmd`, `cmd_<os>_<arch>` and
/// `cmd-<os>-<arch>`, with `.exe` on Windows.
fn command_names(cmd: &str, platform: Platform) -> Vec<String> {
    let base = cmd.trim_end_matches(".exe");
    let mut names = vec![base.to_string()];
    for sep in ['_', '-'] {
        names.push(format!("{}{}{}{}{}", base, sep, platform.os, sep, platform.arch));
    }
    if platform.os == Os::Windows {
        names = names.into_iter().map(|n| format!("{}.exe", n)).collect();
    }
    names
}

fn find_command(extract_dir: &Path, cmd: &str, platform: Platform) -> Option<PathBuf> {
    let names = command_names(cmd, platform);

    let found = WalkDir::new(extract_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| names.iter().any(|n| e.file_name().to_string_lossy() == n.as_str()))
        .min_by_key(|e| e.depth())
        .map(|e| e.into_path());

    if let Some(path) = &found {
        tracing::debug!("Found executable in archive: {}", path.display());
    }
    found
}
