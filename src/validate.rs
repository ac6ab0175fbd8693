//! Companion-file validation of downloaded assets.

use sha2::{Digest, Sha256};

/// Checks a downloaded asset against a companion file published next to it,
/// such as `tool_linux_amd64.tar.gz.sha256`.
pub trait Validator: Send + Sync {
    /// Appended to the asset name to find the companion file.
    fn suffix(&self) -> &str;

    /// `Err` carries a human readable reason.
    fn validate(&self, asset: &[u8], validation: &[u8]) -> Result<(), String>;
}

/// Validates against a hex SHA-256 digest.
///
/// Accepts a bare digest or `sha256sum` output (`<digest>  <file name>`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Validator;

impl Validator for Sha256Validator {
    fn suffix(&self) -> &str {
        ".sha256"
    }

    fn validate(&self, asset: &[u8], validation: &[u8]) -> Result<(), String> {
        let text = std::str::from_utf8(validation)
            .map_err(|_| "checksum file is not valid UTF-8".to_string())?;
        let expected = text
            .split_whitespace()
            .next()
            .ok_or_else(|| "checksum file is empty".to_string())?
            .to_ascii_lowercase();
        let actual = hex::encode(Sha256::digest(asset));
        if actual == expected {
            Ok(())
        } else {
            Err(format!(
                "SHA-256 mismatch: expected {}, got {}",
                expected, actual
            ))
        }
    }
}
