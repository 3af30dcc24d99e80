//! Destination directory resolution (pipeline stage 1)

use super::platform::{Platform, PlatformProvider};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve `<home>/<subdir>` for the current platform and make sure it exists
///
/// # Errors
///
/// - [`Error::UnsupportedPlatform`] when the platform has no home variable;
///   nothing is created in that case
/// - [`Error::HomeNotSet`] when the home variable is missing or empty
/// - [`Error::Destination`] when the directory cannot be used or created
pub async fn resolve_destination(platform: &dyn PlatformProvider, subdir: &str) -> Result<PathBuf> {
    let home = home_directory(platform)?;
    let dir = std::path::absolute(home.join(subdir)).map_err(|e| Error::Destination {
        path: home.join(subdir),
        reason: e.to_string(),
    })?;

    ensure_directory(&dir).await?;
    Ok(dir)
}

/// Look up the user's home directory through the platform provider
pub fn home_directory(platform: &dyn PlatformProvider) -> Result<PathBuf> {
    let current = platform.platform();
    let variable = match current.home_variable() {
        Some(variable) => variable,
        None => {
            let os = match current {
                Platform::Unsupported(os) => os,
                other => other.to_string(),
            };
            return Err(Error::UnsupportedPlatform(os));
        }
    };

    match platform.env_var(variable) {
        Some(home) if !home.trim().is_empty() => Ok(PathBuf::from(home)),
        _ => Err(Error::HomeNotSet {
            variable: variable.to_string(),
        }),
    }
}

/// Create `dir` (and its parents) unless it already exists
///
/// Returns `true` when the directory was created by this call and `false`
/// when it was already present, in which case no creation is attempted.
pub async fn ensure_directory(dir: &Path) -> Result<bool> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {
            debug!(?dir, "destination directory already exists");
            Ok(false)
        }
        Ok(_) => Err(Error::Destination {
            path: dir.to_path_buf(),
            reason: "path exists but is not a directory".to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::Destination {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                })?;
            debug!(?dir, "created destination directory");
            Ok(true)
        }
        Err(e) => Err(Error::Destination {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}
