//! Token file path resolution.

use std::path::{Path, PathBuf};
use tokenauth_common::StoreError;

/// Platform default token file location.
///
/// On Linux: `~/.config/tokenauth/tokens.yml`. Falls back to `tokens.yml`
/// in the working directory when no config directory is known.
pub fn default_token_file_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("tokenauth").join("tokens.yml"))
        .unwrap_or_else(|| PathBuf::from("tokens.yml"))
}

/// Resolve `path` to an absolute path whose directory component is canonical.
///
/// The file itself need not exist, but its directory must. Watch events carry
/// canonical directory paths on some platforms (e.g. `/private/tmp` on macOS),
/// so the comparison target has to be built the same way.
pub fn resolve_token_file_path(path: &Path) -> Result<PathBuf, StoreError> {
    let file_name = path.file_name().ok_or_else(|| {
        StoreError::Watch(format!("{} does not name a file", path.display()))
    })?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let dir = parent.canonicalize().map_err(|e| {
        StoreError::Watch(format!(
            "failed to resolve token file directory {}: {e}",
            parent.display()
        ))
    })?;

    Ok(dir.join(file_name))
}
