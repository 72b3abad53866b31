use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Default paths to check for a dotenv file
pub const DEFAULT_PATHS: &[&str] = &["./.env", "$HOME/.config/feishu-oauth/.env"];

/// Load environment variables from a dotenv file.
///
/// An explicit path must exist. Without one, the first default path that
/// exists is loaded, and having none is not an error. Variables already set
/// in the process environment are never overridden.
pub fn load_env(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = expand_path(&path.to_string_lossy());
        load_from_path(&path)?;
        return Ok(Some(path));
    }

    for path in DEFAULT_PATHS {
        let expanded_path = expand_path(path);
        if expanded_path.exists() {
            load_from_path(&expanded_path)?;
            return Ok(Some(expanded_path));
        }
    }

    Ok(None)
}

fn expand_path(path: &str) -> PathBuf {
    shellexpand::full(path)
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| PathBuf::from(path))
}

fn load_from_path(path: &Path) -> Result<()> {
    dotenv::from_path(path)
        .with_context(|| format!("Failed to load .env file from {}", path.display()))
}

/// Get an optional environment variable, treating blank values as unset
pub fn get_optional_env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
