//! XDG-style path utilities for configuration and cache directories.
//!
//! Paths follow XDG Base Directory conventions on every platform rather
//! than OS-specific locations.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "xlft";

/// Returns the configuration directory for xlft.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/xlft` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/xlft` otherwise
pub fn config_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Returns the cache directory for xlft.
///
/// Resolution order:
/// 1. `$XDG_CACHE_HOME/xlft` if `XDG_CACHE_HOME` is set
/// 2. `~/.cache/xlft` otherwise
pub fn cache_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

fn xdg_dir(var: &str, fallback: &str) -> Result<PathBuf> {
    match std::env::var(var) {
        Ok(xdg) if !xdg.is_empty() => Ok(PathBuf::from(xdg).join(APP_DIR)),
        _ => Ok(dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(fallback)
            .join(APP_DIR)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_var<F: FnOnce()>(var: &str, value: Option<&str>, f: F) {
        let original = std::env::var(var).ok();
        match value {
            Some(v) => unsafe { std::env::set_var(var, v) },
            None => unsafe { std::env::remove_var(var) },
        }

        f();

        if let Some(val) = original {
            unsafe { std::env::set_var(var, val) };
        } else {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_config_dir_default() {
        with_var("XDG_CONFIG_HOME", None, || {
            assert!(config_dir().unwrap().ends_with(".config/xlft"));
        });
    }

    #[test]
    #[serial]
    fn test_config_dir_xdg_override() {
        with_var("XDG_CONFIG_HOME", Some("/custom/config"), || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/config/xlft"));
        });
    }

    #[test]
    #[serial]
    fn test_empty_xdg_var_is_ignored() {
        with_var("XDG_CACHE_HOME", Some(""), || {
            assert!(cache_dir().unwrap().ends_with(".cache/xlft"));
        });
    }

    #[test]
    #[serial]
    fn test_cache_dir_xdg_override() {
        with_var("XDG_CACHE_HOME", Some("/custom/cache"), || {
            assert_eq!(cache_dir().unwrap(), PathBuf::from("/custom/cache/xlft"));
        });
    }
}
