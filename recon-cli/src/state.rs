//! Where recon keeps its per-user files.

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// Overrides `~/.recon` when set
pub const HOME_OVERRIDE_VAR: &str = "RECON_HOME";

/// `$RECON_HOME`, else `$HOME/.recon`.
pub fn recon_home() -> Result<PathBuf> {
    home_from(std::env::var_os(HOME_OVERRIDE_VAR), std::env::var_os("HOME"))
}

fn home_from(override_dir: Option<OsString>, user_home: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    match user_home.filter(|h| !h.is_empty()) {
        Some(home) => Ok(PathBuf::from(home).join(".recon")),
        None => bail!("neither {HOME_OVERRIDE_VAR} nor HOME is set"),
    }
}

pub fn ensure_recon_home() -> Result<PathBuf> {
    let dir = recon_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(recon_home()?.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_resolution() {
        assert_eq!(
            home_from(None, Some("/home/ana".into())).unwrap(),
            PathBuf::from("/home/ana/.recon")
        );
        assert_eq!(
            home_from(Some("/srv/recon".into()), Some("/home/ana".into())).unwrap(),
            PathBuf::from("/srv/recon")
        );
        assert_eq!(
            home_from(Some("".into()), Some("/home/ana".into())).unwrap(),
            PathBuf::from("/home/ana/.recon")
        );
        assert!(home_from(None, None).is_err());
    }
}
