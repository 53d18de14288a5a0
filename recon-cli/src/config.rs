use anyhow::{Context, Result};
use recon_core::Dialect;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::state::{default_config_path, ensure_recon_home};

const REDACTED: &str = "********";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputSection,
    pub output: OutputSection,
    pub dates: DatesSection,
    pub validation: ValidationSection,
    pub logging: LoggingSection,
    pub passwords: PasswordSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Folder scanned for `.pdf` / `.txt` statements
    pub folder: PathBuf,
    /// `auto`, `credit-card` or `current-account`
    pub dialect: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub csv: PathBuf,
    pub json: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatesSection {
    /// IANA zone used for "today" when a statement has no year
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSection {
    /// Kept as text so the TOML value is never rounded through a float
    pub tolerance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    /// Log file the run is mirrored to; empty disables it
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordSection {
    /// Tried for every encrypted PDF after its per-file password
    pub common: Option<String>,
    pub max_attempts: usize,
    /// Per-file passwords keyed by file name
    pub files: BTreeMap<String, String>,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("./Drop"),
            dialect: "auto".to_string(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("transactions.csv"),
            json: PathBuf::from("transactions.json"),
        }
    }
}

impl Default for DatesSection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kuala_Lumpur".to_string(),
        }
    }
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            tolerance: "0.01".to_string(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from("logs/recon.log")),
        }
    }
}

impl Default for PasswordSection {
    fn default() -> Self {
        Self {
            common: None,
            max_attempts: 3,
            files: BTreeMap::new(),
        }
    }
}

impl Config {
    /// `None` means classify each document.
    pub fn dialect(&self) -> Result<Option<Dialect>> {
        parse_dialect(&self.input.dialect)
    }

    pub fn tolerance(&self) -> Result<Decimal> {
        let raw = self.validation.tolerance.trim();
        let tolerance = Decimal::from_str(raw)
            .with_context(|| format!("invalid validation.tolerance '{raw}'"))?;
        anyhow::ensure!(!tolerance.is_sign_negative(), "validation.tolerance must not be negative");
        Ok(tolerance)
    }

    /// Copy safe to print: every password replaced.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.passwords.common.is_some() {
            cfg.passwords.common = Some(REDACTED.to_string());
        }
        for v in cfg.passwords.files.values_mut() {
            *v = REDACTED.to_string();
        }
        cfg
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.logging
            .file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Parse a dialect setting; `auto` (or empty) means no override.
pub fn parse_dialect(raw: &str) -> Result<Option<Dialect>> {
    match raw.trim() {
        "" => Ok(None),
        s if s.eq_ignore_ascii_case("auto") => Ok(None),
        s => Ok(Some(s.parse()?)),
    }
}

pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

/// Load the config at `explicit` (must exist), else `~/.recon/config.toml`
/// if present, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = config_path(explicit)?;
    if !p.exists() {
        anyhow::ensure!(explicit.is_none(), "config file not found: {}", p.display());
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    if explicit.is_none() {
        ensure_recon_home()?;
    }
    let p = config_path(explicit)?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config(cfg: &Config) -> Result<String> {
    toml::to_string_pretty(&cfg.redacted()).context("serialize config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[input]
folder = "statements"

[passwords]
common = "secret"
"#,
        )
        .unwrap();
        assert_eq!(cfg.input.folder, PathBuf::from("statements"));
        assert_eq!(cfg.input.dialect, "auto");
        assert_eq!(cfg.passwords.max_attempts, 3);
        assert_eq!(cfg.dates.timezone, "Asia/Kuala_Lumpur");
        assert_eq!(cfg.tolerance().unwrap(), Decimal::new(1, 2));
    }

    #[test]
    fn test_defaults_survive_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back, Config::default());
    }

    #[test]
    fn test_dialect_setting() {
        assert_eq!(parse_dialect("auto").unwrap(), None);
        assert_eq!(parse_dialect("AUTO").unwrap(), None);
        assert_eq!(parse_dialect("current-account").unwrap(), Some(Dialect::CurrentAccount));
        assert_eq!(parse_dialect("credit_card").unwrap(), Some(Dialect::CreditCard));
        assert!(parse_dialect("savings").is_err());
    }

    #[test]
    fn test_bad_tolerance() {
        let mut cfg = Config::default();
        cfg.validation.tolerance = "abc".to_string();
        assert!(cfg.tolerance().is_err());
        cfg.validation.tolerance = "-0.01".to_string();
        assert!(cfg.tolerance().is_err());
    }

    #[test]
    fn test_show_redacts_passwords() {
        let mut cfg = Config::default();
        cfg.passwords.common = Some("hunter2".to_string());
        cfg.passwords
            .files
            .insert("jan.pdf".to_string(), "jan-secret".to_string());
        let shown = show_config(&cfg).unwrap();
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("jan-secret"));
        assert!(shown.contains("jan.pdf"));
        // the loaded config keeps its secrets
        assert_eq!(cfg.passwords.common.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        assert!(load_config(Some(Path::new("/no/such/recon.toml"))).is_err());
    }
}
