use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::MakeWriterExt;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install the global subscriber: stderr, plus an appended copy in `file`.
pub fn init(level: &str, file: Option<&Path>) -> Result<()> {
    let level = LevelFilter::from_str(level.trim())
        .with_context(|| format!("invalid log level '{level}'"))?;

    let builder = tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_max_level(level)
        .with_target(false)
        .with_level(true);

    let installed = match file {
        Some(path) => {
            let log = open_append(path)?;
            builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Arc::new(log)))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| anyhow!("init logging: {e}"))
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))
}

/// How much of the log `recon logs` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    Last(usize),
    All,
}

impl FromStr for Tail {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Tail::All);
        }
        let n = s
            .parse()
            .with_context(|| format!("expected a line count or 'all', got '{s}'"))?;
        Ok(Tail::Last(n))
    }
}

/// Lines of the log file selected by `tail`; empty when there is no log yet.
pub fn read_log(path: &Path, tail: Tail) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let lines = BufReader::new(f)
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .with_context(|| format!("read {}", path.display()))?;
    Ok(match tail {
        Tail::All => lines,
        Tail::Last(n) => lines[lines.len().saturating_sub(n)..].to_vec(),
    })
}

pub fn clear_log(path: &Path) -> Result<()> {
    if path.exists() {
        File::create(path).with_context(|| format!("truncate {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_arg() {
        assert_eq!("all".parse::<Tail>().unwrap(), Tail::All);
        assert_eq!("ALL".parse::<Tail>().unwrap(), Tail::All);
        assert_eq!("20".parse::<Tail>().unwrap(), Tail::Last(20));
        assert!("twenty".parse::<Tail>().is_err());
    }

    #[test]
    fn test_read_and_clear() {
        let dir = std::env::temp_dir().join("recon-cli-logging-test");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("logs").join("recon.log");
        assert!(read_log(&path, Tail::All).unwrap().is_empty());

        open_append(&path).unwrap();
        fs::write(&path, "one\ntwo\nthree\n").unwrap();
        assert_eq!(read_log(&path, Tail::Last(2)).unwrap(), vec!["two", "three"]);
        assert_eq!(read_log(&path, Tail::Last(10)).unwrap().len(), 3);

        clear_log(&path).unwrap();
        assert!(read_log(&path, Tail::All).unwrap().is_empty());
    }
}
