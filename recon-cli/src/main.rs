use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use recon_core::{today_in, Dialect};
use recon_ingest::processor::document_name;
use recon_ingest::{discover_statements, parse_document, ProcessOptions, StatementProcessor, TextExtractor};
use recon_report::{
    render_documents, render_transaction_summary, render_validation_summary, save_csv, save_json,
    RunSummary,
};
use std::path::{Path, PathBuf};

mod config;
mod extract;
mod logging;
mod state;

use config::Config;
use extract::PdfTextExtractor;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("RECON_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "recon", version = VERSION, about = "Bank statement parser and debit reconciler")]
struct Cli {
    /// Config file (default: ~/.recon/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level override: error, warn, info, debug, trace
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse every statement in a folder, validate, and export
    Process {
        /// Folder with .pdf/.txt statements (default: [input] folder)
        #[arg(long)]
        folder: Option<PathBuf>,

        /// auto, credit-card or current-account
        #[arg(long)]
        dialect: Option<String>,

        /// CSV output path (default: [output] csv)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// JSON output path (default: [output] json)
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print summaries only, write no files
        #[arg(long)]
        no_export: bool,
    },

    /// Parse a single statement and print its transactions
    Parse {
        file: PathBuf,

        #[arg(long)]
        dialect: Option<String>,

        /// Print transactions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Show or clear the log file
    Logs {
        /// Number of trailing lines, or "all"
        #[arg(default_value = "50")]
        lines: logging::Tail,

        /// Truncate the log file
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration (passwords redacted)
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let explicit = cli.config.as_deref();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(explicit)?,
            ConfigCommand::Show => {
                let cfg = config::load_config(explicit)?;
                print!("{}", config::show_config(&cfg)?);
            }
        },

        Command::Logs { lines, clear } => {
            let cfg = config::load_config(explicit)?;
            let Some(path) = cfg.log_file() else {
                bail!("logging.file is not set in the configuration");
            };
            if clear {
                logging::clear_log(path)?;
                println!("Cleared {}", path.display());
            } else {
                let shown = logging::read_log(path, lines)?;
                if shown.is_empty() {
                    println!("No log entries in {}", path.display());
                }
                for line in shown {
                    println!("{line}");
                }
            }
        }

        Command::Process {
            folder,
            dialect,
            csv,
            json,
            no_export,
        } => {
            let cfg = config::load_config(explicit)?;
            init_logging(&cfg, cli.log_level.as_deref())?;

            let folder = folder.unwrap_or_else(|| cfg.input.folder.clone());
            let options = process_options(&cfg, dialect.as_deref())?;
            let csv = csv.unwrap_or_else(|| cfg.output.csv.clone());
            let json = json.unwrap_or_else(|| cfg.output.json.clone());
            run_process(&cfg, &folder, options, (!no_export).then_some((csv.as_path(), json.as_path())))?;
        }

        Command::Parse {
            file,
            dialect,
            json,
        } => {
            let cfg = config::load_config(explicit)?;
            init_logging(&cfg, cli.log_level.as_deref())?;

            let options = process_options(&cfg, dialect.as_deref())?;
            run_parse(&cfg, &file, &options, json)?;
        }
    }

    Ok(())
}

fn init_logging(cfg: &Config, level_override: Option<&str>) -> Result<()> {
    let level = level_override.unwrap_or(&cfg.logging.level);
    logging::init(level, cfg.log_file())
}

fn process_options(cfg: &Config, dialect_arg: Option<&str>) -> Result<ProcessOptions> {
    let dialect: Option<Dialect> = match dialect_arg {
        Some(raw) => config::parse_dialect(raw)?,
        None => cfg.dialect()?,
    };
    let today = today_in(&cfg.dates.timezone)?;
    Ok(ProcessOptions::new(today)
        .with_dialect(dialect)
        .with_tolerance(cfg.tolerance()?))
}

fn run_process(
    cfg: &Config,
    folder: &Path,
    options: ProcessOptions,
    export: Option<(&Path, &Path)>,
) -> Result<()> {
    let paths = discover_statements(folder)?;
    if paths.is_empty() {
        println!("No statement files (.pdf, .txt) found in {}", folder.display());
        print!("{}", render_validation_summary(&[]));
        return Ok(());
    }
    tracing::info!("Found {} statement file(s) in {}", paths.len(), folder.display());

    let mut extractor = PdfTextExtractor::new(cfg.passwords.clone());
    let mut processor = StatementProcessor::new(options);
    processor.process_paths(&mut extractor, &paths);
    let report = processor.into_report();

    print!("{}", render_documents(&report));
    println!();
    print!("{}", render_transaction_summary(&report.transactions));
    println!();
    print!("{}", render_validation_summary(&report.verdicts));

    if let Some((csv, json)) = export {
        save_csv(csv, &report.transactions)?;
        save_json(json, &report.transactions)?;
    }

    let summary = RunSummary::from_report(&report);
    tracing::info!(
        "Run finished: {} processed, {} failed, {} transactions, {} validation failure(s)",
        summary.documents_processed,
        summary.documents_failed,
        summary.transactions,
        summary.verdicts.failed
    );
    Ok(())
}

fn run_parse(cfg: &Config, file: &Path, options: &ProcessOptions, as_json: bool) -> Result<()> {
    let mut extractor = PdfTextExtractor::new(cfg.passwords.clone());
    let text = extractor
        .extract(file)
        .with_context(|| format!("extracting {}", file.display()))?;
    let doc = parse_document(&document_name(file), &text, options)?;

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&doc.transactions).context("serialize transactions")?
        );
        return Ok(());
    }

    let year = doc
        .year
        .map(|y| format!("{} ({:?})", y.year, y.source))
        .unwrap_or_else(|| "unknown".to_string());
    println!("{}: {} statement, year {}", doc.name, doc.dialect.label(), year);
    if let Some(c) = &doc.classification {
        println!(
            "Classifier scores: card {} / account {}{}",
            c.credit_card_score,
            c.current_account_score,
            if c.confident { "" } else { " (low confidence)" }
        );
    }
    println!();
    for t in &doc.transactions {
        println!(
            "{} | {:<6} | RM{:>10.2} | {}",
            t.date, t.direction, t.amount, t.description
        );
    }
    println!();
    print!("{}", render_validation_summary(std::slice::from_ref(&doc.verdict)));
    Ok(())
}
