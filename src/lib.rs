//! Validator for a corpus of test-automation skill packages.
//!
//! A skill is a top-level directory holding a `SKILL.md` with YAML
//! frontmatter and a `reference/` directory of companion Markdown. The
//! validator checks the metadata contract, the body line budget, every
//! `reference/*.md` link, name uniqueness and the `skills_index.json`
//! registry, then prints a text or JSON report and exits non-zero on errors.

pub mod checks;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod scan;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

use crate::config::{Overrides, ValidatorConfig};
use crate::error::ValidatorError;
use crate::pipeline::RunOptions;

/// Exit code for usage errors and fatal I/O problems.
pub const EXIT_FATAL: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Grouped, human-readable output
    Text,
    /// Machine-readable report for CI
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "validate-skills",
    version,
    about = "Validate skill packages: frontmatter, line budgets, references and the registry"
)]
pub struct Cli {
    /// Repository root containing the skill directories (defaults to the current directory)
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Maximum SKILL.md body lines before a budget warning
    #[arg(long, value_name = "N")]
    pub max_lines: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Treat warnings as failures when computing the exit code
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Config file (defaults to validate-skills.toml under the root, if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of worker threads
    #[arg(long, short = 'j', value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Increase log verbosity (-v info, -vv debug); logs go to stderr
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Parse arguments, run the validator and map the outcome to an exit code.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match execute(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            // Some sources (TOML errors) render over several lines.
            let message = format!("{err:#}").split_whitespace().collect::<Vec<_>>().join(" ");
            eprintln!("validate-skills: {message}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

async fn execute(cli: Cli) -> anyhow::Result<u8> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("could not determine current directory")?,
    };
    if !root.is_dir() {
        return Err(ValidatorError::RootNotFound(root).into());
    }

    let overrides = Overrides {
        max_lines: cli.max_lines,
    };
    let config = ValidatorConfig::load(&root, cli.config.as_deref(), &overrides)
        .map_err(ValidatorError::from)?;
    tracing::debug!(?config, root = %root.display(), "resolved configuration");

    let interrupt = Arc::new(AtomicBool::new(false));
    let listener = {
        let interrupt = Arc::clone(&interrupt);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, finishing in-flight skills");
                interrupt.store(true, Ordering::SeqCst);
            }
        })
    };

    let options = RunOptions {
        jobs: cli.jobs.map(usize::from),
    };
    let flag = Arc::clone(&interrupt);
    let validation = tokio::task::spawn_blocking(move || {
        pipeline::validate_corpus(&root, &config, &options, &flag)
    })
    .await
    .context("validation task failed")??;
    listener.abort();

    let report = validation.report;
    let rendered = match cli.format {
        OutputFormat::Json => report::render_json(&report).context("serialize report")?,
        OutputFormat::Text => {
            let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
            colored::control::set_override(color);
            report::render_text(&report, color)
        }
    };
    print!("{rendered}");

    Ok(report.exit_code(cli.strict))
}
