//! Command-line front end for the question store.
//!
//! # Responsibility
//! - Resolve configuration from flags and `QUIZBANK_*` environment variables.
//! - Open the database, wire the service and print results as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use quizbank_core::{
    default_log_level, init_logging, open_db, Question, QuestionId, QuestionService,
    SqliteQuestionRepository,
};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "quizbank", version, about = "Manage quiz questions stored in SQLite")]
struct Cli {
    /// SQLite database file; created and migrated on first use.
    #[arg(long, env = "QUIZBANK_DB", default_value = "quizbank.db")]
    db: PathBuf,

    /// Directory for rolling log files. Logging stays off when unset.
    #[arg(long, env = "QUIZBANK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error. Only meaningful together with `--log-dir`.
    #[arg(long, env = "QUIZBANK_LOG_LEVEL", requires = "log_dir")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every question with its options as JSON.
    List,
    /// Create a question from a JSON file and print its id.
    Add { file: PathBuf },
    /// Replace body and options of question ID from a JSON file.
    Update { id: QuestionId, file: PathBuf },
    /// Delete question ID and its options.
    Delete { id: QuestionId },
    /// Print the core library version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        start_logging(level, log_dir)?;
    }

    if let Command::Version = cli.command {
        println!("quizbank_core version={}", quizbank_core::core_version());
        return Ok(());
    }

    let mut conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let repo = SqliteQuestionRepository::try_new(&mut conn)?;
    let mut service = QuestionService::new(repo);

    match cli.command {
        Command::List => {
            let questions = service.list_questions()?;
            print_json(&questions)?;
        }
        Command::Add { file } => {
            let question = read_question(&file)?;
            let id = service.create_question(&question)?;
            println!("{id}");
        }
        Command::Update { id, file } => {
            let question = read_question(&file)?;
            service.update_question(id, &question)?;
        }
        Command::Delete { id } => service.delete_question(id)?,
        Command::Version => {}
    }

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

fn start_logging(level: &str, log_dir: &Path) -> Result<()> {
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("failed to resolve current directory")?
            .join(log_dir)
    };
    let log_dir = log_dir
        .to_str()
        .context("log directory must be valid UTF-8")?;
    init_logging(level, log_dir).map_err(anyhow::Error::msg)
}

fn read_question(path: &Path) -> Result<Question> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("`{}` is not a valid question document", path.display()))
}

fn print_json(questions: &[Question]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, questions)?;
    writeln!(stdout)?;
    Ok(())
}
