use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, error, info};

use snippetstore::cli::{Cli, Command, OutputFormat, get_log_path};
use snippetstore::config::Config;
use snippetstore::{
    ErrorReporter, FilePreferences, LocalFileSystem, ManagerOptions, Snippet, SnippetDialog, SnippetDraft,
    SnippetError, SnippetManager,
};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Prints surfaced failures to stderr
struct ConsoleReporter;

impl ErrorReporter for ConsoleReporter {
    fn report(&self, err: &SnippetError) {
        error!(error = %err, "snippet operation failed");
        eprintln!("{} {}", "✗".red(), err);
    }
}

/// Non-interactive dialog: submits one prepared draft, confirms from `--yes` or stdin
struct TerminalDialog {
    assume_yes: bool,
    submission: Mutex<Option<SnippetDraft>>,
}

impl TerminalDialog {
    fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            submission: Mutex::new(None),
        }
    }

    fn submitting(draft: SnippetDraft) -> Self {
        Self {
            assume_yes: true,
            submission: Mutex::new(Some(draft)),
        }
    }
}

#[async_trait]
impl SnippetDialog for TerminalDialog {
    async fn ask_yes_no(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{}: {} [y/N] ", title.bold(), message);
        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut answer).await {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                debug!(error = %e, "ask_yes_no: failed to read answer");
                false
            }
        }
    }

    async fn present(&self, _draft: &SnippetDraft) -> Option<SnippetDraft> {
        self.submission.lock().ok()?.take()
    }

    async fn complete(&self, outcome: std::result::Result<(), &SnippetError>) {
        debug!(ok = outcome.is_ok(), "TerminalDialog::complete: called");
    }
}

async fn read_template(template: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(template) = template {
        return Ok(template);
    }
    if let Some(path) = file {
        return tokio::fs::read_to_string(&path)
            .await
            .context(format!("Failed to read template from {}", path.display()));
    }
    let mut content = String::new();
    tokio::io::stdin()
        .read_to_string(&mut content)
        .await
        .context("Failed to read template from stdin")?;
    Ok(content)
}

fn print_snippets(snippets: &[&Snippet], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(snippets)?),
        OutputFormat::Text => {
            if snippets.is_empty() {
                println!("No snippets found");
            }
            for snippet in snippets {
                let path = snippet
                    .file_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("{} {} {}", snippet.name.cyan(), snippet.source.to_string().dimmed(), path.dimmed());
            }
        }
    }
    Ok(())
}

fn find(manager: &SnippetManager, name: &str) -> Result<Snippet> {
    manager
        .store()
        .find_by_name(name)
        .cloned()
        .ok_or_else(|| eyre!("Snippet not found: {}", name))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("snippetstore starting");

    let prefs = FilePreferences::open(&config.preferences_path).context("Failed to open preferences")?;
    let mut manager = SnippetManager::new(
        Arc::new(LocalFileSystem::new()),
        Box::new(prefs),
        Arc::new(ConsoleReporter),
        ManagerOptions::from(&config),
    );
    let summary = manager.init().await.context("Failed to load snippets")?;
    debug!(?summary, "main: snippets loaded");

    match cli.command {
        Command::List { format } => {
            let all: Vec<&Snippet> = manager.get_all().iter().collect();
            print_snippets(&all, &format)?;
        }
        Command::Search { query, format } => {
            let hits = manager.search(Some(&query))?;
            print_snippets(&hits, &format)?;
        }
        Command::Show { name } => {
            let snippet = find(&manager, &name)?;
            print!("{}", snippet.template);
        }
        Command::Add { name, template, file } => {
            let template = read_template(template, file).await?;
            let dialog = TerminalDialog::submitting(SnippetDraft::new(&name, template));
            match manager.add_new_snippet_dialog(&dialog, SnippetDraft::default()).await {
                Some(outcome) if outcome.is_ignored() => {
                    println!("{} Saved {} but a higher-precedence snippet keeps the name", "!".yellow(), name)
                }
                Some(_) => println!("{} Added snippet: {}", "✓".green(), name.cyan()),
                None => return Err(eyre!("Snippet was not added: {}", name)),
            }
        }
        Command::Edit {
            name,
            rename,
            template,
            file,
        } => {
            let record = find(&manager, &name)?;
            let mut draft = record.draft();
            if let Some(new_name) = rename {
                draft.name = new_name;
            }
            if template.is_some() || file.is_some() {
                draft.template = read_template(template, file).await?;
            }
            let dialog = TerminalDialog::submitting(draft);
            match manager.edit_snippet_dialog(&dialog, record.id).await? {
                Some(updated) => println!("{} Saved snippet: {}", "✓".green(), updated.name.cyan()),
                None => return Err(eyre!("Snippet was not saved: {}", name)),
            }
        }
        Command::Delete { name, yes } => {
            let record = find(&manager, &name)?;
            let dialog = TerminalDialog::new(yes);
            if manager.delete_snippet_dialog(&dialog, record.id).await? {
                println!("{} Deleted snippet: {}", "✓".green(), name);
            } else {
                println!("Cancelled");
            }
        }
        Command::Clear { yes } => {
            let dialog = TerminalDialog::new(yes);
            match manager.delete_all_snippets_dialog(&dialog).await {
                Some(removed) => println!(
                    "{} Removed {} snippets from the collection (files kept)",
                    "✓".green(),
                    removed
                ),
                None => println!("Cancelled"),
            }
        }
        Command::Dirs => {
            println!("Default: {}", manager.default_directory().cyan());
            let registrations = manager.preferences().snippet_directories();
            if registrations.is_empty() {
                println!("No registered directories");
            }
            for registration in registrations {
                let state = if registration.auto_load {
                    "auto-load".green()
                } else {
                    "disabled".red()
                };
                println!("{} {}", registration.full_path, state);
            }
        }
    }

    Ok(())
}
