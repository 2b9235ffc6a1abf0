use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use proofdesk::cli::output::{self, OutputFormat};
use proofdesk::cli::review::{self, Outcome};
use proofdesk::dict::{manager, DictionaryStore};
use proofdesk::{Check, Config, Engine, ReviewSession, TextBuffer};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "proofdesk")]
#[command(version, about = "Scan and review converted book chapters", long_about = None)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Reviewer name stamped on exceptions and dictionary entries
    #[arg(long, global = true, env = "PROOFDESK_REVIEWER")]
    reviewer: Option<String>,

    /// Project whose dictionary is used
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Language of the generic dictionary (e.g., en_GB, en_US)
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Directory holding dictionaries and project data
    #[arg(long, global = true, env = "PROOFDESK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Turn a check off (brackets, quotes, blanks, auto-remove-blanks)
    #[arg(long = "disable", value_name = "CHECK", global = true)]
    disabled: Vec<Check>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Scan chapters and print their exceptions
    Check {
        /// Chapter text files
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output format (text, json)
        #[arg(short = 'o', long, default_value = "text")]
        format: OutputFormat,

        /// Exit with code 0 even if exceptions are found
        #[arg(long)]
        no_fail: bool,
    },
    /// Review a chapter's exceptions interactively
    Review {
        /// Chapter text file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Where to write the remaining-exceptions report (defaults to the chapter's directory)
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Report format (text, json)
        #[arg(long, default_value = "text")]
        report_format: OutputFormat,
    },
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List installed dictionaries and projects
    List,
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
    /// Compile a word list into a dictionary
    Build {
        /// Language code (e.g., en_GB, en_US)
        language: String,
        /// Word list, one word per line
        word_list: PathBuf,
    },
    /// Add a word to the project dictionary
    Add {
        word: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "proofdesk", &mut io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(
        cli.language.clone(),
        cli.project.clone(),
        cli.reviewer.clone(),
        cli.data_dir.clone(),
        &cli.disabled,
    )?;
    let colored_output = !cli.no_color;

    match cli.command {
        Some(Commands::Check {
            files,
            format,
            no_fail,
        }) => {
            let total = check_files(&config, &files, format, colored_output)?;
            if total > 0 && !no_fail {
                std::process::exit(1);
            }
        }
        Some(Commands::Review {
            file,
            report_dir,
            report_format,
        }) => review_file(&config, &file, report_dir, report_format, colored_output)?,
        Some(Commands::Dict { action }) => handle_dict(&config, action)?,
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_chapter(path: &Path) -> Result<TextBuffer> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chapter: {}", path.display()))?;
    Ok(TextBuffer::from_text(&text))
}

fn check_files(
    config: &Config,
    files: &[PathBuf],
    format: OutputFormat,
    colored_output: bool,
) -> Result<usize> {
    let store = DictionaryStore::from_config(config)?;
    let mut total = 0;

    for file in files {
        if !file.exists() {
            eprintln!("Error: File not found: {}", file.display());
            continue;
        }

        let mut engine = Engine::new(config.checks(), config.reviewer());
        engine.load_document(read_chapter(file)?);
        engine.load_dictionaries(store.load(config.project(), &config.language)?);
        total += engine.scan()?;

        output::print_exceptions(
            file,
            engine.ledger(),
            engine.buffer(),
            colored_output,
            format,
        )?;
    }

    if matches!(format, OutputFormat::Text) {
        output::print_check_summary(total, files, colored_output);
    }
    Ok(total)
}

fn review_file(
    config: &Config,
    file: &Path,
    report_dir: Option<PathBuf>,
    report_format: OutputFormat,
    colored_output: bool,
) -> Result<()> {
    let store = DictionaryStore::from_config(config)?;
    let dictionaries = store.load(config.project(), &config.language)?;
    let buffer = read_chapter(file)?;

    let session = Arc::new(ReviewSession::new(Engine::new(
        config.checks(),
        config.reviewer(),
    )));

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.set_message(format!("Scanning {}...", file.display()));
    pb.enable_steady_tick(Duration::from_millis(80));

    let found = session
        .import_in_background(buffer, dictionaries)
        .join()
        .map_err(|_| anyhow!("Scan of {} panicked", file.display()))??;
    pb.finish_with_message(format!("Found {} exceptions", found));

    if review::run(&session, colored_output)? == Outcome::Abandoned {
        println!("{}", "Review abandoned, nothing saved.".yellow());
        return Ok(());
    }

    let finished = Arc::try_unwrap(session)
        .map_err(|_| anyhow!("Review session is still in use"))?
        .into_engine()
        .finish();
    let unresolved = finished.unresolved().count();

    let report_dir = report_dir.unwrap_or_else(|| {
        file.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let saved = review::save(
        &finished,
        file,
        &report_dir,
        report_format,
        &store,
        config.project(),
        config.reviewer(),
    )?;

    output::print_review_summary(finished.ledger.len(), unresolved, colored_output);
    println!("Chapter: {}", saved.document.display().to_string().cyan());
    println!("Report: {}", saved.report.display().to_string().cyan());
    if let Some(path) = saved.project_dictionary {
        println!("Project dictionary: {}", path.display().to_string().cyan());
    }

    Ok(())
}

fn handle_dict(config: &Config, action: DictCommands) -> Result<()> {
    let store = DictionaryStore::from_config(config)?;
    match action {
        DictCommands::List => manager::list_dictionaries(&store)?,
        DictCommands::Info { language } => manager::show_info(&store, &language)?,
        DictCommands::Build {
            language,
            word_list,
        } => manager::build_dictionary(&store, &language, &word_list)?,
        DictCommands::Add { word } => {
            manager::add_word(&store, config.project(), &word, config.reviewer())?
        }
    }
    Ok(())
}
