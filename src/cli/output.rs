use crate::document::TextBuffer;
use crate::review::ledger::{Exception, Ledger};
use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    file: String,
    total_exceptions: usize,
    exceptions: &'a [Exception],
}

pub fn print_exceptions(
    file_path: &Path,
    ledger: &Ledger,
    buffer: &TextBuffer,
    colored_output: bool,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_text_exceptions(file_path, ledger, buffer, colored_output);
            Ok(())
        }
        OutputFormat::Json => print_json_exceptions(file_path, ledger),
    }
}

fn print_text_exceptions(file_path: &Path, ledger: &Ledger, buffer: &TextBuffer, colored: bool) {
    if ledger.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();
    if colored {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    let arrow = if colored {
        "→".dimmed().to_string()
    } else {
        "→".to_string()
    };

    for exception in ledger {
        println!("  {}", describe(exception, colored));
        if let Some(context) = context_line(exception, buffer) {
            let context = format_context(context, &exception.incorrect_word, colored);
            println!("    {} {}", arrow, context);
        }
    }
}

fn print_json_exceptions(file_path: &Path, ledger: &Ledger) -> Result<()> {
    let entries: Vec<Exception> = ledger.iter().cloned().collect();
    let output = JsonOutput {
        file: file_path.display().to_string(),
        total_exceptions: entries.len(),
        exceptions: &entries,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// One-line summary of an exception: where, what and why.
pub fn describe(exception: &Exception, colored: bool) -> String {
    let location = match exception.position {
        Some(position) => format!("{}:{}", position.line + 1, position.column + 1),
        None => "end".to_string(),
    };
    let word = display_word(&exception.incorrect_word);

    if colored {
        format!(
            "{} {} {} {}",
            location.blue().bold(),
            word.red().bold(),
            exception.reason.to_string().yellow(),
            format!("[{}]", exception.status).dimmed()
        )
    } else {
        format!(
            "{} {} {} [{}]",
            location, word, exception.reason, exception.status
        )
    }
}

/// The line an exception was found on, if it is still in range.
pub fn context_line<'a>(exception: &Exception, buffer: &'a TextBuffer) -> Option<&'a str> {
    exception
        .position
        .and_then(|position| buffer.lines().get(position.line))
        .map(String::as_str)
}

fn display_word(word: &str) -> String {
    match word {
        "" => "(document)".to_string(),
        " " => "(blank)".to_string(),
        other => format!("'{}'", other),
    }
}

pub fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored && !word.trim().is_empty() {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

pub fn print_check_summary(total_exceptions: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_exceptions == 0 {
        if colored {
            println!("{}", "✓ No exceptions found!".green().bold());
        } else {
            println!("✓ No exceptions found!");
        }
    } else {
        let noun = if total_exceptions == 1 { "exception" } else { "exceptions" };
        let files_noun = if files.len() == 1 { "file" } else { "files" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_exceptions.to_string().red().bold(),
                noun,
                files.len(),
                files_noun
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_exceptions,
                noun,
                files.len(),
                files_noun
            );
        }
    }
}

pub fn print_review_summary(total: usize, unresolved: usize, colored: bool) {
    println!();
    let resolved = total.saturating_sub(unresolved);
    if unresolved == 0 {
        if colored {
            println!(
                "{} All {} exceptions resolved",
                "✓".green().bold(),
                total.to_string().green().bold()
            );
        } else {
            println!("✓ All {} exceptions resolved", total);
        }
    } else if colored {
        println!(
            "{} {} resolved, {} left unresolved",
            "!".yellow().bold(),
            resolved.to_string().green().bold(),
            unresolved.to_string().yellow().bold()
        );
    } else {
        println!("! {} resolved, {} left unresolved", resolved, unresolved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ledger::{Position, ReasonCode};
    use chrono::NaiveDate;

    fn ledger() -> Ledger {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut ledger = Ledger::new();
        ledger.record(
            "teh",
            ReasonCode::NotInDict,
            1,
            Some(Position { line: 1, column: 4 }),
            "ann",
            at,
        );
        ledger.record("", ReasonCode::QuotesOdd, 0, None, "ann", at);
        ledger
    }

    #[test]
    fn test_output_format_parsing() {
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_describe_plain() {
        let ledger = ledger();
        assert_eq!(
            describe(ledger.get(0).unwrap(), false),
            "2:5 'teh' Not found in dictionaries [Not Reviewed]"
        );
        assert_eq!(
            describe(ledger.get(1).unwrap(), false),
            "end (document) Extra or missing quote \" [Not Reviewed]"
        );
    }

    #[test]
    fn test_context_line() {
        let ledger = ledger();
        let buffer: TextBuffer = ["First.", "See teh cat."].into_iter().collect();
        assert_eq!(
            context_line(ledger.get(0).unwrap(), &buffer),
            Some("See teh cat.")
        );
        assert_eq!(context_line(ledger.get(1).unwrap(), &buffer), None);
    }
}
