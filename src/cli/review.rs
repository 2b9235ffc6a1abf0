use crate::cli::output::{self, OutputFormat};
use crate::dict::DictionaryStore;
use crate::error::ReviewError;
use crate::report::{RemainingReport, ReportHeader};
use crate::review::change::Change;
use crate::review::ledger::Exception;
use crate::review::Finished;
use crate::session::ReviewSession;
use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    Correct,
    Delete,
    AddToDictionary,
    Undo,
    ToggleUnresolved,
    Finish,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::Next => "Next exception",
            Action::Previous => "Previous exception",
            Action::Correct => "Correct",
            Action::Delete => "Delete",
            Action::AddToDictionary => "Add to project dictionary",
            Action::Undo => "Undo last change",
            Action::ToggleUnresolved => "Toggle unresolved-only",
            Action::Finish => "Finish and save",
            Action::Quit => "Quit without saving",
        }
    }
}

/// How the interactive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Abandoned,
}

/// Walk the reviewer through the exceptions of an imported session until
/// they finish or quit.
pub fn run(session: &ReviewSession, colored: bool) -> Result<Outcome> {
    let term = Term::stdout();
    let theme = ColorfulTheme::default();

    if session.lock()?.exception_count() == 0 {
        println!("{}", "✓ No exceptions to review.".green().bold());
        return Ok(Outcome::Finished);
    }

    // Land on the first entry so there is something to act on.
    report(session.advance());

    loop {
        let (current, actions) = render(session, colored)?;

        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt("Action")
            .items(&labels)
            .default(0)
            .interact_on(&term)?;

        match actions[choice] {
            Action::Next => report(session.advance()),
            Action::Previous => report(session.retreat()),
            Action::Correct => {
                let Some(current) = current else { continue };
                let replacement: String = Input::with_theme(&theme)
                    .with_prompt("Replace with")
                    .with_initial_text(current.incorrect_word.clone())
                    .interact_text_on(&term)?;
                report_applied(session.apply_change(&Change::correct(replacement)));
            }
            Action::Delete => {
                report_applied(session.apply_change(&Change::delete()));
            }
            Action::AddToDictionary => {
                let Some(current) = current else { continue };
                let word: String = Input::with_theme(&theme)
                    .with_prompt("Add word")
                    .with_initial_text(current.incorrect_word.clone())
                    .interact_text_on(&term)?;
                report_applied(session.apply_change(&Change::add_to_dictionary(word)));
            }
            Action::Undo => match session.undo()? {
                true => println!("{}", "Last change undone.".cyan()),
                false => println!("{}", "Nothing to undo.".yellow()),
            },
            Action::ToggleUnresolved => {
                let on = !session.lock()?.unresolved_only();
                session.set_unresolved_only(on)?;
                println!(
                    "Showing {} exceptions.",
                    if on { "unresolved" } else { "all" }
                );
            }
            Action::Finish => return Ok(Outcome::Finished),
            Action::Quit => {
                let sure = Confirm::with_theme(&theme)
                    .with_prompt("Discard all changes?")
                    .default(false)
                    .interact_on(&term)?;
                if sure {
                    return Ok(Outcome::Abandoned);
                }
            }
        }
    }
}

/// Print the current exception and work out which actions apply to it.
fn render(session: &ReviewSession, colored: bool) -> Result<(Option<Exception>, Vec<Action>)> {
    let engine = session.lock()?;
    let total = engine.exception_count();
    let current = engine.current().ok().cloned();

    println!();
    match &current {
        Some(exception) => {
            let number = engine.current_number()?;
            let similar = engine.similar_count()?;
            let counter = format!("Exception {} of {} ({} similar)", number, total, similar);
            if colored {
                println!("{}", counter.bold());
            } else {
                println!("{}", counter);
            }
            println!("  {}", output::describe(exception, colored));
            if let Some(line) = output::context_line(exception, engine.buffer()) {
                println!(
                    "  {}",
                    output::format_context(line, &exception.incorrect_word, colored)
                );
            }
        }
        None => println!("{} exceptions", total),
    }

    let mut actions = vec![Action::Next, Action::Previous];
    if current.as_ref().is_some_and(Exception::is_unresolved) {
        actions.extend([Action::Correct, Action::Delete, Action::AddToDictionary]);
    }
    if engine.can_undo() {
        actions.push(Action::Undo);
    }
    actions.extend([Action::ToggleUnresolved, Action::Finish, Action::Quit]);

    Ok((current, actions))
}

fn report(result: crate::error::Result<Exception>) {
    if let Err(e) = result {
        println!("{} {}", "!".yellow().bold(), e);
    }
}

fn report_applied(result: crate::error::Result<usize>) {
    match result {
        Ok(changed) => println!(
            "{} {} {} updated",
            "✓".green().bold(),
            changed,
            if changed == 1 { "entry" } else { "entries" }
        ),
        Err(e @ ReviewError::DuplicateDictionaryEntry(_)) => {
            println!("{} {}", "✗".red().bold(), e)
        }
        Err(e) => println!("{} {}", "!".yellow().bold(), e),
    }
}

/// Where the outputs of a finished review went.
#[derive(Debug)]
pub struct SavedReview {
    pub document: PathBuf,
    pub report: PathBuf,
    pub project_dictionary: Option<PathBuf>,
}

/// Persist a finished review: the corrected text over `file`, the
/// remaining-exceptions report in `report_dir` and the project dictionary.
pub fn save(
    finished: &Finished,
    file: &Path,
    report_dir: &Path,
    report_format: OutputFormat,
    store: &DictionaryStore,
    project: &str,
    reviewer: &str,
) -> Result<SavedReview> {
    fs::write(file, finished.buffer.to_text())
        .with_context(|| format!("Failed to write {}", file.display()))?;

    let chapter = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("chapter")
        .to_string();
    let header = ReportHeader {
        project: project.to_string(),
        chapter: chapter.clone(),
        reviewer: reviewer.to_string(),
        created: Local::now().naive_local(),
    };
    let remaining = RemainingReport::build(header, finished.unresolved());

    fs::create_dir_all(report_dir)
        .with_context(|| format!("Failed to create {}", report_dir.display()))?;
    let report = match report_format {
        OutputFormat::Text => {
            let path = report_dir.join(format!("{} Exceptions.txt", chapter));
            let out = fs::File::create(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            remaining.write_text(std::io::BufWriter::new(out))?;
            path
        }
        OutputFormat::Json => {
            let path = report_dir.join(format!("{} Exceptions.json", chapter));
            fs::write(&path, remaining.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            path
        }
    };

    let project_dictionary = match &finished.project {
        Some(dictionary) => Some(store.save_project(project, dictionary)?),
        None => None,
    };

    info!(
        document = %file.display(),
        report = %report.display(),
        remaining = remaining.rows.len(),
        "review saved"
    );

    Ok(SavedReview {
        document: file.to_path_buf(),
        report,
        project_dictionary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::{Dictionaries, GenericDictionary, ProjectDictionary};
    use crate::config::Checks;
    use crate::document::TextBuffer;
    use crate::review::Engine;
    use tempfile::tempdir;

    #[test]
    fn test_save_writes_all_outputs() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Chapter 1.txt");
        let store = DictionaryStore::new(dir.path().join("data"));

        let mut engine = Engine::new(Checks::default(), "ann");
        engine.load_document(TextBuffer::from_text("I saw teh cat.\nI met Frodo."));
        engine.load_dictionaries(Dictionaries::new(
            GenericDictionary::from_words(["i", "saw", "the", "cat", "met"]).unwrap(),
            ProjectDictionary::new(),
        ));
        engine.scan().unwrap();
        engine.advance().unwrap();
        engine.apply_change(&Change::correct("the")).unwrap();
        engine.advance().unwrap();
        engine
            .apply_change(&Change::add_to_dictionary("Frodo"))
            .unwrap();

        let finished = engine.finish();
        let saved = save(
            &finished,
            &file,
            &dir.path().join("reports"),
            OutputFormat::Text,
            &store,
            "atlas",
            "ann",
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&saved.document).unwrap(),
            "I saw the cat.\nI met Frodo."
        );
        assert!(saved.report.ends_with("reports/Chapter 1 Exceptions.txt"));
        let report = fs::read_to_string(&saved.report).unwrap();
        assert!(report.starts_with("atlas, Chapter 1, Created: ann, "));
        assert_eq!(report.lines().count(), 2);

        assert!(store.load_project("atlas").unwrap().contains("Frodo"));
    }

    #[test]
    fn test_save_keeps_line_endings() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Chapter 2.txt");
        let store = DictionaryStore::new(dir.path().join("data"));

        let mut engine = Engine::new(Checks::default(), "ann");
        engine.load_document(TextBuffer::from_text("I saw teh cat.\r\nThe end.\r\n"));
        engine.load_dictionaries(Dictionaries::new(
            GenericDictionary::from_words(["i", "saw", "the", "cat", "end"]).unwrap(),
            ProjectDictionary::new(),
        ));
        engine.scan().unwrap();
        engine.advance().unwrap();
        engine.apply_change(&Change::correct("the")).unwrap();

        save(
            &engine.finish(),
            &file,
            dir.path(),
            OutputFormat::Json,
            &store,
            "atlas",
            "ann",
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "I saw the cat.\r\nThe end.\r\n"
        );
    }

    #[test]
    fn test_action_labels_are_distinct() {
        let all = [
            Action::Next,
            Action::Previous,
            Action::Correct,
            Action::Delete,
            Action::AddToDictionary,
            Action::Undo,
            Action::ToggleUnresolved,
            Action::Finish,
            Action::Quit,
        ];
        let mut labels: Vec<_> = all.iter().map(|a| a.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), all.len());
    }
}
