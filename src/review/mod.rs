pub mod change;
pub mod cursor;
pub mod ledger;

use crate::checker::dictionary::{Dictionaries, ProjectDictionary};
use crate::checker::Scanner;
use crate::config::Checks;
use crate::document::TextBuffer;
use crate::error::{Result, ReviewError};
use change::{Change, UndoSnapshot};
use chrono::{Local, NaiveDateTime};
use cursor::{Cursor, Direction};
use ledger::{Exception, Ledger, Status};
use tracing::{debug, info};

/// The state of one reviewer's pass over one chapter: the text, the
/// dictionaries, the exceptions found and where the reviewer is among them.
pub struct Engine {
    checks: Checks,
    reviewer: String,
    buffer: TextBuffer,
    dictionaries: Option<Dictionaries>,
    ledger: Ledger,
    cursor: Cursor,
    undo: Option<UndoSnapshot>,
    scanned: bool,
}

impl Engine {
    pub fn new(checks: Checks, reviewer: impl Into<String>) -> Self {
        Self {
            checks,
            reviewer: reviewer.into(),
            buffer: TextBuffer::default(),
            dictionaries: None,
            ledger: Ledger::new(),
            cursor: Cursor::new(),
            undo: None,
            scanned: false,
        }
    }

    pub fn checks(&self) -> Checks {
        self.checks
    }

    pub fn reviewer(&self) -> &str {
        &self.reviewer
    }

    /// Take a new chapter. The previous ledger is discarded until the next scan.
    pub fn load_document(&mut self, buffer: TextBuffer) {
        debug!(lines = buffer.len(), "document loaded");
        self.buffer = buffer;
        self.ledger = Ledger::new();
        self.cursor.reset();
        self.undo = None;
        self.scanned = false;
    }

    pub fn load_dictionaries(&mut self, dictionaries: Dictionaries) {
        debug!(
            generic = dictionaries.generic.len(),
            project = dictionaries.project.len(),
            "dictionaries loaded"
        );
        self.dictionaries = Some(dictionaries);
    }

    /// Run a scan pass over the loaded document, replacing the ledger.
    /// Returns the number of exceptions found.
    pub fn scan(&mut self) -> Result<usize> {
        self.scan_at(Local::now().naive_local())
    }

    pub fn scan_at(&mut self, now: NaiveDateTime) -> Result<usize> {
        let dictionaries = self
            .dictionaries
            .as_ref()
            .ok_or(ReviewError::DictionariesNotLoaded)?;

        if self.checks.auto_remove_blanks {
            self.buffer.collapse_blanks();
        }

        let scanner = Scanner::new(dictionaries, self.checks, &self.reviewer, now);
        self.ledger = scanner.scan(&self.buffer);
        self.cursor.reset();
        self.undo = None;
        self.scanned = true;

        info!(exceptions = self.ledger.len(), "scan finished");
        Ok(self.ledger.len())
    }

    pub fn is_scanned(&self) -> bool {
        self.scanned
    }

    fn ensure_scanned(&self) -> Result<()> {
        if self.scanned {
            Ok(())
        } else {
            Err(ReviewError::ScanIncomplete)
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn contents(&self) -> String {
        self.buffer.contents()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn exception_count(&self) -> usize {
        self.ledger.len()
    }

    pub fn set_unresolved_only(&mut self, on: bool) {
        self.cursor.set_unresolved_only(on);
    }

    pub fn unresolved_only(&self) -> bool {
        self.cursor.unresolved_only()
    }

    pub fn advance(&mut self) -> Result<&Exception> {
        self.step(Direction::Forward)
    }

    pub fn retreat(&mut self) -> Result<&Exception> {
        self.step(Direction::Backward)
    }

    fn step(&mut self, direction: Direction) -> Result<&Exception> {
        self.ensure_scanned()?;
        self.cursor.step(&self.ledger, direction)?;
        self.cursor.current(&self.ledger)
    }

    pub fn current(&self) -> Result<&Exception> {
        self.ensure_scanned()?;
        self.cursor.current(&self.ledger)
    }

    /// 1-based number of the current exception.
    pub fn current_number(&self) -> Result<usize> {
        Ok(self.current()?.entry_no + 1)
    }

    /// How many entries share the current exception's word and reason.
    pub fn similar_count(&self) -> Result<usize> {
        let current = self.current()?;
        Ok(self
            .ledger
            .similar(&current.incorrect_word, current.reason)
            .count())
    }

    pub fn apply_change(&mut self, change: &Change) -> Result<usize> {
        self.apply_change_at(change, Local::now().naive_local())
    }

    /// Resolve every exception sharing the current one's word and reason,
    /// rewriting the text to match. Validation happens before anything is
    /// touched. Returns how many entries changed.
    pub fn apply_change_at(&mut self, change: &Change, now: NaiveDateTime) -> Result<usize> {
        if change.status == Status::NotReviewed {
            return Err(ReviewError::InvalidTargetStatus(change.status));
        }
        let current = self.current()?;
        let (key, reason) = (current.incorrect_word.clone(), current.reason);

        if change.status == Status::AddedToProjectDictionary {
            let dictionaries = self
                .dictionaries
                .as_mut()
                .ok_or(ReviewError::DictionariesNotLoaded)?;
            if !dictionaries
                .project
                .insert(&change.replacement, &self.reviewer, now)
            {
                return Err(ReviewError::DuplicateDictionaryEntry(
                    change.replacement.clone(),
                ));
            }
        }

        let snapshot = change::apply(
            &mut self.ledger,
            &mut self.buffer,
            &key,
            reason,
            change,
            &self.reviewer,
            now,
        );
        let changed = snapshot.entries.len();
        self.undo = Some(snapshot);

        info!(word = %key, %reason, status = %change.status, changed, "change applied");
        Ok(changed)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.is_some()
    }

    /// Revert the most recent change. Returns `false` when there is nothing
    /// to undo. Project dictionary additions are kept.
    pub fn undo(&mut self) -> bool {
        match self.undo.take() {
            Some(snapshot) => {
                let restored = snapshot.entries.len();
                snapshot.restore(&mut self.ledger, &mut self.buffer);
                info!(restored, "last change undone");
                true
            }
            None => false,
        }
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &Exception> {
        self.ledger.unresolved()
    }

    pub fn project_dictionary(&self) -> Option<&ProjectDictionary> {
        self.dictionaries.as_ref().map(|d| &d.project)
    }

    /// Hand back the final text, ledger and project dictionary.
    pub fn finish(self) -> Finished {
        Finished {
            buffer: self.buffer,
            ledger: self.ledger,
            project: self.dictionaries.map(|d| d.project),
        }
    }
}

/// What a completed review exports for persistence.
pub struct Finished {
    pub buffer: TextBuffer,
    pub ledger: Ledger,
    pub project: Option<ProjectDictionary>,
}

impl Finished {
    pub fn unresolved(&self) -> impl Iterator<Item = &Exception> {
        self.ledger.unresolved()
    }
}
