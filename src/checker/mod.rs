pub mod dictionary;
pub mod tokenizer;

use crate::config::Checks;
use crate::document::TextBuffer;
use crate::review::ledger::{Ledger, Position, ReasonCode};
use chrono::NaiveDateTime;
use dictionary::Dictionaries;
use std::collections::HashMap;
use tokenizer::{Token, TokenKind, BLANK};

const BRACKETS: [&str; 8] = ["(", ")", "[", "]", "{", "}", "<", ">"];
const QUOTE: &str = "\"";
const SENTENCE_ENDS: [&str; 3] = [".", "?", "!"];

/// Running state of a scan pass. It spans the whole document, so counts and
/// parity carry over from one line to the next.
#[derive(Debug, Default)]
pub struct ScanState {
    occurrences: HashMap<String, usize>,
    brackets_odd: bool,
    quotes_odd: bool,
    /// Empty until the first token of the document has been seen.
    previous: String,
}

impl ScanState {
    /// Count one more sighting of `token` and return its 1-based occurrence.
    fn count(&mut self, token: &str) -> usize {
        let count = self.occurrences.entry(token.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn occurrences(&self, token: &str) -> usize {
        self.occurrences.get(token).copied().unwrap_or(0)
    }

    pub fn brackets_odd(&self) -> bool {
        self.brackets_odd
    }

    pub fn quotes_odd(&self) -> bool {
        self.quotes_odd
    }
}

/// Evaluates the rules of one scan pass and records what they flag.
pub struct Scanner<'a> {
    dictionaries: &'a Dictionaries,
    checks: Checks,
    reviewer: &'a str,
    now: NaiveDateTime,
}

impl<'a> Scanner<'a> {
    pub fn new(
        dictionaries: &'a Dictionaries,
        checks: Checks,
        reviewer: &'a str,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            dictionaries,
            checks,
            reviewer,
            now,
        }
    }

    /// Scan every line of `buffer` and return the resulting ledger.
    ///
    /// Blank collapsing is not applied here; callers that honour
    /// `auto_remove_blanks` rewrite the buffer first.
    pub fn scan(&self, buffer: &TextBuffer) -> Ledger {
        let mut state = ScanState::default();
        let mut ledger = Ledger::new();

        for (line_no, line) in buffer.lines().iter().enumerate() {
            self.scan_line(line_no, line, &mut state, &mut ledger);
        }

        self.finish(&state, &mut ledger);
        ledger
    }

    pub fn scan_line(
        &self,
        line_no: usize,
        line: &str,
        state: &mut ScanState,
        ledger: &mut Ledger,
    ) {
        for token in tokenizer::tokenize(line) {
            let position = Position {
                line: line_no,
                column: token.span.start,
            };
            if let Some((reason, occurrence)) = self.evaluate(&token, state) {
                ledger.record(
                    token.text,
                    reason,
                    occurrence,
                    Some(position),
                    self.reviewer,
                    self.now,
                );
            }
            state.previous.clear();
            state.previous.push_str(token.text);
        }
    }

    /// Apply the rules to one token in order; the first that fires wins.
    fn evaluate(&self, token: &Token<'_>, state: &mut ScanState) -> Option<(ReasonCode, usize)> {
        let word = token.text;
        let occurrence = state.count(word);

        if self.checks.brackets && BRACKETS.contains(&word) {
            state.brackets_odd = !state.brackets_odd;
        }
        if self.checks.quotes && word == QUOTE {
            state.quotes_odd = !state.quotes_odd;
        }

        if token.kind == TokenKind::Blank {
            let report = word == BLANK && self.checks.blanks && !self.checks.auto_remove_blanks;
            return report.then_some((ReasonCode::BlankSpace, occurrence));
        }

        if is_skippable(word) {
            return None;
        }

        let previous = state.previous.as_str();

        if word == previous {
            return Some((ReasonCode::Duplicate, occurrence));
        }

        let starts_sentence = previous.is_empty() || SENTENCE_ENDS.contains(&previous);
        if starts_sentence && !starts_uppercase(word) {
            return Some((ReasonCode::NotCapital, occurrence));
        }

        let after_break = SENTENCE_ENDS.contains(&previous) || previous == QUOTE;
        if !self.dictionaries.knows(word)
            && !after_break
            && !self.dictionaries.knows(&word.to_lowercase())
        {
            return Some((ReasonCode::NotInDict, occurrence));
        }

        None
    }

    /// Report unbalanced brackets and quotes once the whole document is read.
    pub fn finish(&self, state: &ScanState, ledger: &mut Ledger) {
        if self.checks.brackets && state.brackets_odd {
            ledger.record("", ReasonCode::BracketsOdd, 0, None, self.reviewer, self.now);
        }
        if self.checks.quotes && state.quotes_odd {
            ledger.record("", ReasonCode::QuotesOdd, 0, None, self.reviewer, self.now);
        }
    }
}

/// Punctuation runs, digit runs and lone apostrophes are never flagged.
fn is_skippable(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_punctuation())
        || word.chars().all(|c| c.is_ascii_digit())
        || word == "'"
}

/// True when the first character has no distinct uppercase form or is
/// already in it.
fn starts_uppercase(word: &str) -> bool {
    match word.chars().next() {
        Some(first) => first.to_uppercase().eq(std::iter::once(first)),
        None => true,
    }
}
