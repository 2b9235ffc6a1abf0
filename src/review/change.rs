use crate::document::{self, TextBuffer};
use crate::review::ledger::{Exception, Ledger, ReasonCode, Status};
use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\S+").unwrap();
}

/// What a reviewer decided for the current exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Replacement text; empty means delete.
    pub replacement: String,
    pub status: Status,
}

impl Change {
    pub fn correct(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
            status: Status::Corrected,
        }
    }

    pub fn delete() -> Self {
        Self {
            replacement: String::new(),
            status: Status::Deleted,
        }
    }

    pub fn add_to_dictionary(word: impl Into<String>) -> Self {
        Self {
            replacement: word.into(),
            status: Status::AddedToProjectDictionary,
        }
    }
}

/// Everything the last applied change overwrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoSnapshot {
    pub entries: Vec<Exception>,
    pub buffer: TextBuffer,
}

impl UndoSnapshot {
    /// Put the saved entries and text back.
    pub fn restore(self, ledger: &mut Ledger, buffer: &mut TextBuffer) {
        ledger.restore(self.entries);
        *buffer = self.buffer;
    }
}

/// Rewrite every ledger entry keyed by `(key, reason)` and the text buffer,
/// returning what is needed to undo it.
///
/// The key must be taken from the current exception before calling, since
/// the batch overwrites `incorrect_word` on that very entry.
pub fn apply(
    ledger: &mut Ledger,
    buffer: &mut TextBuffer,
    key: &str,
    reason: ReasonCode,
    change: &Change,
    reviewer: &str,
    now: NaiveDateTime,
) -> UndoSnapshot {
    let previous_buffer = buffer.clone();
    let mut saved = Vec::new();

    for entry in ledger.entries_mut() {
        if entry.matches(key, reason) {
            saved.push(entry.clone());
            entry.incorrect_word = change.replacement.clone();
            entry.status = change.status;
            entry.replacement = change.replacement.clone();
            entry.replacement_authorized_by = reviewer.to_string();
            entry.last_modified = now;
        }
    }

    let replacement = change.replacement.as_str();
    buffer
        .lines_mut()
        .par_iter_mut()
        .for_each(|line| *line = rewrite_line(line, key, reason, replacement));

    UndoSnapshot {
        entries: saved,
        buffer: previous_buffer,
    }
}

/// The text edit implied by resolving `(key, reason)` on one line.
pub fn rewrite_line(line: &str, key: &str, reason: ReasonCode, replacement: &str) -> String {
    match reason {
        ReasonCode::BlankSpace => document::collapse_blanks(line),
        ReasonCode::Duplicate => collapse_repeats(line, key),
        _ if replacement.is_empty() => remove_word(line, key),
        _ => replace_word(line, key, replacement),
    }
}

#[derive(Clone, Copy)]
enum Piece<'a> {
    Gap(&'a str),
    Word(&'a str),
}

/// Split a line into whitespace-delimited words and the gaps around them.
fn pieces(line: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for word in WORD.find_iter(line) {
        if word.start() > last {
            pieces.push(Piece::Gap(&line[last..word.start()]));
        }
        pieces.push(Piece::Word(word.as_str()));
        last = word.end();
    }
    if last < line.len() {
        pieces.push(Piece::Gap(&line[last..]));
    }
    pieces
}

fn join(pieces: &[Piece<'_>]) -> String {
    pieces
        .iter()
        .map(|piece| match piece {
            Piece::Gap(text) | Piece::Word(text) => *text,
        })
        .collect()
}

fn replace_word(line: &str, key: &str, replacement: &str) -> String {
    if key.is_empty() {
        return line.to_string();
    }
    let replaced: Vec<Piece<'_>> = pieces(line)
        .into_iter()
        .map(|piece| match piece {
            Piece::Word(word) if word == key => Piece::Word(replacement),
            other => other,
        })
        .collect();
    join(&replaced)
}

/// Drop every whitespace-delimited `key`, leaving one space where it sat
/// between two words.
fn remove_word(line: &str, key: &str) -> String {
    if key.is_empty() {
        return line.to_string();
    }
    let mut out: Vec<Piece<'_>> = Vec::new();
    let mut removed = false;

    for piece in pieces(line) {
        match piece {
            Piece::Word(word) if word == key => removed = true,
            Piece::Word(_) => {
                removed = false;
                out.push(piece);
            }
            Piece::Gap(_) if removed => match out.last().copied() {
                Some(Piece::Gap(_)) => {
                    out.pop();
                    out.push(Piece::Gap(" "));
                }
                Some(Piece::Word(_)) => out.push(Piece::Gap(" ")),
                None => {}
            },
            Piece::Gap(_) => out.push(piece),
        }
    }
    if removed && matches!(out.last(), Some(Piece::Gap(_))) {
        out.pop();
    }
    join(&out)
}

/// Collapse `key key` (whitespace-delimited) down to a single `key`.
fn collapse_repeats(line: &str, key: &str) -> String {
    if key.is_empty() {
        return line.to_string();
    }
    let mut out: Vec<Piece<'_>> = Vec::new();

    for piece in pieces(line) {
        if let Piece::Word(word) = piece {
            let repeats = word == key
                && matches!(
                    out.as_slice(),
                    [.., Piece::Word(prev), Piece::Gap(_)] if *prev == key
                );
            if repeats {
                out.pop();
                continue;
            }
        }
        out.push(piece);
    }
    join(&out)
}
