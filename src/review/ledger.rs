use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a token was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    BlankSpace,
    BracketsOdd,
    QuotesOdd,
    Duplicate,
    NotCapital,
    NotInDict,
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReasonCode::BlankSpace => "Extra blank space",
            ReasonCode::BracketsOdd => "Extra or missing bracket () [] {} <>",
            ReasonCode::QuotesOdd => "Extra or missing quote \"",
            ReasonCode::Duplicate => "Duplicate word",
            ReasonCode::NotCapital => "Should be capitalised",
            ReasonCode::NotInDict => "Not found in dictionaries",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    NotReviewed,
    Deleted,
    Corrected,
    #[serde(rename = "ADDED_PROJ_DIC")]
    AddedToProjectDictionary,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::NotReviewed => "Not Reviewed",
            Status::Deleted => "Deleted",
            Status::Corrected => "Corrected",
            Status::AddedToProjectDictionary => "Added to the dictionary",
        };
        f.write_str(text)
    }
}

/// Where a flagged token sat when the document was scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 0-based line index.
    pub line: usize,
    /// Byte offset within the line.
    pub column: usize,
}

/// One flagged occurrence awaiting review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    pub entry_no: usize,
    pub incorrect_word: String,
    pub reason: ReasonCode,
    /// Cumulative count of this exact token across the document; 0 for the
    /// end-of-document bracket and quote checks.
    pub occurrence: usize,
    pub position: Option<Position>,
    pub created_at: NaiveDateTime,
    pub created_by: String,
    pub status: Status,
    pub replacement: String,
    pub replacement_authorized_by: String,
    pub last_modified: NaiveDateTime,
}

impl Exception {
    pub fn is_unresolved(&self) -> bool {
        self.status == Status::NotReviewed
    }

    /// Whether this entry belongs to the batch keyed by `(word, reason)`.
    pub fn matches(&self, word: &str, reason: ReasonCode) -> bool {
        self.reason == reason && self.incorrect_word == word
    }
}

/// The exceptions of one scan pass, ordered by `entry_no`.
///
/// Entry numbers run `0..len` so an entry's number is also its index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<Exception>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, entry_no: usize) -> Option<&Exception> {
        self.entries.get(entry_no)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exception> {
        self.entries.iter()
    }

    /// The number the next recorded exception will receive.
    pub fn next_entry_no(&self) -> usize {
        self.entries.len()
    }

    /// Append a fresh, unreviewed exception stamped by `reviewer` at `now`.
    pub fn record(
        &mut self,
        word: &str,
        reason: ReasonCode,
        occurrence: usize,
        position: Option<Position>,
        reviewer: &str,
        now: NaiveDateTime,
    ) -> usize {
        let entry_no = self.next_entry_no();
        self.entries.push(Exception {
            entry_no,
            incorrect_word: word.to_string(),
            reason,
            occurrence,
            position,
            created_at: now,
            created_by: reviewer.to_string(),
            status: Status::NotReviewed,
            replacement: String::new(),
            replacement_authorized_by: String::new(),
            last_modified: now,
        });
        entry_no
    }

    /// Entries that share `(word, reason)`.
    pub fn similar<'a>(
        &'a self,
        word: &'a str,
        reason: ReasonCode,
    ) -> impl Iterator<Item = &'a Exception> + 'a {
        self.entries.iter().filter(move |e| e.matches(word, reason))
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &Exception> {
        self.entries.iter().filter(|e| e.is_unresolved())
    }

    pub(crate) fn entries_mut(&mut self) -> std::slice::IterMut<'_, Exception> {
        self.entries.iter_mut()
    }

    /// Put saved copies back in place, matching on `entry_no`.
    pub(crate) fn restore(&mut self, saved: Vec<Exception>) {
        for entry in saved {
            if let Some(slot) = self.entries.get_mut(entry.entry_no) {
                *slot = entry;
            }
        }
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Exception;
    type IntoIter = std::slice::Iter<'a, Exception>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_record_assigns_sequential_numbers() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.record("teh", ReasonCode::NotInDict, 1, None, "ann", now()), 0);
        assert_eq!(ledger.record("the", ReasonCode::Duplicate, 4, None, "ann", now()), 1);

        let entry = ledger.get(1).unwrap();
        assert_eq!(entry.entry_no, 1);
        assert_eq!(entry.status, Status::NotReviewed);
        assert_eq!(entry.created_by, "ann");
        assert_eq!(entry.created_at, entry.last_modified);
        assert!(entry.replacement.is_empty());
    }

    #[test]
    fn test_similar_matches_word_and_reason() {
        let mut ledger = Ledger::new();
        ledger.record("teh", ReasonCode::NotInDict, 1, None, "ann", now());
        ledger.record("teh", ReasonCode::NotCapital, 2, None, "ann", now());
        ledger.record("teh", ReasonCode::NotInDict, 3, None, "ann", now());

        let numbers: Vec<usize> = ledger
            .similar("teh", ReasonCode::NotInDict)
            .map(|e| e.entry_no)
            .collect();
        assert_eq!(numbers, vec![0, 2]);
    }

    #[test]
    fn test_display_texts() {
        assert_eq!(ReasonCode::NotInDict.to_string(), "Not found in dictionaries");
        assert_eq!(
            Status::AddedToProjectDictionary.to_string(),
            "Added to the dictionary"
        );
        assert_eq!(
            serde_json::to_string(&Status::AddedToProjectDictionary).unwrap(),
            "\"ADDED_PROJ_DIC\""
        );
        assert_eq!(
            serde_json::to_string(&ReasonCode::BlankSpace).unwrap(),
            "\"BLANK_SPACE\""
        );
    }
}
