use crate::review::ledger::{Exception, ReasonCode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};

const REPORT_STAMP: &str = "%d %b %Y %H:%M:%S";

/// Who produced a report, for what, and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportHeader {
    pub project: String,
    pub chapter: String,
    pub reviewer: String,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub word: String,
    pub reason: ReasonCode,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemainingReport {
    #[serde(flatten)]
    pub header: ReportHeader,
    pub rows: Vec<ReportRow>,
}

impl RemainingReport {
    /// Group unresolved exceptions by word and reason, in order of first
    /// appearance.
    pub fn build<'a, I>(header: ReportHeader, unresolved: I) -> Self
    where
        I: IntoIterator<Item = &'a Exception>,
    {
        let mut order = Vec::new();
        let mut counts: BTreeMap<(String, ReasonCode), usize> = BTreeMap::new();

        for exception in unresolved {
            let key = (exception.incorrect_word.clone(), exception.reason);
            let count = counts.entry(key.clone()).or_insert(0);
            if *count == 0 {
                order.push(key);
            }
            *count += 1;
        }

        let rows = order
            .into_iter()
            .map(|key| {
                let occurrences = counts.get(&key).copied().unwrap_or_default();
                ReportRow {
                    word: key.0,
                    reason: key.1,
                    occurrences,
                }
            })
            .collect();

        Self { header, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_text<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(
            out,
            "{}, {}, Created: {}, {}",
            self.header.project,
            self.header.chapter,
            self.header.reviewer,
            self.header.created.format(REPORT_STAMP)
        )?;
        writeln!(out, "Incorrect Word, Reason Code, Occurrences")?;
        for row in &self.rows {
            writeln!(out, "{}, {}, {}", row.word, row.reason, row.occurrences)?;
        }
        out.flush()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
