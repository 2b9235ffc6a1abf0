use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use fst::{Set, SetBuilder, Streamer};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// `dd/MM/yyyy HH:mm:ss`, the stamp format of dictionary and ledger entries.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const PROJECT_HEADER: &str = "Correct Word, Added By, Added At";

/// Language-wide word list. Lookups are case-sensitive.
pub struct GenericDictionary {
    set: Set<Vec<u8>>,
}

impl GenericDictionary {
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        sorted.sort();
        sorted.dedup();

        let set = Set::from_iter(sorted).context("Failed to build dictionary")?;
        Ok(Self { set })
    }

    /// Parse a word list: the first comma-separated field of each line is the
    /// word; blank lines and `#` comments are skipped.
    pub fn from_word_list(content: &str) -> Result<Self> {
        Self::from_words(parse_word_list(content))
    }

    /// Load a compiled `.dict` set, or a plain word list for any other extension.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.extension().and_then(|e| e.to_str()) == Some("dict") {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;
            let set = Set::new(bytes).context("Failed to parse dictionary")?;
            return Ok(Self { set });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read word list: {}", path.display()))?;
        Self::from_word_list(&content)
    }

    /// Compile a word list into an fst set file.
    pub fn build_from_words(words: &[String], output_path: &Path) -> Result<usize> {
        let mut sorted_words = words.to_vec();
        sorted_words.retain(|w| !w.is_empty());
        sorted_words.sort();
        sorted_words.dedup();

        let file = File::create(output_path)
            .with_context(|| format!("Failed to create dictionary: {}", output_path.display()))?;

        let writer = BufWriter::new(file);
        let mut builder = SetBuilder::new(writer).context("Failed to create FST builder")?;

        for word in &sorted_words {
            builder
                .insert(word.as_bytes())
                .context("Failed to insert word into dictionary")?;
        }

        builder.finish().context("Failed to finalize dictionary")?;

        Ok(sorted_words.len())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::with_capacity(self.set.len());
        let mut stream = self.set.stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                words.push(word);
            }
        }

        words
    }
}

pub fn parse_word_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split(',').next())
        .map(|word| word.trim().to_string())
        .filter(|word| !word.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub added_by: String,
    pub last_modified: NaiveDateTime,
}

/// Words accepted for one project, with who added them and when.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDictionary {
    entries: BTreeMap<String, ProjectEntry>,
}

impl ProjectDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<&ProjectEntry> {
        self.entries.get(word)
    }

    /// Add a word. Returns `false` and leaves the dictionary untouched when
    /// the word is already present.
    pub fn insert(&mut self, word: &str, added_by: &str, at: NaiveDateTime) -> bool {
        match self.entries.entry(word.to_string()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(ProjectEntry {
                    added_by: added_by.to_string(),
                    last_modified: at,
                });
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProjectEntry)> {
        self.entries.iter().map(|(word, entry)| (word.as_str(), entry))
    }

    /// Parse the `word, added by, dd/MM/yyyy HH:mm:ss` file format. The
    /// header line is optional.
    pub fn parse(content: &str) -> Result<Self> {
        let mut dictionary = Self::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line == PROJECT_HEADER {
                continue;
            }

            let mut fields = line.splitn(3, ',').map(str::trim);
            let word = fields.next().unwrap_or_default();
            let added_by = fields.next().unwrap_or_default();
            let stamp = fields.next().unwrap_or_default();

            let at = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).with_context(|| {
                format!(
                    "Invalid timestamp '{}' on line {} of project dictionary",
                    stamp,
                    line_num + 1
                )
            })?;
            dictionary.insert(word, added_by, at);
        }

        Ok(dictionary)
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "{}", PROJECT_HEADER)?;
        for (word, entry) in &self.entries {
            writeln!(
                out,
                "{}, {}, {}",
                word,
                entry.added_by,
                entry.last_modified.format(TIMESTAMP_FORMAT)
            )?;
        }
        out.flush()
    }
}

/// The pair of dictionaries a scan pass checks words against.
pub struct Dictionaries {
    pub generic: GenericDictionary,
    pub project: ProjectDictionary,
}

impl Dictionaries {
    pub fn new(generic: GenericDictionary, project: ProjectDictionary) -> Self {
        Self { generic, project }
    }

    /// Whether either dictionary holds `word` exactly.
    pub fn knows(&self, word: &str) -> bool {
        self.generic.contains(word) || self.project.contains(word)
    }
}
