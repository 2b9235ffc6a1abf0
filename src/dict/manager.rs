use crate::checker::dictionary::{
    parse_word_list, Dictionaries, GenericDictionary, ProjectDictionary,
};
use crate::config::Config;
use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const PROJECT_DICTIONARY_FILE: &str = "project_dictionary.txt";

/// Where dictionaries live under a data directory:
///
/// ```text
/// <data>/dictionaries/<language>.dict   compiled generic dictionary
/// <data>/dictionaries/<language>.txt    plain generic word list
/// <data>/projects/<project>/project_dictionary.txt
/// ```
pub struct DictionaryStore {
    root: PathBuf,
}

pub struct DictionaryInfo {
    pub language: String,
    pub path: PathBuf,
    pub word_count: usize,
    pub size_bytes: u64,
}

impl DictionaryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let root = config.data_dir().context("Failed to get data directory")?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dictionaries_dir(&self) -> PathBuf {
        self.root.join("dictionaries")
    }

    fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// The generic dictionary file for `language`, preferring a compiled set.
    pub fn generic_path(&self, language: &str) -> Option<PathBuf> {
        let dir = self.dictionaries_dir();
        ["dict", "txt"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", language, ext)))
            .find(|path| path.exists())
    }

    pub fn project_path(&self, project: &str) -> PathBuf {
        self.projects_dir().join(project).join(PROJECT_DICTIONARY_FILE)
    }

    pub fn load_generic(&self, language: &str) -> Result<GenericDictionary> {
        let path = self.generic_path(language).with_context(|| {
            format!(
                "No dictionary installed for {}. Run `proofdesk dict build {} <WORDLIST>` first.",
                language, language
            )
        })?;
        GenericDictionary::load_from_path(&path)
    }

    /// A project with no dictionary file yet starts out empty.
    pub fn load_project(&self, project: &str) -> Result<ProjectDictionary> {
        let path = self.project_path(project);
        if !path.exists() {
            return Ok(ProjectDictionary::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read project dictionary: {}", path.display()))?;
        ProjectDictionary::parse(&content)
            .with_context(|| format!("Failed to parse project dictionary: {}", path.display()))
    }

    /// Load the dictionary pair for a project in a language.
    pub fn load(&self, project: &str, language: &str) -> Result<Dictionaries> {
        let generic = self.load_generic(language)?;
        let project_dict = self.load_project(project)?;
        debug!(
            language,
            project,
            generic = generic.len(),
            project_words = project_dict.len(),
            "dictionaries loaded"
        );
        Ok(Dictionaries::new(generic, project_dict))
    }

    pub fn save_project(&self, project: &str, dictionary: &ProjectDictionary) -> Result<PathBuf> {
        let path = self.project_path(project);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create project directory")?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to write project dictionary: {}", path.display()))?;
        dictionary
            .write_to(BufWriter::new(file))
            .with_context(|| format!("Failed to write project dictionary: {}", path.display()))?;
        Ok(path)
    }

    /// Compile a word list file into `<language>.dict`.
    pub fn build(&self, language: &str, word_list: &Path) -> Result<(PathBuf, usize)> {
        let content = fs::read_to_string(word_list)
            .with_context(|| format!("Failed to read word list: {}", word_list.display()))?;
        let words = parse_word_list(&content);

        let dir = self.dictionaries_dir();
        fs::create_dir_all(&dir).context("Failed to create dictionary directory")?;
        let path = dir.join(format!("{}.dict", language));
        let count = GenericDictionary::build_from_words(&words, &path)?;
        Ok((path, count))
    }

    pub fn languages(&self) -> Result<Vec<DictionaryInfo>> {
        let dir = self.dictionaries_dir();
        let mut found = Vec::new();
        if !dir.exists() {
            return Ok(found);
        }

        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if !matches!(ext, Some("dict") | Some("txt")) {
                continue;
            }
            let language = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();
            let size_bytes = fs::metadata(&path)?.len();
            let word_count = GenericDictionary::load_from_path(&path)
                .map(|d| d.len())
                .unwrap_or(0);
            found.push(DictionaryInfo {
                language,
                path,
                word_count,
                size_bytes,
            });
        }

        found.sort_by(|a, b| a.language.cmp(&b.language).then(a.path.cmp(&b.path)));
        Ok(found)
    }

    /// Projects that have a dictionary file, sorted by name.
    pub fn projects(&self) -> Vec<String> {
        let mut projects: Vec<String> = WalkDir::new(self.projects_dir())
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() == PROJECT_DICTIONARY_FILE)
            .filter_map(|entry| {
                entry
                    .path()
                    .parent()
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .collect();
        projects.sort();
        projects
    }
}

pub fn list_dictionaries(store: &DictionaryStore) -> Result<()> {
    let languages = store.languages()?;

    if languages.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to install one.",
            "proofdesk dict build en_GB words.txt".cyan()
        );
    } else {
        println!("{}", "Installed dictionaries:".bold());
        println!();
        for info in &languages {
            println!(
                "  {} {} ({}, {})",
                "✓".green(),
                info.language.cyan().bold(),
                format!("{} words", info.word_count).dimmed(),
                format!("{}KB", info.size_bytes / 1024).dimmed()
            );
        }
    }

    let projects = store.projects();
    if !projects.is_empty() {
        println!();
        println!("{}", "Projects:".bold());
        for project in &projects {
            let words = store.load_project(project).map(|d| d.len()).unwrap_or(0);
            println!(
                "  {} {}",
                project.cyan(),
                format!("({} words)", words).dimmed()
            );
        }
    }

    println!();
    println!(
        "Data directory: {}",
        store.root().display().to_string().dimmed()
    );

    Ok(())
}

pub fn build_dictionary(store: &DictionaryStore, language: &str, word_list: &Path) -> Result<()> {
    println!(
        "{} dictionary for {} from {}...",
        "Building".cyan().bold(),
        language.yellow(),
        word_list.display().to_string().dimmed()
    );

    let (path, count) = store.build(language, word_list)?;

    println!("Found {} words", count.to_string().yellow());
    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        path.display().to_string().cyan()
    );

    Ok(())
}

pub fn add_word(store: &DictionaryStore, project: &str, word: &str, added_by: &str) -> Result<()> {
    let mut dictionary = store.load_project(project)?;
    if !dictionary.insert(word, added_by, Local::now().naive_local()) {
        anyhow::bail!("'{}' is already in the {} project dictionary", word, project);
    }
    let path = store.save_project(project, &dictionary)?;

    println!(
        "{} Added {} to {} ({} words)",
        "✓".green().bold(),
        word.yellow(),
        path.display().to_string().cyan(),
        dictionary.len()
    );
    Ok(())
}

pub fn show_info(store: &DictionaryStore, language: &str) -> Result<()> {
    let Some(path) = store.generic_path(language) else {
        println!(
            "{} Dictionary for {} not found.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to install it.",
            format!("proofdesk dict build {} <WORDLIST>", language).cyan()
        );
        return Ok(());
    };

    let metadata = fs::metadata(&path)?;
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("dict") => "FST (Finite State Transducer)",
        _ => "Word list",
    };

    println!("{}", format!("Dictionary: {}", language).bold());
    println!("  Path: {}", path.display());
    println!("  Size: {} KB", metadata.len() / 1024);
    println!("  Format: {}", format);

    match GenericDictionary::load_from_path(&path) {
        Ok(dict) => println!("  Words: {}", dict.len().to_string().yellow()),
        Err(e) => println!("  {}: {}", "Error loading dictionary".red(), e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_build_and_load_pair() {
        let dir = tempdir().unwrap();
        let store = DictionaryStore::new(dir.path());
        let list = dir.path().join("words.txt");
        fs::write(&list, "cat\ndog\n# comment\nhorse,animal\n").unwrap();

        let (path, count) = store.build("en_GB", &list).unwrap();
        assert_eq!(count, 3);
        assert!(path.ends_with("dictionaries/en_GB.dict"));

        let dictionaries = store.load("atlas", "en_GB").unwrap();
        assert!(dictionaries.knows("horse"));
        assert!(dictionaries.project.is_empty());
    }

    #[test]
    fn test_plain_word_list_is_accepted() {
        let dir = tempdir().unwrap();
        let store = DictionaryStore::new(dir.path());
        fs::create_dir_all(dir.path().join("dictionaries")).unwrap();
        fs::write(dir.path().join("dictionaries/fr_FR.txt"), "chat\nchien\n").unwrap();

        let generic = store.load_generic("fr_FR").unwrap();
        assert!(generic.contains("chien"));
        assert!(store.load_generic("de_DE").is_err());
    }

    #[test]
    fn test_project_dictionary_persists() {
        let dir = tempdir().unwrap();
        let store = DictionaryStore::new(dir.path());
        let at = NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let mut project = ProjectDictionary::new();
        project.insert("Gandalf", "ann", at);
        store.save_project("atlas", &project).unwrap();
        store.save_project("zephyr", &ProjectDictionary::new()).unwrap();

        assert_eq!(store.load_project("atlas").unwrap(), project);
        assert_eq!(store.projects(), vec!["atlas", "zephyr"]);
    }

    #[test]
    fn test_languages_listing() {
        let dir = tempdir().unwrap();
        let store = DictionaryStore::new(dir.path());
        assert!(store.languages().unwrap().is_empty());

        let list = dir.path().join("words.txt");
        fs::write(&list, "one\ntwo\n").unwrap();
        store.build("en_US", &list).unwrap();

        let languages = store.languages().unwrap();
        assert_eq!(languages.len(), 1);
        assert_eq!(languages[0].language, "en_US");
        assert_eq!(languages[0].word_count, 2);
    }
}
