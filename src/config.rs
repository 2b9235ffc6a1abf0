use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub project: Option<String>,

    #[serde(default)]
    pub reviewer: Option<String>,

    /// Overrides the platform data directory holding dictionaries.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub checks: CheckOverrides,
}

fn default_language() -> String {
    "en_GB".to_string()
}

fn enabled() -> bool {
    true
}

/// The named rule toggles of a scan pass. Every check is on unless
/// configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Checks {
    #[serde(default = "enabled")]
    pub brackets: bool,
    #[serde(default = "enabled")]
    pub quotes: bool,
    #[serde(default = "enabled")]
    pub blanks: bool,
    #[serde(default = "enabled")]
    pub auto_remove_blanks: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            brackets: true,
            quotes: true,
            blanks: true,
            auto_remove_blanks: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Brackets,
    Quotes,
    Blanks,
    AutoRemoveBlanks,
}

impl FromStr for Check {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "brackets" => Ok(Check::Brackets),
            "quotes" => Ok(Check::Quotes),
            "blanks" => Ok(Check::Blanks),
            "autoremoveblanks" => Ok(Check::AutoRemoveBlanks),
            _ => Err(format!("Unknown check: {}", s)),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Brackets => write!(f, "Brackets"),
            Check::Quotes => write!(f, "Quotes"),
            Check::Blanks => write!(f, "Blanks"),
            Check::AutoRemoveBlanks => write!(f, "AutoRemoveBlanks"),
        }
    }
}

impl Checks {
    pub fn set(&mut self, check: Check, on: bool) {
        match check {
            Check::Brackets => self.brackets = on,
            Check::Quotes => self.quotes = on,
            Check::Blanks => self.blanks = on,
            Check::AutoRemoveBlanks => self.auto_remove_blanks = on,
        }
    }

    pub fn is_enabled(&self, check: Check) -> bool {
        match check {
            Check::Brackets => self.brackets,
            Check::Quotes => self.quotes,
            Check::Blanks => self.blanks,
            Check::AutoRemoveBlanks => self.auto_remove_blanks,
        }
    }

    /// Build from `(name, enabled)` pairs; unnamed checks stay enabled.
    pub fn from_named<'a, I>(options: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut checks = Self::default();
        for (name, on) in options {
            checks.set(name.parse()?, on);
        }
        Ok(checks)
    }
}

/// Check settings as written in a config file. A field left out defers to
/// the layer below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brackets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blanks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_remove_blanks: Option<bool>,
}

impl CheckOverrides {
    pub fn set(&mut self, check: Check, on: bool) {
        let slot = match check {
            Check::Brackets => &mut self.brackets,
            Check::Quotes => &mut self.quotes,
            Check::Blanks => &mut self.blanks,
            Check::AutoRemoveBlanks => &mut self.auto_remove_blanks,
        };
        *slot = Some(on);
    }

    /// Layer `other` on top of `self`.
    fn merge(self, other: Self) -> Self {
        Self {
            brackets: other.brackets.or(self.brackets),
            quotes: other.quotes.or(self.quotes),
            blanks: other.blanks.or(self.blanks),
            auto_remove_blanks: other.auto_remove_blanks.or(self.auto_remove_blanks),
        }
    }

    pub fn resolve(&self) -> Checks {
        let defaults = Checks::default();
        Checks {
            brackets: self.brackets.unwrap_or(defaults.brackets),
            quotes: self.quotes.unwrap_or(defaults.quotes),
            blanks: self.blanks.unwrap_or(defaults.blanks),
            auto_remove_blanks: self
                .auto_remove_blanks
                .unwrap_or(defaults.auto_remove_blanks),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            project: None,
            reviewer: None,
            data_dir: None,
            checks: CheckOverrides::default(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: Option<String>,
        project: Option<String>,
        reviewer: Option<String>,
        data_dir: Option<PathBuf>,
        disabled: &[Check],
    ) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        let local_path = PathBuf::from(".proofdesk.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        if let Some(language) = language {
            config.language = language;
        }
        if project.is_some() {
            config.project = project;
        }
        if reviewer.is_some() {
            config.reviewer = reviewer;
        }
        if data_dir.is_some() {
            config.data_dir = data_dir;
        }
        for check in disabled {
            config.checks.set(*check, false);
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        if other.language != default_language() {
            self.language = other.language;
        }
        if other.project.is_some() {
            self.project = other.project;
        }
        if other.reviewer.is_some() {
            self.reviewer = other.reviewer;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        self.checks = self.checks.merge(other.checks);
        self
    }

    /// The effective checks once every layer has been applied.
    pub fn checks(&self) -> Checks {
        self.checks.resolve()
    }

    /// Identity stamped on exceptions and dictionary entries.
    pub fn reviewer(&self) -> &str {
        self.reviewer.as_deref().unwrap_or("unknown")
    }

    pub fn project(&self) -> &str {
        self.project.as_deref().unwrap_or("default")
    }

    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            ProjectDirs::from("", "", "proofdesk").map(|dirs| dirs.data_dir().to_path_buf())
        })
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "proofdesk").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
