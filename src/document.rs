use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref LINE_BREAK: Regex = Regex::new(r"\r\n|[\r\n]").unwrap();
    static ref HORIZONTAL_BLANKS: Regex = Regex::new(r"[\s&&[^\r\n]]+").unwrap();
}

/// Line terminator of an imported chapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    fn detect(text: &str) -> Self {
        match LINE_BREAK.find(text).map(|m| m.as_str()) {
            Some("\r\n") => LineEnding::CrLf,
            Some("\r") => LineEnding::Cr,
            _ => LineEnding::Lf,
        }
    }
}

/// The chapter being reviewed, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBuffer {
    lines: Vec<String>,
    /// Terminator used when writing the chapter back out.
    #[serde(default)]
    line_ending: LineEnding,
    #[serde(default)]
    trailing_newline: bool,
}

impl TextBuffer {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    /// Split converted text into lines on `\r\n`, `\r` or `\n`.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }

        let mut lines: Vec<String> = LINE_BREAK.split(text).map(str::to_string).collect();
        // A trailing newline does not open another line.
        let trailing_newline = lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty());
        if trailing_newline {
            lines.pop();
        }

        Self {
            lines,
            line_ending: LineEnding::detect(text),
            trailing_newline,
        }
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [String] {
        &mut self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The whole buffer joined with `\n`.
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    /// The buffer as a file: lines joined with the imported line ending,
    /// plus the final newline if the source had one.
    pub fn to_text(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut text = self.lines.join(ending);
        if self.trailing_newline && !self.lines.is_empty() {
            text.push_str(ending);
        }
        text
    }

    /// Reduce every run of in-line whitespace to a single space.
    pub fn collapse_blanks(&mut self) {
        for line in &mut self.lines {
            *line = collapse_blanks(line);
        }
    }
}

/// Whitespace that can sit inside a line. Matches the class collapsed by
/// [`collapse_blanks`].
pub(crate) fn is_blank(ch: char) -> bool {
    ch.is_whitespace() && !matches!(ch, '\r' | '\n')
}

pub(crate) fn collapse_blanks(line: &str) -> String {
    HORIZONTAL_BLANKS.replace_all(line, " ").into_owned()
}

impl<S: Into<String>> FromIterator<S> for TextBuffer {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_splitting() {
        let buffer = TextBuffer::from_text("First line\r\nSecond line\rThird\nFourth\n");
        assert_eq!(
            buffer.lines(),
            &["First line", "Second line", "Third", "Fourth"]
        );
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let buffer = TextBuffer::from_text("One\n\nTwo");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.lines()[1], "");
        assert!(TextBuffer::from_text("").is_empty());
    }

    #[test]
    fn test_contents_round_trip() {
        let buffer: TextBuffer = ["The cat.", "", "A dog."].into_iter().collect();
        assert_eq!(buffer.contents(), "The cat.\n\nA dog.");
    }

    #[test]
    fn test_collapse_blanks() {
        let mut buffer: TextBuffer = ["Hello  world", "tab\t\there", "fine line"]
            .into_iter()
            .collect();
        buffer.collapse_blanks();
        assert_eq!(buffer.lines(), &["Hello world", "tab here", "fine line"]);
    }

    #[test]
    fn test_file_layout_is_preserved() {
        for text in ["One\r\nTwo\r\n", "One\nTwo", "One\rTwo\r", "\n"] {
            assert_eq!(TextBuffer::from_text(text).to_text(), text);
        }

        let buffer = TextBuffer::from_text("A  line\r\nB\r\n");
        assert_eq!(buffer.line_ending(), LineEnding::CrLf);
        assert_eq!(buffer.contents(), "A  line\nB");

        let built: TextBuffer = ["x", "y"].into_iter().collect();
        assert_eq!(built.to_text(), "x\ny");
    }

    #[test]
    fn test_collapse_unicode_blanks() {
        assert_eq!(collapse_blanks("Hello\u{a0}\u{a0}world"), "Hello world");
        assert_eq!(collapse_blanks("em\u{2003} \tspace"), "em space");
        assert!(is_blank('\u{a0}'));
        assert!(!is_blank('\n'));
    }
}
