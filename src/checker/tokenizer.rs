use crate::document;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// Text of the token emitted for a run of two or more whitespace characters.
pub const BLANK: &str = " ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Punct,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
    /// Byte range of the token in the source line. For a blank token this
    /// covers the whole whitespace run.
    pub span: Range<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Class {
    Space,
    Punct,
    Word,
}

fn classify(grapheme: &str) -> Class {
    let ch = grapheme.chars().next().unwrap_or(' ');
    if document::is_blank(ch) {
        Class::Space
    } else if ch.is_ascii_punctuation() {
        Class::Punct
    } else {
        Class::Word
    }
}

/// Split a line into word runs, punctuation runs and surplus blanks.
///
/// A single whitespace character only separates tokens. A run of two or more
/// becomes one [`BLANK`] token so the extra spacing can be reported.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut run: Option<(Class, usize)> = None;
    let mut blanks: Option<(usize, usize)> = None;

    for (offset, grapheme) in line.grapheme_indices(true) {
        let class = classify(grapheme);

        if class == Class::Space {
            if let Some((kind, start)) = run.take() {
                tokens.push(token(line, kind, start..offset));
            }
            match blanks.as_mut() {
                Some((_, count)) => *count += 1,
                None => blanks = Some((offset, 1)),
            }
            continue;
        }

        if let Some((start, count)) = blanks.take() {
            push_blank(&mut tokens, start..offset, count);
        }

        match run {
            Some((kind, _)) if kind == class => {}
            Some((kind, start)) => {
                tokens.push(token(line, kind, start..offset));
                run = Some((class, offset));
            }
            None => run = Some((class, offset)),
        }
    }

    if let Some((kind, start)) = run {
        tokens.push(token(line, kind, start..line.len()));
    }
    if let Some((start, count)) = blanks {
        push_blank(&mut tokens, start..line.len(), count);
    }

    tokens
}

fn token(line: &str, class: Class, span: Range<usize>) -> Token<'_> {
    let kind = match class {
        Class::Punct => TokenKind::Punct,
        _ => TokenKind::Word,
    };
    Token {
        text: &line[span.clone()],
        kind,
        span,
    }
}

fn push_blank(tokens: &mut Vec<Token<'_>>, span: Range<usize>, count: usize) {
    if count > 1 {
        tokens.push(Token {
            text: BLANK,
            kind: TokenKind::Blank,
            span,
        });
    }
}
