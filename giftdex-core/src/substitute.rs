//! Term substitution
//!
//! Free text refers to dictionary terms as `|id|`. This module splits text
//! into literal and reference spans and rewrites the references whose id
//! is known; everything else passes through untouched.

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Regex};

use crate::models::{Term, TermDictionary};

/// Default icon width for inline term icons, in pixels
pub const DEFAULT_ICON_WIDTH: u32 = 20;

/// `|id|` where id is one or more ASCII word characters or hyphens
static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\|([A-Za-z0-9_-]+)\|").expect("Failed to compile term reference regex")
});

/// A span of text produced by [`tokenize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text outside any reference
    Literal(&'a str),
    /// A delimited reference; `raw` includes the pipes
    Reference { id: &'a str, raw: &'a str },
}

/// Lazy iterator over the spans of a text
pub struct Tokens<'a> {
    text: &'a str,
    matches: CaptureMatches<'static, 'a>,
    pos: usize,
    pending: Option<Token<'a>>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }
        if self.pos >= self.text.len() {
            return None;
        }

        match self.matches.next() {
            Some(caps) => {
                let whole = caps.get(0)?;
                let id = caps.get(1)?;
                let reference = Token::Reference {
                    id: id.as_str(),
                    raw: whole.as_str(),
                };
                let literal = &self.text[self.pos..whole.start()];
                self.pos = whole.end();
                if literal.is_empty() {
                    Some(reference)
                } else {
                    self.pending = Some(reference);
                    Some(Token::Literal(literal))
                }
            }
            None => {
                let literal = &self.text[self.pos..];
                self.pos = self.text.len();
                Some(Token::Literal(literal))
            }
        }
    }
}

/// Splits `text` into literal and reference spans, left to right.
/// Concatenating the spans (using `raw` for references) gives back `text`.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        text,
        matches: REFERENCE_PATTERN.captures_iter(text),
        pos: 0,
        pending: None,
    }
}

/// Rewrites every known reference with `annotate`; unknown ones stay verbatim
pub fn substitute_with<F>(text: &str, terms: &TermDictionary, mut annotate: F) -> String
where
    F: FnMut(&Term) -> String,
{
    let mut out = String::with_capacity(text.len());
    for token in tokenize(text) {
        match token {
            Token::Literal(literal) => out.push_str(literal),
            Token::Reference { id, raw } => match terms.get(id) {
                Some(term) => out.push_str(&annotate(term)),
                None => out.push_str(raw),
            },
        }
    }
    out
}

/// Icon element followed by the display name
pub fn icon_annotation(term: &Term, icon_width: u32) -> String {
    format!(
        r#"<img src="{}" alt="{}" style="width: {}px; vertical-align: middle;"> {}"#,
        escape_attribute(&term.img),
        escape_attribute(&term.name),
        icon_width,
        term.name
    )
}

/// Replaces references with inline icon markup
pub fn substitute(text: &str, terms: &TermDictionary) -> String {
    substitute_with(text, terms, |term| icon_annotation(term, DEFAULT_ICON_WIDTH))
}

/// Replaces references with the bare display name (terminal output)
pub fn substitute_plain(text: &str, terms: &TermDictionary) -> String {
    substitute_with(text, terms, |term| term.name.clone())
}

/// Ids of all references in `text`, known or not, in order of appearance
pub fn referenced_ids(text: &str) -> Vec<&str> {
    tokenize(text)
        .filter_map(|token| match token {
            Token::Reference { id, .. } => Some(id),
            Token::Literal(_) => None,
        })
        .collect()
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
