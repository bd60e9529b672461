//! crates/life_script_core/src/report_parser.rs
//!
//! Extracts the structured report out of the free text produced by the
//! language model. The text carries a fixed, ordered sequence of sentinel
//! markers; each section runs from its marker to the next one in sequence.
//!
//! The same extraction is used for partial renders (a growing prefix of the
//! stream) and for the final pass, so both always agree on finished sections.

use crate::domain::{ParsedReport, ShareCopy};
use regex::Regex;
use std::sync::LazyLock;

pub const CONTENT_START: &str = "[CONTENT_START]";
pub const SUGGESTIONS: &str = "[SUGGESTIONS]";
pub const TIPS: &str = "[TIPS]";
pub const WARNINGS: &str = "[WARNINGS]";
pub const COPY_MEME: &str = "[COPY_MEME]";
pub const COPY_LITERARY: &str = "[COPY_LITERARY]";
pub const COPY_SIMPLE: &str = "[COPY_SIMPLE]";

/// The markers in the order the model is instructed to emit them.
pub const MARKERS: [&str; 7] = [
    CONTENT_START,
    SUGGESTIONS,
    TIPS,
    WARNINGS,
    COPY_MEME,
    COPY_LITERARY,
    COPY_SIMPLE,
];

/// Separator between items of a list section.
pub const LIST_DELIMITER: char = '|';

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|#|__+").expect("markup pattern is a valid regex"));

/// Removes bold markers, header hashes and underline runs, then trims.
///
/// Removing one token can join its neighbours into a new one (`_**_`), so the
/// pass repeats until nothing changes. That makes the function idempotent.
pub fn strip_markup(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = MARKUP.replace_all(&current, "").trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// The raw text of the section opened by `start`, ending at `end` when that
/// marker follows it. Missing start marker gives an empty section.
fn section<'a>(text: &'a str, start: &str, end: Option<&str>) -> &'a str {
    let Some(index) = text.find(start) else {
        return "";
    };
    let rest = &text[index + start.len()..];
    let body = match end.and_then(|end| rest.find(end)) {
        Some(end_index) => &rest[..end_index],
        None => rest,
    };
    body.trim()
}

fn text_section(text: &str, start: &str, end: Option<&str>) -> String {
    strip_markup(section(text, start, end))
}

fn list_section(text: &str, start: &str, end: Option<&str>) -> Vec<String> {
    section(text, start, end)
        .split(LIST_DELIMITER)
        .map(strip_markup)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parses whatever text is available. Never fails; any input, including an
/// empty string, yields a best-effort structure.
pub fn parse_report(text: &str) -> ParsedReport {
    ParsedReport {
        narrative: text_section(text, CONTENT_START, Some(SUGGESTIONS)),
        suggestions: list_section(text, SUGGESTIONS, Some(TIPS)),
        tips: list_section(text, TIPS, Some(WARNINGS)),
        warnings: list_section(text, WARNINGS, Some(COPY_MEME)),
        share_copy: ShareCopy {
            meme: text_section(text, COPY_MEME, Some(COPY_LITERARY)),
            literary: text_section(text, COPY_LITERARY, Some(COPY_SIMPLE)),
            simple: text_section(text, COPY_SIMPLE, None),
        },
    }
}

/// Append-only buffer over a report stream.
///
/// `snapshot` may be called at any point to render progress; `finish`
/// consumes the accumulator, so a finalized report is never re-parsed.
#[derive(Debug, Default)]
pub struct ReportAccumulator {
    text: String,
    fragments: usize,
}

impl ReportAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        self.fragments += 1;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of fragments pushed so far.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn snapshot(&self) -> ParsedReport {
        parse_report(&self.text)
    }

    pub fn finish(self) -> ParsedReport {
        parse_report(&self.text)
    }
}
