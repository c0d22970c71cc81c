//! Optional entity linking for captured text.
//!
//! # Responsibility
//! - Wrap capitalized words and phrases in `[[...]]` note links.
//!
//! # Invariants
//! - Text without capitalized words is returned unchanged.
//! - Existing `[[...]]` links are never nested.
//! - Trailing punctuation stays outside the link and ends a phrase.

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{Lu}[\p{L}\p{N}'\-]*)([.,;:!?]*)$").expect("valid capitalized word regex")
});

/// Wraps runs of capitalized words in `[[...]]` links.
///
/// "Meeting with John Smith." becomes "[[Meeting]] with [[John Smith]]."
/// Whitespace between words is normalized to single spaces when any link is
/// produced.
pub fn link_entities(text: &str) -> String {
    if text.contains("[[") || !text.split_whitespace().any(|w| WORD_RE.is_match(w)) {
        return text.to_string();
    }

    let mut out: Vec<String> = Vec::new();
    let mut phrase: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        match WORD_RE.captures(word) {
            Some(caps) => {
                let core = caps.get(1).map_or("", |m| m.as_str());
                let tail = caps.get(2).map_or("", |m| m.as_str());
                phrase.push(core);
                if !tail.is_empty() {
                    out.push(format!("[[{}]]{tail}", phrase.join(" ")));
                    phrase.clear();
                }
            }
            None => {
                flush(&mut phrase, &mut out);
                out.push(word.to_string());
            }
        }
    }
    flush(&mut phrase, &mut out);
    out.join(" ")
}

fn flush(phrase: &mut Vec<&str>, out: &mut Vec<String>) {
    if !phrase.is_empty() {
        out.push(format!("[[{}]]", phrase.join(" ")));
        phrase.clear();
    }
}
