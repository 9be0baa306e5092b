//! Plain-text and markup segmentation into identified words.
//!
//! The playback engine never calls this; hosts use it to turn a file or a
//! decoded share token into a [`Document`].

mod html_entities;
mod markup;

use alloc::{format, string::String, vec::Vec};

use log::debug;

use crate::document::{Document, Sentence, Word};

const CLOSERS: [char; 8] = ['"', '\'', '\u{201D}', '\u{2019}', ')', ']', '\u{BB}', '*'];

const ABBREVIATIONS: [&str; 19] = [
    "mr", "mrs", "ms", "dr", "sr", "jr", "prof", "gov", "sgt", "lt", "capt", "rev", "hon", "vs",
    "etc", "approx", "dept", "inc", "ltd",
];

/// Abbreviations that are also plain words; they only hold a sentence open
/// when a number follows (`No. 5`, `vol. 2`).
const NUMBERED_ABBREVIATIONS: [&str; 5] = ["no", "vol", "fig", "ch", "pt"];

/// Segment `raw` text or markup into sentences of words with ids
/// `word-0`, `word-1`, ... in reading order.
pub fn segment(raw: &str, title: Option<&str>) -> Document {
    let mut sentences = Vec::new();
    let mut words: Vec<Word> = Vec::new();
    let mut next_id = 0usize;

    for paragraph in markup::paragraphs(raw) {
        let mut texts = paragraph.split_whitespace().peekable();
        while let Some(text) = texts.next() {
            words.push(Word::new(format!("word-{next_id}"), text));
            next_id += 1;
            if ends_sentence(text, texts.peek().copied()) {
                sentences.push(Sentence::new(core::mem::take(&mut words)));
            }
        }
        if !words.is_empty() {
            sentences.push(Sentence::new(core::mem::take(&mut words)));
        }
    }

    debug!(
        "segment: {} words in {} sentences",
        next_id,
        sentences.len()
    );
    Document::new(title.map(String::from), sentences)
}

/// Whether `word` closes a sentence, given the word after it if any.
pub fn ends_sentence(word: &str, next: Option<&str>) -> bool {
    let core = word.trim_end_matches(CLOSERS);
    let Some(last) = core.chars().last() else {
        return false;
    };

    match last {
        '!' | '?' | '\u{2026}' => true,
        '.' => {
            if core.ends_with("..") {
                return true;
            }
            let stem = core
                .trim_end_matches('.')
                .trim_start_matches(|ch: char| !ch.is_alphanumeric());
            !is_initial(stem) && !is_abbreviation(stem, next)
        }
        _ => false,
    }
}

fn is_initial(stem: &str) -> bool {
    let mut chars = stem.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if ch.is_alphabetic())
}

fn is_abbreviation(stem: &str, next: Option<&str>) -> bool {
    let is_stem = |abbr: &&str| abbr.eq_ignore_ascii_case(stem);
    if ABBREVIATIONS.iter().any(is_stem) {
        return true;
    }

    let number_follows = next
        .and_then(|word| word.chars().next())
        .is_some_and(|ch| ch.is_ascii_digit());
    number_follows && NUMBERED_ABBREVIATIONS.iter().any(is_stem)
}
