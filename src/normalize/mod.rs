//! Response normalization: any agent response body in, conversational text out.
//!
//! Normalization runs in three stages:
//! 1. [`ResponseShape::resolve`] picks the text-bearing field out of the body.
//! 2. [`clean_text`] tokenizes that text into frames, keeps text frames and
//!    prose, and drops metadata, including bare pairs inside text frames.
//! 3. [`normalize_text`] rejects results that are too short or still carry
//!    tool metadata, falling back to a natural-language sentence from the raw
//!    text or to [`FALLBACK_REPLY`].
//!
//! An empty body normalizes to an empty string; every other body normalizes
//! to presentable text.

pub mod frames;
pub mod shape;

use std::sync::OnceLock;

use agent_contract::ResponseBody;
use regex::Regex;

pub use frames::{strip_metadata_pairs, tokenize, Frame};
pub use shape::ResponseShape;

/// Cleaned replies shorter than this are treated as unusable.
pub const MIN_REPLY_CHARS: usize = 10;

/// Reply used when no presentable text can be recovered.
pub const FALLBACK_REPLY: &str = "I've retrieved the weather information for you. The current conditions are available, but I'm having trouble formatting the response properly. Please try asking again.";

const RESIDUAL_METADATA: &[&str] = &["toolCallId", "result:"];

/// Normalizes a response body. Returns an empty string only for empty bodies.
pub fn normalize_response(body: &ResponseBody) -> String {
    match ResponseShape::resolve(body) {
        ResponseShape::Empty => String::new(),
        shape => normalize_text(&shape.into_text()),
    }
}

/// Cleans `raw` and validates the result, recovering a reply when cleanup
/// leaves nothing usable.
pub fn normalize_text(raw: &str) -> String {
    let cleaned = clean_text(raw);
    if is_presentable(&cleaned) {
        return cleaned;
    }

    natural_sentence(raw).unwrap_or_else(|| FALLBACK_REPLY.to_string())
}

/// Removes wire-format frames and metadata from `raw`, keeping reply text.
///
/// Text frames keep their quotes and lose only bare metadata pairs. In prose
/// between frames, braces and bare quotes are dropped, escaped quotes and
/// newlines are unescaped, and commas left dangling by removed metadata are
/// dropped. Whitespace is collapsed and trimmed last.
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for frame in tokenize(raw) {
        match frame {
            Frame::Text(text) => out.push_str(&strip_metadata_pairs(&text)),
            Frame::Plain(text) => push_cleaned_prose(&mut out, &text),
            Frame::Metadata { .. } => out.push(' '),
        }
    }
    collapse_whitespace(&out)
}

fn push_cleaned_prose(out: &mut String, prose: &str) {
    let mut chars = prose.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some('"') => {
                    chars.next();
                    out.push('"');
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                _ => out.push('\\'),
            },
            '"' | '{' | '}' => out.push(' '),
            ',' => {
                let dangling = out
                    .chars()
                    .next_back()
                    .map_or(true, |prev| prev.is_whitespace() || prev == ',');
                if !dangling {
                    out.push(',');
                }
            }
            other => out.push(other),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_presentable(cleaned: &str) -> bool {
    cleaned.chars().count() >= MIN_REPLY_CHARS
        && !RESIDUAL_METADATA
            .iter()
            .any(|token| cleaned.contains(token))
}

fn natural_sentence_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)(?:The current weather|The weather|It's|It is|Currently|Today|Right now)[^}]*")
            .expect("natural sentence regex must compile")
    })
}

/// First weather-style sentence in `raw`, stripped of braces and commas.
fn natural_sentence(raw: &str) -> Option<String> {
    let found = natural_sentence_regex().find(raw)?;
    let stripped = found
        .as_str()
        .chars()
        .map(|c| if matches!(c, '{' | '}' | ',') { ' ' } else { c })
        .collect::<String>();
    let sentence = collapse_whitespace(&stripped);
    (!sentence.is_empty()).then_some(sentence)
}
