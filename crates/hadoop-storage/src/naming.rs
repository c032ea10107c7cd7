//! Upload name generation
//!
//! Every stored name gets a microsecond timestamp token in front of a
//! sanitized stem, because the remote filesystem silently overwrites files
//! that share a name:
//!
//! ```text
//! uploads/My Report!.pdf  ->  uploads/18102026_142501123456_My Report_.pdf
//! ```
//!
//! Spaces are kept in stored names; they are only percent-escaped when a
//! public URL is built (see [`crate::uri`]).

use std::fmt::Debug;

use chrono::{Local, NaiveDateTime, Utc};
use storage_core::{path, Error, Result};

/// Default `max_length` for generated names
pub const DEFAULT_MAX_LENGTH: usize = 100;

/// `DDMMYYYY_HHMMSSmmmmmm`
const TIMESTAMP_FORMAT: &str = "%d%m%Y_%H%M%S%6f";

/// Room kept free for the timestamp token when a name has to be truncated
const RESERVED_LENGTH: usize = 26;

/// Tokens stripped from stems, applied in this order.
/// `\n` and `\r` are the two-character escape sequences, not control characters.
const BLACKLIST: [&str; 13] = [
    ",", ";", ".", "!", "'", ".", "-", "\"", "@", "\\n", "\\r", "?", "_",
];

/// Replace every blacklisted token in `stem` with `replacement`
pub fn clean_name(stem: &str, replacement: &str) -> String {
    BLACKLIST
        .iter()
        .fold(stem.to_string(), |acc, token| acc.replace(token, replacement))
}

/// Map non-ASCII characters to their closest ASCII equivalent
pub fn transliterate(text: &str) -> String {
    deunicode::deunicode(text)
}

/// Clean a stem for use in a generated name
///
/// Transliteration can produce blacklisted characters (`–` becomes `-`,
/// `…` becomes `...`), so the result is cleaned once more.
pub fn sanitize_stem(stem: &str) -> String {
    clean_name(&transliterate(&clean_name(stem, "_")), "_")
}

/// Format the collision-avoidance token for `instant`
pub fn timestamp_token(instant: NaiveDateTime) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Source of the instant used in generated names
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock; UTC when `use_tz` is set, local time otherwise
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    pub use_tz: bool,
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        if self.use_tz {
            Utc::now().naive_utc()
        } else {
            Local::now().naive_local()
        }
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Build a timestamped, sanitized name for `name`
///
/// The stem is cleaned and transliterated, then truncated when it no longer
/// fits next to the token, so that the result stays within `max_length`.
/// `offset` is everything around the stem: prefix, directory, separators
/// and extension. With the default limit of 100 at most `74 - offset` stem
/// characters are kept.
///
/// # Errors
/// Returns [`Error::NameTooLong`] when the prefix, directory and extension
/// alone leave no room under `max_length`.
pub fn available_name(
    name: &str,
    max_length: Option<usize>,
    prefix: &str,
    instant: NaiveDateTime,
) -> Result<String> {
    let (directory, file_name) = path::split(name);
    let (raw_stem, extension) = path::split_ext(file_name);
    let mut stem = sanitize_stem(raw_stem);
    let max_length = max_length.filter(|max| *max > 0);

    let prefix_length = if prefix.is_empty() {
        0
    } else {
        prefix.chars().count() + 1
    };
    let offset = (name.chars().count() + prefix_length).saturating_sub(raw_stem.chars().count());
    let stem_length = stem.chars().count();

    if let Some(max) = max_length {
        if offset + stem_length + RESERVED_LENGTH >= max {
            let keep = max.saturating_sub(RESERVED_LENGTH + offset);
            stem = stem.chars().take(keep).collect();
        }
    }

    let file_name = format!("{}_{}{}", timestamp_token(instant), stem, extension);
    let resolved = path::join(&[prefix, directory, &file_name]);

    match max_length {
        Some(max) if resolved.chars().count() > max => Err(Error::NameTooLong {
            name: name.to_string(),
            max_length: max,
        }),
        _ => Ok(resolved),
    }
}
