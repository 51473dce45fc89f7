//! Hierarchical topic numbering.
//!
//! Topics are addressed slip-box style: roots are numbered `1`, `2`, `3`, and
//! each level below alternates between a letter and a number, so the first
//! child of `1` is `1a`, its first child `1a1`, then `1a1a`, and so on.
//! Numbers are handed out once and never compacted, which keeps them stable
//! enough to cite outside the app.

use crate::defaults::{FIRST_TOPIC_LETTER, FIRST_TOPIC_NUMBER};
use crate::error::{Error, Result};

/// The parent a new topic is being filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef<'a> {
    pub number: &'a str,
    pub level: i32,
}

/// Compute the number for a new topic.
///
/// `siblings` are the numbers of the topics that already share the intended
/// parent (the existing roots when `parent` is `None`).
pub fn next_topic_number<'s, I>(parent: Option<ParentRef<'_>>, siblings: I) -> Result<String>
where
    I: IntoIterator<Item = &'s str>,
{
    let Some(parent) = parent else {
        let max = siblings.into_iter().filter_map(leading_integer).max();
        return Ok(next_integer(max, "")?.to_string());
    };

    let prefix = parent.number.trim();
    if prefix.is_empty() {
        return Err(Error::Precondition(
            "parent topic has no number".to_string(),
        ));
    }

    let depth = parent.level + 1;
    let suffixes = siblings.into_iter().filter_map(|s| s.strip_prefix(prefix));

    if depth % 2 == 1 {
        let max = suffixes
            .filter_map(|s| s.chars().next())
            .map(|c| c.to_ascii_lowercase())
            .filter(char::is_ascii_lowercase)
            .max();
        let letter = match max {
            None => FIRST_TOPIC_LETTER,
            Some('z') => {
                return Err(Error::Precondition(format!(
                    "topic {} has no letter left after 'z'",
                    prefix
                )))
            }
            Some(c) => (c as u8 + 1) as char,
        };
        Ok(format!("{}{}", prefix, letter))
    } else {
        let max = suffixes.filter_map(leading_integer).max();
        Ok(format!("{}{}", prefix, next_integer(max, prefix)?))
    }
}

fn next_integer(max: Option<u64>, prefix: &str) -> Result<u64> {
    match max {
        None => Ok(FIRST_TOPIC_NUMBER),
        Some(m) => m.checked_add(1).ok_or_else(|| {
            Error::Precondition(format!("topic number {}{} cannot be incremented", prefix, m))
        }),
    }
}

/// Parse the leading decimal digits of `s`, ignoring anything after them.
fn leading_integer(s: &str) -> Option<u64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}
