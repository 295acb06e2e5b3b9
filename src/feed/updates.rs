//! Update log records
//!
//! Each user keeps one plain-text log per era. Every non-blank line is one update:
//!
//!     <when> <channel> <message...>
//!
//! where `when` is a Unix timestamp in seconds and the message runs to the end of the line.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::warn;

static UPDATE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+) (\S+) (.*)").unwrap());

/// One status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub user: String,
    pub era: i64,
    pub when: i64,
    pub channel: String,
    pub message: String,
}

/// Parse one user's log for `era`, keeping updates whose timestamp falls in `window`.
///
/// Lines that do not have the `<when> <channel> <message>` shape, or whose timestamp is not
/// an integer, are skipped.
pub fn parse_updates(
    text: &str,
    user: &str,
    era: i64,
    window: RangeInclusive<i64>,
) -> Vec<UpdateRecord> {
    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let Some(caps) = UPDATE_LINE.captures(line) else {
            warn!(user, era, line = number + 1, "skipping malformed update line");
            continue;
        };
        let when = match caps[1].parse::<i64>() {
            Ok(when) => when,
            Err(_) => {
                warn!(user, era, line = number + 1, "skipping update with bad timestamp");
                continue;
            }
        };
        if !window.contains(&when) {
            continue;
        }
        records.push(UpdateRecord {
            user: user.to_string(),
            era,
            when,
            channel: caps[2].to_string(),
            message: caps[3].to_string(),
        });
    }
    records
}

/// Most recent first; updates with equal timestamps keep their relative order.
pub fn sort_newest_first(records: &mut [UpdateRecord]) {
    records.sort_by(|a, b| b.when.cmp(&a.when));
}
