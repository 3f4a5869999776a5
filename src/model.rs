//! Review entity and date normalization.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

/// Primary key type of the `reviews` table (`SERIAL`).
pub type ReviewId = i32;

/// Layout for both `releaseDate` and `dateCreated` once normalized.
pub const DATE_LAYOUT: &str = "%d %b %y %H:%M";

/// A movie review as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub title: String,
    pub director: String,
    pub release_date: String,
    pub rating: String,
    pub review_notes: String,
    pub date_created: String,
}

impl Review {
    /// Build an unsaved review: normalizes the release date and stamps the
    /// creation time. `id` stays 0 until the store assigns one.
    pub fn new(
        title: String,
        director: String,
        release_date: &str,
        rating: String,
        review_notes: String,
    ) -> Self {
        Self {
            id: 0,
            title,
            director,
            release_date: normalize_release_date(release_date),
            rating,
            review_notes,
            date_created: format_timestamp(Utc::now().naive_utc()),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

/// Normalize a client supplied release date, falling back to the current time
/// when it does not match `02 Jan 06 15:04 MST`.
pub fn normalize_release_date(input: &str) -> String {
    normalize_release_date_at(input, Utc::now().naive_utc())
}

fn normalize_release_date_at(input: &str, now: NaiveDateTime) -> String {
    match parse_release_date(input) {
        Some(parsed) => format_timestamp(parsed),
        None => {
            warn!(input, "Unparseable release date, falling back to current time");
            format_timestamp(now)
        }
    }
}

/// Parse `02 Jan 06 15:04` with an optional zone token (`MST`, `UTC`, `-0700`).
/// The wall-clock value is kept as written.
fn parse_release_date(input: &str) -> Option<NaiveDateTime> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let (stamp, zone) = match tokens.len() {
        4 => (&tokens[..], None),
        5 => (&tokens[..4], Some(tokens[4])),
        _ => return None,
    };

    if let Some(zone) = zone {
        if !is_zone_token(zone) {
            return None;
        }
    }

    NaiveDateTime::parse_from_str(&stamp.join(" "), DATE_LAYOUT).ok()
}

fn is_zone_token(token: &str) -> bool {
    let alpha = (1..=5).contains(&token.len()) && token.chars().all(|c| c.is_ascii_alphabetic());
    let numeric = token.len() == 5
        && matches!(token.as_bytes()[0], b'+' | b'-')
        && token[1..].chars().all(|c| c.is_ascii_digit());
    alpha || numeric
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(DATE_LAYOUT).to_string()
}
