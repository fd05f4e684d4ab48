//! Card ingestion: raw markup attributes → normalized [`Card`]s.
//!
//! Cards are parsed exactly once, when an index page is initialized. After
//! that only their visibility and display order change, so everything that
//! matching and sorting needs is precomputed here:
//!
//! | Raw attribute | Card field | Rule |
//! |---------------|------------|------|
//! | `title` | `desc` | normalized; the text filter and alphabetical key |
//! | `category` | `categories` | comma-split, normalized, sorted |
//! | `tags` | `tags` | comma-split, normalized, sorted |
//! | `duration` | `duration` | leading integer, otherwise `0` |
//! | `updated` | `updated_at` | RFC 3339 / RFC 2822 / `YYYY-MM-DD`, otherwise epoch |
//! | `pin` | `pin_order` | `1, 2, 3, …` in encounter order among pinned cards |
//!
//! Ingestion never fails. A malformed field degrades to its default and is
//! reported at `debug` level.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::{clean_joined, normalize_value};

/// A card as found in markup: every attribute is an unparsed string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCard {
    pub id: String,
    pub title: String,
    /// Comma-joined categories, e.g. `"Beacons, Android"`.
    pub category: String,
    /// Comma-joined tags, e.g. `"web,kiosk"`.
    pub tags: String,
    /// Duration in minutes, as written in markup.
    pub duration: String,
    /// Last update, as written in markup.
    pub updated: String,
    /// Presence flag: the author pinned this card.
    pub pin: bool,
    pub description: String,
}

/// One codelab's normalized index-page representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: String,
    /// Title as written; shown to users.
    pub title: String,
    /// Normalized title. Text filtering and alphabetical order use it.
    pub desc: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// Minutes.
    pub duration: u32,
    pub updated_at: DateTime<Utc>,
    /// Position among pinned cards, starting at 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_order: Option<u32>,
    /// Description as written; display only, never matched.
    pub raw_description: String,
}

impl Card {
    pub fn is_pinned(&self) -> bool {
        self.pin_order.is_some()
    }
}

/// Ingest raw cards in markup order.
pub fn ingest<I>(raw_cards: I) -> Vec<Card>
where
    I: IntoIterator<Item = RawCard>,
{
    let mut pin = 0;
    raw_cards
        .into_iter()
        .map(|raw| {
            let pin_order = if raw.pin {
                pin += 1;
                Some(pin)
            } else {
                None
            };
            build_card(raw, pin_order)
        })
        .collect()
}

fn build_card(raw: RawCard, pin_order: Option<u32>) -> Card {
    let desc = normalize_value(&raw.title);

    let duration = parse_duration(&raw.duration).unwrap_or_else(|| {
        if !raw.duration.trim().is_empty() {
            debug!(card = %raw.id, value = %raw.duration, "unparseable duration, using 0");
        }
        0
    });

    let updated_at = parse_updated(&raw.updated).unwrap_or_else(|| {
        if !raw.updated.trim().is_empty() {
            debug!(card = %raw.id, value = %raw.updated, "unparseable update date, using epoch");
        }
        DateTime::<Utc>::default()
    });

    Card {
        categories: clean_joined([raw.category.as_str()]),
        tags: clean_joined([raw.tags.as_str()]),
        id: raw.id,
        title: raw.title,
        desc,
        duration,
        updated_at,
        pin_order,
        raw_description: raw.description,
    }
}

/// Parse the leading integer of a duration string (`"12"`, `"12 min"`, `"7.5"`).
pub fn parse_duration(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Parse an update timestamp in any of the formats codelab exports use.
pub fn parse_updated(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
