//! Card ordering with pin precedence.
//!
//! Every order puts pinned cards first, ranked by their pin position. The
//! remaining cards are ordered by the selected key, and ties fall back along a
//! fixed chain so the result is deterministic:
//!
//! ```text
//! Duration     duration ↑  →  updated ↓  →  title ↑
//! Recent       updated ↓   →  title ↑
//! Alphabetical title ↑
//! ```
//!
//! Sorting is stable, so cards that are still equal after the chain keep
//! their previous relative order.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Sort mode for the index page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    #[serde(alias = "alpha", alias = "a-z")]
    Alphabetical,
    Duration,
    Recent,
}

impl Order {
    pub const ALL: [Order; 3] = [Order::Alphabetical, Order::Duration, Order::Recent];

    /// Query-string value, `None` for the default order.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Order::Alphabetical => None,
            Order::Duration => Some("duration"),
            Order::Recent => Some("recent"),
        }
    }

    /// Parse a sort value. Unknown values fall back to [`Order::Alphabetical`].
    pub fn from_param(value: &str) -> Order {
        match value.trim().to_ascii_lowercase().as_str() {
            "duration" => Order::Duration,
            "recent" => Order::Recent,
            _ => Order::Alphabetical,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param().unwrap_or("alpha"))
    }
}

/// Compare two cards under `order`.
pub fn compare(a: &Card, b: &Card, order: Order) -> Ordering {
    compare_pinned(a, b).unwrap_or_else(|| match order {
        Order::Alphabetical => compare_alpha(a, b),
        Order::Duration => compare_duration(a, b),
        Order::Recent => compare_recent(a, b),
    })
}

/// Stable in-place sort.
pub fn sort<C: Borrow<Card>>(cards: &mut [C], order: Order) {
    if cards.len() < 2 {
        return;
    }
    cards.sort_by(|a, b| compare(a.borrow(), b.borrow(), order));
}

/// `None` when neither card is pinned.
fn compare_pinned(a: &Card, b: &Card) -> Option<Ordering> {
    match (a.pin_order, b.pin_order) {
        (Some(pa), Some(pb)) => Some(pa.cmp(&pb)),
        (Some(_), None) => Some(Ordering::Less),
        (None, Some(_)) => Some(Ordering::Greater),
        (None, None) => None,
    }
}

fn compare_duration(a: &Card, b: &Card) -> Ordering {
    a.duration
        .cmp(&b.duration)
        .then_with(|| compare_recent(a, b))
}

fn compare_recent(a: &Card, b: &Card) -> Ordering {
    b.updated_at
        .cmp(&a.updated_at)
        .then_with(|| compare_alpha(a, b))
}

fn compare_alpha(a: &Card, b: &Card) -> Ordering {
    a.desc.cmp(&b.desc)
}
