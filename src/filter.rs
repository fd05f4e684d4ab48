//! Card visibility filters.
//!
//! A card is visible when it passes every criterion that is set:
//!
//! 1. **Kiosk tags**: shares at least one kiosk tag. Kiosk tags come from
//!    kiosk-mode deep links and stay in force whatever else is selected.
//! 2. **Category**: the category is one of the card's categories (exact).
//! 3. **Text**: the text is a substring of the card's normalized title.
//! 4. **Tags**: shares at least one tag.
//!
//! An empty filter matches every card. Filtering never reorders; ordering is
//! [`crate::sort`]'s job.

use serde::Serialize;

use crate::card::Card;
use crate::normalize::{clean_strings, normalize_opt};

/// Current filter selection. Every field is stored normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Sorted ascending.
    pub tags: Vec<String>,
    /// Sorted ascending.
    pub kiosk_tags: Vec<String>,
}

impl Filter {
    /// Build a filter from unnormalized input.
    pub fn new<T, K>(category: Option<&str>, text: Option<&str>, tags: T, kiosk_tags: K) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        Self {
            category: normalize_opt(category),
            text: normalize_opt(text),
            tags: clean_strings(tags),
            kiosk_tags: clean_strings(kiosk_tags),
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = normalize_opt(Some(category));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = normalize_opt(Some(text));
        self
    }

    pub fn with_tags<T>(mut self, tags: T) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        self.tags = clean_strings(tags);
        self
    }

    pub fn with_kiosk_tags<T>(mut self, tags: T) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        self.kiosk_tags = clean_strings(tags);
        self
    }

    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.text.is_none()
            && self.tags.is_empty()
            && self.kiosk_tags.is_empty()
    }
}

/// Whether `card` passes every criterion set in `filter`.
pub fn matches(card: &Card, filter: &Filter) -> bool {
    // Kiosk intersection is mandatory and checked first.
    if !filter.kiosk_tags.is_empty() && !intersects(&filter.kiosk_tags, &card.tags) {
        return false;
    }

    if let Some(category) = &filter.category {
        if !card.categories.iter().any(|c| c == category) {
            return false;
        }
    }

    if let Some(text) = &filter.text {
        if !card.desc.contains(text.as_str()) {
            return false;
        }
    }

    filter.tags.is_empty() || intersects(&filter.tags, &card.tags)
}

/// Reports whether two ascending-sorted slices share an element.
///
/// Runs in `O(a.len() + b.len())`. Sortedness is not checked.
pub fn intersects<S: AsRef<str>>(a: &[S], b: &[S]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].as_ref().cmp(b[j].as_ref()) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => return true,
        }
    }
    false
}

/// Visible cards, in input order.
pub fn apply<'a>(cards: &'a [Card], filter: &Filter) -> Vec<&'a Card> {
    cards.iter().filter(|c| matches(c, filter)).collect()
}
