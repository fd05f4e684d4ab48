//! The card index engine: one owner for cards, filter and order.
//!
//! [`CardIndexEngine`] is the single implementation behind every index page
//! entry point. It owns the ingested cards (in markup order) plus the current
//! [`Filter`] and [`Order`], and derives the visible, ordered subset on demand.
//!
//! The engine has no knowledge of the page it serves. Whatever displays the
//! cards implements [`CardSurface`]; [`CardIndexEngine::render`] hands it the
//! visible cards and the query string to put in the address bar.
//!
//! ```text
//! UI event ─> engine.filter_by_tags(..) ─> engine.render(&mut surface)
//!                                            ├─> surface.show(visible)
//!                                            └─> surface.replace_query(query)
//! ```

use tracing::debug;

use crate::card::{Card, RawCard, ingest};
use crate::filter::{self, Filter};
use crate::normalize::{clean_strings, is_kiosk_tag};
use crate::sort::{self, Order};
use crate::url_state::{self, UrlState};

/// Whatever displays the cards: a DOM container, a terminal listing, a test
/// recorder.
pub trait CardSurface {
    /// Show exactly these cards, in this order; hide the rest.
    fn show(&mut self, visible: &[&Card]);

    /// Replace the page's query string (no leading `?`).
    fn replace_query(&mut self, query: &str);
}

#[derive(Debug, Clone, Default)]
pub struct CardIndexEngine {
    cards: Vec<Card>,
    filter: Filter,
    order: Order,
}

impl CardIndexEngine {
    /// Ingest raw cards in markup order.
    pub fn new<I>(raw_cards: I) -> Self
    where
        I: IntoIterator<Item = RawCard>,
    {
        Self::from_cards(ingest(raw_cards))
    }

    /// Wrap cards that were already ingested.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        debug!(cards = cards.len(), "card index initialized");
        Self {
            cards,
            filter: Filter::default(),
            order: Order::default(),
        }
    }

    /// All cards, in markup order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn sort(&mut self, order: Order) {
        self.order = order;
    }

    /// Replace every filter criterion at once.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn filter_by_category(&mut self, category: &str) {
        self.filter = std::mem::take(&mut self.filter).with_category(category);
    }

    pub fn filter_by_text(&mut self, text: &str) {
        self.filter = std::mem::take(&mut self.filter).with_text(text);
    }

    /// Replace the tag filter. Kiosk tags are replaced too, so callers that
    /// track kiosk tags must pass them again.
    pub fn filter_by_tags<T, K>(&mut self, tags: T, kiosk_tags: K)
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        self.filter = std::mem::take(&mut self.filter)
            .with_tags(tags)
            .with_kiosk_tags(kiosk_tags);
    }

    /// Replace the visitor's tag selection. Active kiosk tags stay in force;
    /// kiosk-shaped tags in `tags` join them.
    pub fn select_tags<T>(&mut self, tags: T)
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let (kiosk, ordinary): (Vec<String>, Vec<String>) =
            clean_strings(tags).into_iter().partition(|t| is_kiosk_tag(t));
        let mut kiosk_tags: Vec<String> = self.filter.kiosk_tags.iter().cloned().chain(kiosk).collect();
        kiosk_tags.sort();
        kiosk_tags.dedup();
        self.filter_by_tags(ordinary, kiosk_tags);
    }

    /// Remove every filter, kiosk tags included.
    pub fn clear_filters(&mut self) {
        self.filter = Filter::default();
    }

    /// Cards passing the filter, in display order.
    pub fn visible(&self) -> Vec<&Card> {
        let mut visible = filter::apply(&self.cards, &self.filter);
        sort::sort(&mut visible, self.order);
        visible
    }

    pub fn visible_ids(&self) -> Vec<&str> {
        self.visible().into_iter().map(|c| c.id.as_str()).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.cards
            .iter()
            .filter(|c| filter::matches(c, &self.filter))
            .count()
    }

    /// Current state as a query string.
    pub fn query(&self) -> String {
        url_state::encode(self.order, &self.filter)
    }

    /// Current state merged into an existing query string.
    pub fn merged_query(&self, existing: &str) -> String {
        url_state::merge_into(existing, self.order, &self.filter)
    }

    pub fn state(&self) -> UrlState {
        UrlState {
            order: self.order,
            filter: self.filter.clone(),
        }
    }

    /// Replace order and filter from a query string (deep links, history
    /// navigation).
    pub fn restore_from_query(&mut self, query: &str) {
        let UrlState { order, filter } = url_state::decode(query);
        debug!(%order, ?filter, "restored index state from query");
        self.order = order;
        self.filter = filter;
    }

    /// Push the current state to a surface.
    pub fn render<S: CardSurface + ?Sized>(&self, surface: &mut S) {
        let visible = self.visible();
        surface.show(&visible);
        surface.replace_query(&self.query());
    }
}
