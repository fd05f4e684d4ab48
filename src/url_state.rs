//! Query-string form of the index state.
//!
//! The index page keeps its order and filters in the URL so that deep links
//! and history navigation restore the same view:
//!
//! | Param | Meaning | Values |
//! |-------|---------|--------|
//! | `sort` | order | `duration`, `recent` (absent = alphabetical) |
//! | `cat` | category filter | normalized category |
//! | `tags` | tag filter | comma-joined normalized tags |
//! | `filter` | free-text filter | normalized substring |
//!
//! Kiosk tags share the `tags` param with ordinary tags. Decoding sorts them
//! back out by value (`kiosk` or `kiosk-*`), so `decode(encode(s)) == s` for
//! every state whose ordinary tags are not kiosk-shaped.
//!
//! Decoding is tolerant: unknown `sort` values mean alphabetical, blank values
//! mean "not set", repeated `tags` params are merged and the first `cat` wins.

use url::form_urlencoded;

use crate::filter::Filter;
use crate::normalize::{clean_joined, is_kiosk_tag, normalize_opt};
use crate::sort::Order;

pub const SORT_PARAM: &str = "sort";
pub const CATEGORY_PARAM: &str = "cat";
pub const TAGS_PARAM: &str = "tags";
pub const FILTER_PARAM: &str = "filter";

const ENGINE_PARAMS: [&str; 4] = [SORT_PARAM, CATEGORY_PARAM, TAGS_PARAM, FILTER_PARAM];

/// Order and filter, as carried by a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
    pub order: Order,
    pub filter: Filter,
}

/// Encode a state as a query string, without the leading `?`.
///
/// Params are emitted in a fixed order (`sort`, `cat`, `tags`, `filter`) and
/// omitted when unset. The empty state encodes to `""`.
pub fn encode(order: Order, filter: &Filter) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    append_state(&mut serializer, order, filter);
    serializer.finish()
}

/// Decode a query string, with or without the leading `?`.
pub fn decode(query: &str) -> UrlState {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut order = Order::default();
    let mut category = None;
    let mut text = None;
    let mut joined_tags = Vec::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            SORT_PARAM => order = Order::from_param(&value),
            CATEGORY_PARAM if category.is_none() => category = normalize_opt(Some(value.as_ref())),
            TAGS_PARAM => joined_tags.push(value.into_owned()),
            FILTER_PARAM => text = normalize_opt(Some(value.as_ref())),
            _ => {}
        }
    }

    let (kiosk_tags, tags): (Vec<String>, Vec<String>) = clean_joined(joined_tags)
        .into_iter()
        .partition(|t| is_kiosk_tag(t));

    UrlState {
        order,
        filter: Filter {
            category,
            text,
            tags,
            kiosk_tags,
        },
    }
}

/// Rewrite the engine's params in an existing query string.
///
/// Params the engine does not own keep their relative order; the
/// engine's params follow them.
pub fn merge_into(existing: &str, order: Order, filter: &Filter) -> String {
    let existing = existing.strip_prefix('?').unwrap_or(existing);
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(existing.as_bytes()) {
        if !ENGINE_PARAMS.contains(&key.as_ref()) {
            serializer.append_pair(&key, &value);
        }
    }
    append_state(&mut serializer, order, filter);
    serializer.finish()
}

fn append_state(
    serializer: &mut form_urlencoded::Serializer<'_, String>,
    order: Order,
    filter: &Filter,
) {
    if let Some(sort) = order.as_param() {
        serializer.append_pair(SORT_PARAM, sort);
    }
    if let Some(category) = &filter.category {
        serializer.append_pair(CATEGORY_PARAM, category);
    }
    let mut tags: Vec<&str> = filter
        .tags
        .iter()
        .chain(&filter.kiosk_tags)
        .map(String::as_str)
        .collect();
    if !tags.is_empty() {
        tags.sort_unstable();
        serializer.append_pair(TAGS_PARAM, &tags.join(","));
    }
    if let Some(text) = &filter.text {
        serializer.append_pair(FILTER_PARAM, text);
    }
}
