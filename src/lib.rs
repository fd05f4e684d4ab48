//! # Codelab Index
//!
//! The engine behind a codelabs site's index pages. Exported codelabs and
//! view definitions on disk are the data source; each view becomes one index
//! page of cards that visitors sort and filter, with the state kept in the
//! page URL.
//!
//! # Architecture: Collect, Select, Index
//!
//! ```text
//! 1. Collect   site root  →  Manifest          (codelab.json + view.json → structured data)
//! 2. Select    Manifest   →  Vec<RawCard>      (one view's codelabs, pins first)
//! 3. Index     RawCard    →  CardIndexEngine   (sort, filter, URL state)
//! ```
//!
//! Stage 1 writes a human-readable `manifest.json`. Stages 2 and 3 are pure
//! functions of their inputs, so the index behaviour is tested without a
//! browser or a site on disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the site root, parses codelab and view metadata, produces the manifest |
//! | [`view`] | Stage 2: view selection, exclude patterns, pin ordering, levelled categories, canonical URLs |
//! | [`card`] | Card ingest: raw card attributes to normalized, typed [`card::Card`]s |
//! | [`sort`] | Card orders (alphabetical, duration, recent) with pinned cards first |
//! | [`filter`] | Category, text, tag and kiosk-tag matching |
//! | [`url_state`] | Query-string encoding and decoding of order and filter |
//! | [`engine`] | Stage 3: [`engine::CardIndexEngine`], the single owner of cards, filter and order |
//! | [`normalize`] | Whitespace and case normalization shared by every comparison |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting: inventory-style listings of codelabs, views and cards |
//!
//! # Design Decisions
//!
//! ## One Engine, Many Pages
//!
//! Every index page (the main listing, per-category pages, kiosk screens)
//! drives the same [`engine::CardIndexEngine`]. Whatever shows the cards
//! implements [`engine::CardSurface`]; the engine never reaches into a page.
//! The CLI's card listing is just another surface.
//!
//! ## Normalize Once
//!
//! Titles, categories and tags are trimmed, whitespace-collapsed and
//! lowercased at ingest. Filters normalize their inputs the same way, so every
//! comparison afterwards is plain string equality.
//!
//! ## Kiosk Tags
//!
//! Tags named `kiosk` or `kiosk-*` mark codelabs for event kiosks. They are
//! kept apart from the visitor's tag filter: when any are active, a card must
//! share at least one of them before any other filter is considered.
//! Clearing filters clears kiosk tags too.

pub mod card;
pub mod config;
pub mod engine;
pub mod filter;
pub mod normalize;
pub mod output;
pub mod scan;
pub mod sort;
pub mod url_state;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
