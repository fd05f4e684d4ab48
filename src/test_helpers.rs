//! Shared test utilities for the codelab-index test suite.
//!
//! Provides the four-card index fixture used across engine tests, a copy of
//! the `fixtures/site/` tree for collection tests, and lookup helpers that
//! panic with a useful message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let cards = fixture_cards();
//! assert_eq!(card_ids(&cards), vec!["one", "two", "three", "four"]);
//!
//! let tmp = setup_fixtures();
//! let manifest = collect(&config, tmp.path()).unwrap();
//! let codelab = find_codelab(&manifest, "intro-web");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::card::{Card, RawCard, ingest};
use crate::scan::{Codelab, Manifest};

// =========================================================================
// Card fixtures
// =========================================================================

fn raw(
    id: &str,
    title: &str,
    category: &str,
    tags: &str,
    duration: &str,
    updated: &str,
) -> RawCard {
    RawCard {
        id: id.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        tags: tags.to_string(),
        duration: duration.to_string(),
        updated: updated.to_string(),
        ..RawCard::default()
    }
}

/// The four cards of the index-page fixture, in markup order.
///
/// | id | title | categories | tags | duration | updated | pinned |
/// |----|-------|------------|------|----------|---------|--------|
/// | one | Abc | cloud | cloud, common | 1 | 2016-06-20 | |
/// | two | Zzz | android | common | 2 | 2016-06-21 | yes |
/// | three | Bcd some | beacons | web | 3 | 2016-06-22 | |
/// | four | Def | beacons, android | | 4 | 2016-06-23 | |
///
/// Only `three` has "some" in its title. `four` has it in its description,
/// which text filtering ignores.
pub fn fixture_raw_cards() -> Vec<RawCard> {
    vec![
        raw("one", "Abc", "Cloud", "Cloud, Common", "1", "2016-06-20"),
        RawCard {
            pin: true,
            ..raw("two", "Zzz", "Android", "common", "2", "2016-06-21")
        },
        raw("three", "Bcd some", "beacons", "Web", "3", "2016-06-22"),
        RawCard {
            description: "Has some beacons".to_string(),
            ..raw("four", "Def", "Beacons, Android", "", "4", "2016-06-23")
        },
    ]
}

pub fn fixture_cards() -> Vec<Card> {
    ingest(fixture_raw_cards())
}

/// Ids in slice order.
pub fn card_ids(cards: &[Card]) -> Vec<&str> {
    cards.iter().map(|c| c.id.as_str()).collect()
}

// =========================================================================
// Site fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a codelab by id. Panics if not found.
pub fn find_codelab<'a>(manifest: &'a Manifest, id: &str) -> &'a Codelab {
    manifest
        .codelabs
        .iter()
        .find(|c| c.id == id)
        .unwrap_or_else(|| {
            let ids: Vec<&str> = manifest.codelabs.iter().map(|c| c.id.as_str()).collect();
            panic!("codelab '{id}' not found. Available: {ids:?}")
        })
}

/// All codelab ids in manifest order.
pub fn codelab_ids(codelabs: &[Codelab]) -> Vec<&str> {
    codelabs.iter().map(|c| c.id.as_str()).collect()
}
