//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity (codelab, view, card) leads with a positional index and its
//! title. Ids, source directories and other details follow as indented
//! context lines, so the output reads as an inventory while still pointing
//! back at the files it came from.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Codelabs
//! 001 Android Basics (30 min)
//!     Source: codelabs/android-basics/
//!     Category: Android
//!     Tags: android, web
//!     Status: published
//!
//! Views
//! 001 default → https://example.com/
//!     Sort: mainCategory
//!     Pins: intro-web
//!
//! Categories
//!     Android, Beacons, Cloud
//! ```
//!
//! ## Views
//!
//! ```text
//! 001 default → https://example.com/ (5 codelabs)
//!     Categories: Android, Beacons, Cloud
//! ```
//!
//! ## Cards
//!
//! ```text
//! Cards (2 of 4)
//! 001 Zzz [pinned]
//!     Id: two
//!     Categories: android
//!     Duration: 2 min
//!     Updated: 2016-06-21
//!
//! Query: ?sort=recent&tags=common
//! ```
//!
//! # Architecture
//!
//! Each listing has a `format_*` function (returns `Vec<String>`) and a
//! `print_*` wrapper that writes to stdout. Card listings are produced by
//! [`ListingSurface`], a [`CardSurface`] that records lines instead of
//! touching a page.

use crate::card::Card;
use crate::engine::{CardIndexEngine, CardSurface};
use crate::scan::{Codelab, Manifest, View};
use crate::view::{self, Selection};

const SUMMARY_PREVIEW_CHARS: usize = 60;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// `Label: a, b, c`, or nothing for an empty list.
fn list_line(depth: usize, label: &str, values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(format!("{}{}: {}", indent(depth), label, values.join(", ")))
    }
}

fn view_sort_name(view: &View) -> String {
    serde_json::to_value(view.sort)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

// ============================================================================
// Scan output
// ============================================================================

fn codelab_lines(index: usize, codelab: &Codelab) -> Vec<String> {
    let mut lines = Vec::new();
    let title = if codelab.title.trim().is_empty() {
        format!("({})", codelab.id)
    } else {
        codelab.title.clone()
    };
    match codelab.duration {
        Some(minutes) => lines.push(format!("{} {} ({} min)", format_index(index), title, minutes)),
        None => lines.push(format!("{} {}", format_index(index), title)),
    }
    if !codelab.source_dir.is_empty() {
        lines.push(format!("{}Source: {}/", indent(1), codelab.source_dir));
    }
    lines.push(format!("{}Category: {}", indent(1), codelab.main_category));
    lines.extend(list_line(1, "Tags", &codelab.tags));
    lines.extend(list_line(1, "Status", &codelab.status));
    let summary = truncate_desc(codelab.summary.trim(), SUMMARY_PREVIEW_CHARS);
    if !summary.is_empty() {
        lines.push(format!("{}{}", indent(1), summary));
    }
    lines
}

/// Format the collected metadata as an inventory.
pub fn format_scan_output(manifest: &Manifest, base_url: &str) -> Vec<String> {
    let mut lines = vec!["Codelabs".to_string()];
    for (i, codelab) in manifest.codelabs.iter().enumerate() {
        lines.extend(codelab_lines(i + 1, codelab));
    }

    if !manifest.views.is_empty() {
        lines.push(String::new());
        lines.push("Views".to_string());
        for (i, view) in manifest.views.values().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                view.id,
                view::canonical_url(base_url, &view.id)
            ));
            lines.push(format!("{}Sort: {}", indent(1), view_sort_name(view)));
            lines.extend(list_line(1, "Tags", &view.tags));
            lines.extend(list_line(1, "Categories", &view.categories));
            lines.extend(list_line(1, "Exclude", &view.exclude));
            lines.extend(list_line(1, "Pins", &view.pins));
        }
    }

    if !manifest.categories.is_empty() {
        lines.push(String::new());
        lines.push("Categories".to_string());
        lines.push(format!("{}{}", indent(1), manifest.categories.join(", ")));
    }
    lines
}

pub fn print_scan_output(manifest: &Manifest, base_url: &str) {
    for line in format_scan_output(manifest, base_url) {
        println!("{}", line);
    }
}

// ============================================================================
// View output
// ============================================================================

/// Format each view with its canonical URL and selection size.
pub fn format_views(selections: &[(&View, Selection<'_>)], base_url: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (view, selection)) in selections.iter().enumerate() {
        let count = selection.codelabs.len();
        let noun = if count == 1 { "codelab" } else { "codelabs" };
        lines.push(format!(
            "{} {} → {} ({} {})",
            format_index(i + 1),
            view.id,
            view::canonical_url(base_url, &view.id),
            count,
            noun
        ));
        if !view.title.is_empty() {
            lines.push(format!("{}Title: {}", indent(1), view.title));
        }
        lines.extend(list_line(1, "Categories", &selection.categories));
    }
    lines
}

pub fn print_views(selections: &[(&View, Selection<'_>)], base_url: &str) {
    for line in format_views(selections, base_url) {
        println!("{}", line);
    }
}

// ============================================================================
// Card output
// ============================================================================

/// A [`CardSurface`] that renders the index as text lines.
#[derive(Debug, Default)]
pub struct ListingSurface {
    total: usize,
    shown: usize,
    cards: Vec<String>,
    query: String,
}

impl ListingSurface {
    /// `total` is the size of the unfiltered index, shown in the header.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Cards ({} of {})", self.shown, self.total)];
        lines.extend(self.cards.iter().cloned());
        lines.push(String::new());
        if self.query.is_empty() {
            lines.push("Query: (none)".to_string());
        } else {
            lines.push(format!("Query: ?{}", self.query));
        }
        lines
    }
}

fn card_lines(index: usize, card: &Card) -> Vec<String> {
    let pin = if card.is_pinned() { " [pinned]" } else { "" };
    let mut lines = vec![
        format!("{} {}{}", format_index(index), card.title, pin),
        format!("{}Id: {}", indent(1), card.id),
    ];
    lines.extend(list_line(1, "Categories", &card.categories));
    lines.extend(list_line(1, "Tags", &card.tags));
    lines.push(format!("{}Duration: {} min", indent(1), card.duration));
    lines.push(format!(
        "{}Updated: {}",
        indent(1),
        card.updated_at.format("%Y-%m-%d")
    ));
    lines
}

impl CardSurface for ListingSurface {
    fn show(&mut self, visible: &[&Card]) {
        self.shown = visible.len();
        self.cards = visible
            .iter()
            .enumerate()
            .flat_map(|(i, card)| card_lines(i + 1, card))
            .collect();
    }

    fn replace_query(&mut self, query: &str) {
        self.query = query.to_string();
    }
}

/// Format the engine's visible cards and its query string.
pub fn format_cards(engine: &CardIndexEngine) -> Vec<String> {
    let mut surface = ListingSurface::new(engine.cards().len());
    engine.render(&mut surface);
    surface.lines()
}

pub fn print_cards(engine: &CardIndexEngine) {
    for line in format_cards(engine) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Order;
    use crate::test_helpers::*;
    use crate::view::ViewSort;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn truncate_desc_respects_char_boundaries() {
        assert_eq!(truncate_desc("short", 10), "short");
        assert_eq!(truncate_desc("exactly", 7), "exactly");
        assert_eq!(truncate_desc("ééééé", 2), "éé...");
        assert_eq!(truncate_desc("", 5), "");
    }

    #[test]
    fn cards_listing_shows_pins_and_query() {
        let mut engine = CardIndexEngine::new(fixture_raw_cards());
        engine.sort(Order::Recent);
        engine.filter_by_tags(["common"], Vec::<String>::new());

        let lines = format_cards(&engine);
        assert_eq!(
            lines,
            vec![
                "Cards (2 of 4)",
                "001 Zzz [pinned]",
                "    Id: two",
                "    Categories: android",
                "    Tags: common",
                "    Duration: 2 min",
                "    Updated: 2016-06-21",
                "002 Abc",
                "    Id: one",
                "    Categories: cloud",
                "    Tags: cloud, common",
                "    Duration: 1 min",
                "    Updated: 2016-06-20",
                "",
                "Query: ?sort=recent&tags=common",
            ]
        );
    }

    #[test]
    fn empty_listing_has_no_query() {
        let mut engine = CardIndexEngine::new(fixture_raw_cards());
        engine.filter_by_text("nothing matches this");
        let lines = format_cards(&engine);
        assert_eq!(lines[0], "Cards (0 of 4)");
        assert_eq!(lines.last().map(String::as_str), Some("Query: ?filter=nothing+matches+this"));

        let idle = ListingSurface::new(0);
        assert_eq!(idle.lines().last().map(String::as_str), Some("Query: (none)"));
    }

    #[test]
    fn scan_output_lists_codelabs_views_and_categories() {
        let codelab = Codelab {
            id: "intro-web".to_string(),
            title: "Intro to the Web".to_string(),
            main_category: "Web".to_string(),
            tags: vec!["web".to_string()],
            duration: Some(15),
            source_dir: "codelabs/intro-web".to_string(),
            ..Codelab::default()
        };
        let view = View {
            id: "default".to_string(),
            title: "Codelabs".to_string(),
            description: String::new(),
            tags: Vec::new(),
            categories: Vec::new(),
            exclude: Vec::new(),
            pins: vec!["intro-web".to_string()],
            sort: ViewSort::MainCategory,
            cat_level: 0,
        };
        let manifest = Manifest {
            codelabs: vec![codelab],
            views: BTreeMap::from([("default".to_string(), view)]),
            categories: vec!["Web".to_string()],
        };

        assert_eq!(
            format_scan_output(&manifest, "https://codelabs.dev"),
            vec![
                "Codelabs",
                "001 Intro to the Web (15 min)",
                "    Source: codelabs/intro-web/",
                "    Category: Web",
                "    Tags: web",
                "",
                "Views",
                "001 default → https://codelabs.dev/",
                "    Sort: mainCategory",
                "    Pins: intro-web",
                "",
                "Categories",
                "    Web",
            ]
        );
    }
}
