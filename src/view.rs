//! View selection: which codelabs an index view shows, and in what order.
//!
//! A view selects codelabs by tags and categories, drops anything matching
//! one of its `exclude` patterns, then orders the rest with pinned codelabs
//! first. The result feeds the card index as [`RawCard`]s.
//!
//! ## Selection rules
//!
//! A codelab is selected when the view names no tags and no categories, or
//! when the codelab shares at least one tag or one category with the view.
//! Tags and categories compare normalized. Exclude patterns are unanchored
//! regular expressions tested against the codelab's id and its normalized
//! (lowercased) statuses, tags and categories. The default view also drops
//! codelabs with the `hidden` status.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

use crate::card::RawCard;
use crate::filter::intersects;
use crate::normalize::clean_strings;
use crate::scan::{Codelab, DEFAULT_VIEW, View};

pub const HIDDEN_STATUS: &str = "hidden";

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Invalid exclude pattern {pattern:?} in view {view}: {source}")]
    Exclude {
        view: String,
        pattern: String,
        source: regex::Error,
    },
    #[error("Unknown view: {0}")]
    UnknownView(String),
}

/// Codelab attribute a view orders by, after pins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewSort {
    #[serde(rename = "mainCategory")]
    MainCategory,
    #[default]
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "duration")]
    Duration,
    #[serde(rename = "updated")]
    Updated,
    #[serde(rename = "id")]
    Id,
}

/// A category at some depth of a codelab's category list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelledCategory {
    pub name: String,
    pub level: usize,
}

/// The codelabs a view shows, in display order, with their categories.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub view_id: String,
    pub codelabs: Vec<&'a Codelab>,
    /// Distinct levelled category names of the selected codelabs, sorted.
    pub categories: Vec<String>,
}

pub fn compile_excludes(view: &View) -> Result<Vec<Regex>, ViewError> {
    view.exclude
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ViewError::Exclude {
                view: view.id.clone(),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// The deepest category at or above `level`. Codelabs with no category at
/// any of those depths get `default_category` at level 0.
pub fn levelled_category(codelab: &Codelab, level: usize, default_category: &str) -> LevelledCategory {
    (0..=level)
        .rev()
        .find_map(|i| {
            codelab
                .category
                .get(i)
                .filter(|c| !c.trim().is_empty())
                .map(|name| LevelledCategory {
                    name: name.clone(),
                    level: i,
                })
        })
        .unwrap_or_else(|| LevelledCategory {
            name: default_category.to_string(),
            level: 0,
        })
}

fn is_excluded(codelab: &Codelab, excludes: &[Regex]) -> bool {
    if excludes.is_empty() {
        return false;
    }
    let cleaned = [
        clean_strings(&codelab.status),
        clean_strings(&codelab.tags),
        clean_strings(&codelab.category),
    ];
    std::iter::once(&codelab.id)
        .chain(cleaned.iter().flatten())
        .any(|field| excludes.iter().any(|re| re.is_match(field)))
}

/// Whether a codelab belongs in a view, before excludes.
pub fn is_selected(view_tags: &[String], view_categories: &[String], codelab: &Codelab) -> bool {
    if view_tags.is_empty() && view_categories.is_empty() {
        return true;
    }
    intersects(view_tags, &clean_strings(&codelab.tags))
        || intersects(view_categories, &clean_strings(&codelab.category))
}

/// Select and order the codelabs a view shows.
pub fn select<'a>(
    view: &View,
    codelabs: &'a [Codelab],
    default_category: &str,
) -> Result<Selection<'a>, ViewError> {
    let excludes = compile_excludes(view)?;
    let view_tags = clean_strings(&view.tags);
    let view_categories = clean_strings(&view.categories);
    let is_default = view.id == DEFAULT_VIEW;

    let mut selected: Vec<&Codelab> = codelabs
        .iter()
        .filter(|c| is_selected(&view_tags, &view_categories, c))
        .filter(|c| !is_excluded(c, &excludes))
        .filter(|c| !(is_default && c.has_status(HIDDEN_STATUS)))
        .collect();

    sort_codelabs(&mut selected, view, default_category);

    let categories: BTreeSet<String> = selected
        .iter()
        .map(|c| levelled_category(c, view.cat_level, default_category).name)
        .collect();

    debug!(
        view = %view.id,
        selected = selected.len(),
        total = codelabs.len(),
        "selected codelabs for view"
    );

    Ok(Selection {
        view_id: view.id.clone(),
        codelabs: selected,
        categories: categories.into_iter().collect(),
    })
}

/// Pinned codelabs first in pin order, then by the view's sort attribute.
/// Stable: ties keep their input order.
pub fn sort_codelabs(codelabs: &mut [&Codelab], view: &View, default_category: &str) {
    let pin_index = |c: &Codelab| view.pins.iter().position(|p| *p == c.id);
    codelabs.sort_by(|a, b| match (pin_index(*a), pin_index(*b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_by(*a, *b, view, default_category),
    });
}

fn compare_by(a: &Codelab, b: &Codelab, view: &View, default_category: &str) -> Ordering {
    match view.sort {
        ViewSort::MainCategory => levelled_category(a, view.cat_level, default_category)
            .name
            .cmp(&levelled_category(b, view.cat_level, default_category).name),
        ViewSort::Title => a.title.cmp(&b.title),
        ViewSort::Duration => a.duration.cmp(&b.duration),
        ViewSort::Updated => a.updated.cmp(&b.updated),
        ViewSort::Id => a.id.cmp(&b.id),
    }
}

/// Cards for the index page, in selection order. Pinned codelabs carry the
/// pin flag.
pub fn raw_cards(view: &View, codelabs: &[&Codelab]) -> Vec<RawCard> {
    codelabs
        .iter()
        .map(|c| RawCard {
            id: c.id.clone(),
            title: c.title.clone(),
            category: c.category.join(","),
            tags: c.tags.join(","),
            duration: c.duration.map(|d| d.to_string()).unwrap_or_default(),
            updated: c.updated.clone(),
            pin: view.pins.contains(&c.id),
            description: c.summary.clone(),
        })
        .collect()
}

/// `<base>/` for the default view, `<base>/<id>/` for any other.
pub fn canonical_url(base_url: &str, view_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if view_id == DEFAULT_VIEW {
        format!("{base}/")
    } else {
        format!("{base}/{view_id}/")
    }
}
