//! Codelab and view metadata collection.
//!
//! Walks the site root and collects everything an index page is built from,
//! producing a [`Manifest`] that can be written out as JSON.
//!
//! ## Directory Structure
//!
//! ```text
//! site/
//! ├── config.toml
//! ├── codelabs/                    # `codelabs_dir`
//! │   ├── intro-web/
//! │   │   └── codelab.json         # Written by the codelab exporter
//! │   └── beacons-101/
//! │       └── codelab.json
//! └── views/                       # `views_dir`
//!     ├── default/
//!     │   └── view.json            # Base for every other view
//!     └── kiosk/
//!         └── view.json
//! ```
//!
//! ## Metadata Formats
//!
//! `codelab.json` carries `id`, `title`, `summary`, `category`, `tags`,
//! `status`, `duration`, `updated` and `url`. `category` and `tags` may be a
//! single string or a list. `status` may be a list or a legacy string such as
//! `"[u'ready for review']"`.
//!
//! `view.json` carries `title`, `description`, `tags`, `categories`,
//! `exclude`, `pins`, `sort` and `catLevel`. A view's id is its directory
//! name. Keys a view leaves out are inherited from the `default` view, except
//! `sort`, which defaults to `mainCategory` for the default view and `title`
//! everywhere else.
//!
//! ## Validation
//!
//! - Every JSON file must parse; errors name the offending file.
//! - Codelab ids must be unique.
//! - Every `exclude` pattern must be a valid regular expression.

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{self, ConfigError, SiteConfig};
use crate::normalize::normalize_value;
use crate::view::{self, ViewError};

pub const CODELAB_FILE: &str = "codelab.json";
pub const VIEW_FILE: &str = "view.json";
pub const DEFAULT_VIEW: &str = "default";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Codelab id {id:?} is declared by both {first} and {second}")]
    DuplicateCodelab {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Everything collected from a site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Sorted by id.
    pub codelabs: Vec<Codelab>,
    pub views: BTreeMap<String, View>,
    /// Distinct main categories, sorted.
    pub categories: Vec<String>,
}

impl Manifest {
    pub fn view(&self, id: &str) -> Result<&View, ViewError> {
        self.views
            .get(id)
            .ok_or_else(|| ViewError::UnknownView(id.to_string()))
    }
}

/// One exported codelab, as described by its `codelab.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Codelab {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub authors: String,
    #[serde(deserialize_with = "string_or_list")]
    pub category: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "legacy_status")]
    pub status: Vec<String>,
    /// Minutes.
    pub duration: Option<u32>,
    pub updated: String,
    pub url: String,
    /// First category, or the configured default category.
    #[serde(rename = "mainCategory")]
    pub main_category: String,
    /// Directory the metadata was read from, relative to the site root.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_dir: String,
}

impl Codelab {
    /// Status check on normalized values, the same rule view excludes use.
    pub fn has_status(&self, status: &str) -> bool {
        let wanted = normalize_value(status);
        self.status.iter().any(|s| normalize_value(s) == wanted)
    }
}

/// An index view with every key resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    /// Regular expressions; a codelab matching any of them is left out.
    pub exclude: Vec<String>,
    /// Codelab ids shown first, in this order.
    pub pins: Vec<String>,
    pub sort: view::ViewSort,
    #[serde(rename = "catLevel")]
    pub cat_level: usize,
}

/// `view.json` as written: every key optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ViewFile {
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    categories: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    pins: Option<Vec<String>>,
    sort: Option<view::ViewSort>,
    #[serde(rename = "catLevel")]
    cat_level: Option<usize>,
}

impl ViewFile {
    /// Resolve against the default view. `base` is `None` for the default
    /// view itself.
    fn resolve(self, id: &str, base: Option<&View>) -> View {
        let sort = self.sort.unwrap_or(if id == DEFAULT_VIEW {
            view::ViewSort::MainCategory
        } else {
            view::ViewSort::Title
        });
        View {
            id: id.to_string(),
            title: self
                .title
                .or_else(|| base.map(|b| b.title.clone()))
                .unwrap_or_default(),
            description: self
                .description
                .or_else(|| base.map(|b| b.description.clone()))
                .unwrap_or_default(),
            tags: inherit(self.tags, base.map(|b| &b.tags)),
            categories: inherit(self.categories, base.map(|b| &b.categories)),
            exclude: inherit(self.exclude, base.map(|b| &b.exclude)),
            pins: inherit(self.pins, base.map(|b| &b.pins)),
            sort,
            cat_level: if id == DEFAULT_VIEW {
                0
            } else {
                self.cat_level
                    .or_else(|| base.map(|b| b.cat_level))
                    .unwrap_or(0)
            },
        }
    }
}

fn inherit(own: Option<Vec<String>>, base: Option<&Vec<String>>) -> Vec<String> {
    own.or_else(|| base.cloned()).unwrap_or_default()
}

/// Load the site config and collect all metadata under `root`.
pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    collect(&config, root)
}

/// Collect codelab and view metadata under `root` using `config`.
pub fn collect(config: &SiteConfig, root: &Path) -> Result<Manifest, ScanError> {
    let codelabs = collect_codelabs(config, root)?;
    let views = collect_views(&root.join(&config.views_dir))?;

    let mut categories: Vec<String> = codelabs.iter().map(|c| c.main_category.clone()).collect();
    categories.sort();
    categories.dedup();

    info!(
        codelabs = codelabs.len(),
        views = views.len(),
        categories = categories.len(),
        "collected site metadata"
    );

    Ok(Manifest {
        codelabs,
        views,
        categories,
    })
}

/// Paths of `<dir>/*/<file_name>`, sorted.
fn find_metadata_files(dir: &Path, file_name: &str) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "metadata directory not found, nothing to collect");
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(2).max_depth(2) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() == file_name {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ScanError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| ScanError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Name of the directory holding a metadata file.
fn parent_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn collect_codelabs(config: &SiteConfig, root: &Path) -> Result<Vec<Codelab>, ScanError> {
    let paths = find_metadata_files(&root.join(&config.codelabs_dir), CODELAB_FILE)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config::effective_threads(&config.processing))
        .build()?;
    let mut codelabs: Vec<Codelab> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| parse_codelab(path, root, &config.default_category))
            .collect::<Result<_, _>>()
    })?;
    codelabs.sort_by(|a, b| a.id.cmp(&b.id));

    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for codelab in &codelabs {
        if let Some(first) = seen.insert(&codelab.id, &codelab.source_dir) {
            return Err(ScanError::DuplicateCodelab {
                id: codelab.id.clone(),
                first: PathBuf::from(first),
                second: PathBuf::from(&codelab.source_dir),
            });
        }
    }
    Ok(codelabs)
}

/// Parse one `codelab.json` and fill in derived fields.
pub fn parse_codelab(path: &Path, root: &Path, default_category: &str) -> Result<Codelab, ScanError> {
    let mut codelab: Codelab = read_json(path)?;
    if codelab.id.trim().is_empty() {
        codelab.id = parent_name(path);
    }
    codelab.category.retain(|c| !c.trim().is_empty());
    codelab.main_category = codelab
        .category
        .first()
        .cloned()
        .unwrap_or_else(|| default_category.to_string());
    codelab.source_dir = path
        .parent()
        .and_then(|p| p.strip_prefix(root).ok())
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!(id = %codelab.id, path = %path.display(), "parsed codelab metadata");
    Ok(codelab)
}

fn collect_views(views_dir: &Path) -> Result<BTreeMap<String, View>, ScanError> {
    let mut files = BTreeMap::new();
    for path in find_metadata_files(views_dir, VIEW_FILE)? {
        let file: ViewFile = read_json(&path)?;
        files.insert(parent_name(&path), file);
    }

    let mut views = BTreeMap::new();
    let base = files
        .remove(DEFAULT_VIEW)
        .map(|file| file.resolve(DEFAULT_VIEW, None));
    for (id, file) in files {
        let view = file.resolve(&id, base.as_ref());
        view::compile_excludes(&view)?;
        views.insert(id, view);
    }
    if let Some(base) = base {
        view::compile_excludes(&base)?;
        views.insert(DEFAULT_VIEW.to_string(), base);
    }
    Ok(views)
}

// =============================================================================
// Lenient field formats
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::One(s)) => vec![s],
        Some(StringOrList::Many(v)) => v,
    })
}

fn legacy_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::One(s)) => parse_legacy_list(&s),
        Some(StringOrList::Many(v)) => v,
    })
}

/// Parse a legacy list string such as `"[u'ready for review', u'hidden']"`.
/// A string without brackets is a single value.
pub fn parse_legacy_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let Some(inner) = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
    else {
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    };
    inner
        .split(',')
        .map(|item| {
            let item = item.trim();
            let item = item.strip_prefix('u').filter(|s| s.starts_with(['\'', '"'])).unwrap_or(item);
            item.trim_matches(|c| c == '\'' || c == '"').trim().to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}
