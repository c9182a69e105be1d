//! Turning raw rows into [`Item`]s.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::taxonomy::{Item, Location, Order, Row, Subgroup, Taxonomy};
use crate::util::{category_key, first_nonblank_line, normalize_body, slugify};

/// Identity used when a title slugifies to nothing.
pub const FALLBACK_IDENTITY: &str = "work";

/// Why a row produced no item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Neither `category` nor `collection` holds a value.
    MissingCategory,
    /// The category is not one of the allowed categories.
    UnknownCategory(Arc<str>),
    /// Same category, title, and body as an earlier row.
    Duplicate { of: usize },
    /// The explicit slug has an empty, `.`, or `..` segment, or a `\`.
    InvalidSlug(Arc<str>),
    /// Resolves to the same location as an earlier row.
    LocationCollision { location: Location, of: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingCategory => write!(f, "missing category"),
            RejectReason::UnknownCategory(name) => write!(f, "unknown category '{name}'"),
            RejectReason::Duplicate { of } => write!(f, "duplicate of row {of}"),
            RejectReason::InvalidSlug(slug) => write!(f, "invalid slug '{slug}'"),
            RejectReason::LocationCollision { location, of } => {
                write!(f, "location collision with row {of} at {location}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The 1-based row number.
    pub row: usize,
    pub reason: RejectReason,
}

/// The surviving items, in input order, and the rejected rows.
#[derive(Debug, Default)]
pub struct Normalized {
    pub items: Vec<Item>,
    pub rejections: Vec<Rejection>,
}

#[derive(Debug)]
pub struct Normalizer<'t> {
    taxonomy: &'t Taxonomy,
    keys: FxHashMap<String, usize>,
}

impl<'t> Normalizer<'t> {
    /// Fails if the taxonomy's names or order entries are inconsistent.
    pub fn new(taxonomy: &'t Taxonomy) -> Result<Self> {
        taxonomy.validate()?;
        Ok(Normalizer { taxonomy, keys: taxonomy.lookup()? })
    }

    /// Normalizes the row numbered `row` on its own.
    pub fn normalize(&self, row: usize, source: &Row) -> Result<Item, Rejection> {
        let reject = |reason| Rejection { row, reason };

        let raw_category = source.text("category")
            .or_else(|| source.text("collection"))
            .ok_or_else(|| reject(RejectReason::MissingCategory))?;

        let spec = self.keys.get(&category_key(&raw_category))
            .map(|&i| &self.taxonomy.categories[i])
            .ok_or_else(|| reject(RejectReason::UnknownCategory(raw_category.into())))?;

        let body = source.raw_text("body_md")
            .map(|body| normalize_body(&body))
            .unwrap_or_default();

        let title: Arc<str> = match source.text("title") {
            Some(title) => title.into(),
            None => match first_nonblank_line(&body) {
                Some(line) => line.into(),
                None => self.taxonomy.placeholder.clone(),
            },
        };

        let subgroup = match source.text("path") {
            Some(path) => Subgroup::parse(&path),
            None => spec.group.as_deref()
                .and_then(|column| source.text(column))
                .map(|name| Subgroup::single(&name))
                .unwrap_or_default(),
        };

        let explicit = source.text("slug")
            .map(|slug| slug.trim_matches('/').to_string())
            .filter(|slug| !slug.is_empty());

        if let Some(slug) = explicit.as_deref() {
            let unsafe_segment = |segment: &str| {
                matches!(segment, "" | "." | "..") || segment.contains('\\')
            };

            if slug.split('/').any(unsafe_segment) {
                return Err(reject(RejectReason::InvalidSlug(slug.into())));
            }
        }

        let identity: Arc<str> = match explicit {
            Some(slug) => slug.into(),
            None => match slugify(&title) {
                slug if slug.is_empty() => FALLBACK_IDENTITY.into(),
                slug => slug.into(),
            },
        };

        Ok(Item {
            row,
            location: Location::new(&spec.name, &subgroup, &identity),
            category: spec.name.clone(),
            subgroup,
            identity,
            order: Order::parse(source.get("order")),
            title,
            homepage: source.flag("is_homepage"),
            body: body.into(),
            source: Arc::new(source.clone()),
        })
    }

    /// Normalizes every row, in order, then drops duplicate rows and location
    /// collisions (keeping the first) and clears all but the first homepage
    /// flag. Rows are numbered from 1.
    pub fn normalize_all<I: IntoIterator<Item = Row>>(&self, rows: I) -> Normalized {
        let mut normalized = Normalized::default();
        let mut contents: FxHashMap<(Arc<str>, String, String), usize> = FxHashMap::default();
        let mut locations: FxHashMap<Location, usize> = FxHashMap::default();
        let mut homepage: Option<usize> = None;

        let mut reject = |rejection: Rejection| {
            tracing::warn!(row = rejection.row, "skipping row: {}", rejection.reason);
            normalized.rejections.push(rejection);
        };

        let mut items = vec![];
        for (i, row) in rows.into_iter().enumerate() {
            let mut item = match self.normalize(i + 1, &row) {
                Ok(item) => item,
                Err(rejection) => {
                    reject(rejection);
                    continue;
                }
            };

            let content = duplicate_key(&item);
            if let Some(&of) = contents.get(&content) {
                reject(Rejection { row: item.row, reason: RejectReason::Duplicate { of } });
                continue;
            }

            if let Some(&of) = locations.get(&item.location) {
                let location = item.location.clone();
                reject(Rejection { row: item.row, reason: RejectReason::LocationCollision { location, of } });
                continue;
            }

            contents.insert(content, item.row);
            locations.insert(item.location.clone(), item.row);

            if item.homepage {
                match homepage {
                    Some(first) => {
                        tracing::warn!(row = item.row, first, "multiple homepage rows; keeping the first");
                        item.homepage = false;
                    }
                    None => homepage = Some(item.row),
                }
            }

            items.push(item);
        }

        if homepage.is_none() {
            tracing::info!("no homepage row; nothing will be served at `/`");
        }

        normalized.items = items;
        normalized
    }
}

/// `(category, title, body)` as two rows are compared for duplication. The
/// title is the lowercased explicit or body-derived title, empty when neither
/// exists. The body is lowercased with only line endings normalized and outer
/// whitespace trimmed, so blank-line runs still tell rows apart.
fn duplicate_key(item: &Item) -> (Arc<str>, String, String) {
    let body = item.source.raw_text("body_md")
        .map(|body| body.replace("\r\n", "\n").replace('\r', "\n"))
        .unwrap_or_default();

    let title = match item.source.text("title") {
        Some(title) => title.to_lowercase(),
        None => first_nonblank_line(&body).unwrap_or_default().to_lowercase(),
    };

    (item.category.clone(), title, body.trim().to_lowercase())
}
