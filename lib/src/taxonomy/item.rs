use std::fmt;
use std::sync::Arc;

use derive_more::Deref;
use serde::Serialize;

use crate::taxonomy::Row;
use crate::util::slugify;
use crate::value::Value;

/// The display order of an item.
///
/// `Unordered` compares greater than every `Explicit` order, so items without
/// a usable order sort after all ordered ones.
///
/// ```
/// use wayfinder::Order;
///
/// assert!(Order::Explicit(i64::MAX) < Order::Unordered);
/// assert!(Order::Explicit(-4) < Order::Explicit(2));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Order {
    Explicit(i64),
    #[default]
    Unordered,
}

impl Order {
    /// Reads an order cell: an integer, an integral float, or text holding an
    /// integer. Anything else is `Unordered`.
    pub fn parse(cell: Option<&Value>) -> Order {
        let explicit = match cell {
            Some(Value::Num(n)) => n.to_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        explicit.map_or(Order::Unordered, Order::Explicit)
    }

    pub fn explicit(self) -> Option<i64> {
        match self {
            Order::Explicit(v) => Some(v),
            Order::Unordered => None,
        }
    }
}

impl From<Option<i64>> for Order {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Order::Unordered, Order::Explicit)
    }
}

/// The nesting of an item below its category, outermost segment first.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subgroup(Vec<Arc<str>>);

impl Subgroup {
    /// Splits `path` on `/` and slugifies each segment, dropping segments
    /// that slugify to nothing.
    pub fn parse(path: &str) -> Self {
        let segments = path.split('/')
            .map(slugify)
            .filter(|s| !s.is_empty())
            .map(Arc::from)
            .collect();

        Subgroup(segments)
    }

    /// A subgroup of exactly one segment named by `name`, or the top level if
    /// `name` slugifies to nothing.
    pub fn single(name: &str) -> Self {
        let segment = slugify(name);
        if segment.is_empty() {
            return Subgroup::default();
        }

        Subgroup(vec![segment.into()])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| &**s)
    }
}

impl fmt::Display for Subgroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }

            f.write_str(segment)?;
        }

        Ok(())
    }
}

/// The resolved address of an item: `/category/subgroup.../identity/`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Serialize)]
#[deref(forward)]
pub struct Location(Arc<str>);

impl Location {
    pub fn new(category: &str, subgroup: &Subgroup, identity: &str) -> Self {
        let mut location = format!("/{category}/");
        for segment in subgroup.segments() {
            location.push_str(segment);
            location.push('/');
        }

        location.push_str(identity);
        location.push('/');
        Location(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Location> for Value {
    fn from(value: Location) -> Self {
        Value::String(value.0)
    }
}

/// A normalized content item.
#[derive(derive_more::Debug, Clone)]
pub struct Item {
    /// The 1-based number of the row this item came from.
    pub row: usize,
    /// Canonical category name.
    pub category: Arc<str>,
    pub subgroup: Subgroup,
    pub identity: Arc<str>,
    pub order: Order,
    pub title: Arc<str>,
    pub location: Location,
    /// Whether this item is served at the site root.
    pub homepage: bool,
    #[debug(ignore)]
    pub body: Arc<str>,
    #[debug(ignore)]
    pub source: Arc<Row>,
}

impl Item {
    /// The public address of the item: `/` for the homepage, otherwise its
    /// location.
    pub fn permalink(&self) -> &str {
        match self.homepage {
            true => "/",
            false => self.location.as_str(),
        }
    }

    /// The title as compared when sorting.
    pub fn sort_title(&self) -> String {
        self.title.to_lowercase()
    }
}
