use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ring::{Boundary, RingConfig};
use crate::util::category_key;

/// One allowed category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Canonical name, used in locations and output directories.
    pub name: Arc<str>,
    /// Other spellings that resolve to this category.
    #[serde(default)]
    pub aliases: Vec<Arc<str>>,
    /// The column whose value nests items one level below the category when
    /// no explicit `path` is given, e.g. `album` or `series`.
    #[serde(default)]
    pub group: Option<Arc<str>>,
}

impl CategorySpec {
    pub fn new(name: &str) -> Self {
        CategorySpec { name: name.into(), aliases: vec![], group: None }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn group(mut self, column: &str) -> Self {
        self.group = Some(column.into());
        self
    }
}

/// The allowed categories, their global order, and normalization defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(rename = "category", default)]
    pub categories: Vec<CategorySpec>,
    /// Global ring block order. Defaults to declaration order.
    #[serde(default)]
    pub order: Option<Vec<Arc<str>>>,
    /// Title for rows with neither a title nor body text.
    #[serde(default = "Taxonomy::default_placeholder")]
    pub placeholder: Arc<str>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Taxonomy::new(vec![])
    }
}

impl Taxonomy {
    pub const DEFAULT_PLACEHOLDER: &'static str = "Untitled Work";

    fn default_placeholder() -> Arc<str> {
        Self::DEFAULT_PLACEHOLDER.into()
    }

    pub fn new(categories: Vec<CategorySpec>) -> Self {
        Taxonomy { categories, order: None, placeholder: Self::default_placeholder() }
    }

    pub fn with_order<I, S>(mut self, order: I) -> Self
        where I: IntoIterator<Item = S>, S: AsRef<str>
    {
        self.order = Some(order.into_iter().map(|s| s.as_ref().into()).collect());
        self
    }

    /// Maps every normalized name and alias to the index of its category.
    /// Fails if two categories claim the same key.
    pub fn lookup(&self) -> Result<FxHashMap<String, usize>> {
        let mut keys: FxHashMap<String, usize> = FxHashMap::default();
        for (i, spec) in self.categories.iter().enumerate() {
            let names = std::iter::once(&spec.name).chain(spec.aliases.iter());
            for name in names {
                let key = category_key(name);
                if let Some(&j) = keys.get(&key) {
                    if j != i {
                        return err! {
                            "category name or alias is claimed twice",
                            "name" => name,
                            "first category" => self.categories[j].name,
                            "second category" => spec.name,
                        };
                    }
                }

                keys.insert(key, i);
            }
        }

        Ok(keys)
    }

    /// Checks that names are unique and that every order entry names a
    /// category.
    pub fn validate(&self) -> Result<()> {
        let keys = self.lookup()?;
        for entry in self.order.iter().flatten() {
            if !keys.contains_key(&category_key(entry)) {
                return err! {
                    "global order names an unknown category",
                    "entry" => entry,
                };
            }
        }

        Ok(())
    }

    /// Resolves a raw category value, a name or alias in any spelling, to
    /// its category.
    pub fn resolve(&self, raw: &str) -> Option<&CategorySpec> {
        let key = category_key(raw);
        self.categories.iter().find(|spec| {
            std::iter::once(&spec.name)
                .chain(spec.aliases.iter())
                .any(|name| category_key(name) == key)
        })
    }

    /// Canonical category names in global block order.
    pub fn global_order(&self) -> Vec<Arc<str>> {
        match &self.order {
            Some(order) => order.iter()
                .filter_map(|entry| self.resolve(entry))
                .map(|spec| spec.name.clone())
                .collect(),
            None => self.categories.iter().map(|spec| spec.name.clone()).collect(),
        }
    }

    pub fn ring_config(&self, boundary: Boundary) -> RingConfig {
        RingConfig { boundary, order: self.global_order() }
    }
}
