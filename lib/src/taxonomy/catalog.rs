use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::document::{export_record, Document, RenderOptions};
use crate::error::Result;
use crate::ring::{Links, NavMap, RingBuilder, RingConfig};
use crate::taxonomy::{Item, Location};
use crate::value::Dict;

/// The normalized items of a run and the links between them.
#[derive(derive_more::Debug)]
pub struct Catalog {
    items: Vec<Item>,
    nav: NavMap,
    #[debug(ignore)]
    index: FxHashMap<Location, usize>,
}

impl Catalog {
    /// Builds the rings over `items`, which must have unique locations.
    pub fn build(items: Vec<Item>, config: &RingConfig) -> Self {
        let nav = RingBuilder::new(config).build(&items);
        let index = items.iter()
            .enumerate()
            .map(|(i, item)| (item.location.clone(), i))
            .collect();

        Catalog { items, nav, index }
    }

    /// The items in input order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn nav(&self) -> &NavMap {
        &self.nav
    }

    pub fn item(&self, location: &Location) -> Option<&Item> {
        self.index.get(location).map(|&i| &self.items[i])
    }

    pub fn links(&self, location: &Location) -> Option<&Links> {
        self.nav.get(location)
    }

    /// The permalink of the item at `location`, or the location itself if no
    /// such item exists.
    pub fn permalink<'a>(&'a self, location: &'a Location) -> &'a str {
        self.item(location).map_or(location.as_str(), |item| item.permalink())
    }

    /// Renders every item, in parallel. Documents are returned in item order.
    pub fn par_render(&self, options: &RenderOptions) -> Result<Vec<Document>> {
        let empty = Links::default();
        self.items.par_iter()
            .map(|item| {
                let links = self.links(&item.location).unwrap_or(&empty);
                Document::new(item, links, self, options)
            })
            .collect()
    }

    /// One export record per item, in item order.
    pub fn snapshot(&self) -> Vec<Dict> {
        self.items.iter().map(export_record).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
