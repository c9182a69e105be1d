//! Navigation rings.
//!
//! Every item belongs to exactly three rings: its **local** ring (same
//! category and subgroup), its **category** ring, and the single **global**
//! ring. A ring is a sorted sequence; an item's `prev` and `next` in a ring
//! are its neighbors in that sequence. What the ends of a ring point to is
//! decided by the configured [`Boundary`].

mod nav;

pub use nav::*;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::taxonomy::{Item, Order, Subgroup};

/// Caller-supplied ring settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    #[serde(default)]
    pub boundary: Boundary,
    /// Category block order of the global ring. Categories not listed follow
    /// in the order they are first seen in the item list.
    #[serde(default)]
    pub order: Vec<Arc<str>>,
}

/// Sort key within a local ring. The identity makes the order total.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct LocalKey<'a> {
    order: Order,
    title: String,
    identity: &'a str,
}

impl<'a> LocalKey<'a> {
    fn of(item: &'a Item) -> Self {
        LocalKey { order: item.order, title: item.sort_title(), identity: &item.identity }
    }
}

/// Sort key within a category ring: subgroup first, then the local key.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CategoryKey<'a> {
    subgroup: &'a Subgroup,
    local: LocalKey<'a>,
}

impl<'a> CategoryKey<'a> {
    fn of(item: &'a Item) -> Self {
        CategoryKey { subgroup: &item.subgroup, local: LocalKey::of(item) }
    }
}

#[derive(Debug)]
pub struct RingBuilder<'c> {
    config: &'c RingConfig,
}

impl<'c> RingBuilder<'c> {
    pub fn new(config: &'c RingConfig) -> Self {
        RingBuilder { config }
    }

    /// Computes the links of every item in `items`.
    ///
    /// Items are expected to have unique locations. The result depends only
    /// on the set of items, not on their order in `items`, except for the
    /// block position of categories missing from the configured order.
    pub fn build(&self, items: &[Item]) -> NavMap {
        let mut nav = NavMap::default();

        let mut seen: Vec<&str> = vec![];
        let mut categories: FxHashMap<&str, Vec<&Item>> = FxHashMap::default();
        let mut locals: FxHashMap<(&str, &Subgroup), Vec<&Item>> = FxHashMap::default();
        for item in items {
            let members = categories.entry(&*item.category).or_insert_with(|| {
                seen.push(&*item.category);
                vec![]
            });

            members.push(item);
            locals.entry((&*item.category, &item.subgroup)).or_default().push(item);
        }

        for ring in locals.values_mut() {
            ring.sort_by_cached_key(|item| LocalKey::of(*item));
            self.link(&mut nav, RingKind::Local, ring);
        }

        for ring in categories.values_mut() {
            ring.sort_by_cached_key(|item| CategoryKey::of(*item));
            self.link(&mut nav, RingKind::Category, ring);
        }

        let global: Vec<&Item> = self.blocks(&seen)
            .into_iter()
            .flat_map(|category| categories[category].iter().copied())
            .collect();

        self.link(&mut nav, RingKind::Global, &global);

        tracing::debug!(
            items = items.len(),
            local_rings = locals.len(),
            category_rings = categories.len(),
            "built navigation rings"
        );

        nav
    }

    /// The global block order: configured categories that have items, then
    /// the remaining categories in first-seen order.
    fn blocks<'i>(&self, seen: &[&'i str]) -> Vec<&'i str> {
        let mut blocks: Vec<&'i str> = Vec::with_capacity(seen.len());
        let configured = self.config.order.iter()
            .filter_map(|name| seen.iter().find(|c| **c == &**name).copied());

        for category in configured.chain(seen.iter().copied()) {
            if !blocks.contains(&category) {
                blocks.push(category);
            }
        }

        blocks
    }

    fn link(&self, nav: &mut NavMap, kind: RingKind, ring: &[&Item]) {
        let (Some(first), Some(last)) = (ring.first(), ring.last()) else {
            return;
        };

        let wrap = self.config.boundary == Boundary::Wrap;
        for (i, item) in ring.iter().enumerate() {
            let prev = match i {
                0 => wrap.then_some(last),
                _ => ring.get(i - 1),
            };

            let next = match ring.get(i + 1) {
                Some(next) => Some(next),
                None => wrap.then_some(first),
            };

            let location = |item: Option<&&Item>| item.map(|item| item.location.clone());
            nav.links_mut(&item.location).set(kind, location(prev), location(next));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{Location, Row};

    fn item(category: &str, subgroup: &str, identity: &str, order: Option<i64>, title: &str) -> Item {
        let subgroup = Subgroup::parse(subgroup);
        Item {
            row: 0,
            location: Location::new(category, &subgroup, identity),
            category: category.into(),
            subgroup,
            identity: identity.into(),
            order: order.into(),
            title: title.into(),
            homepage: false,
            body: "".into(),
            source: Arc::new(Row::default()),
        }
    }

    fn config(boundary: Boundary, order: &[&str]) -> RingConfig {
        RingConfig { boundary, order: order.iter().map(|&c| c.into()).collect() }
    }

    fn loc(s: &str) -> Location {
        let (category, rest) = s.trim_matches('/').split_once('/').unwrap();
        let (subgroup, identity) = rest.rsplit_once('/').unwrap_or(("", rest));
        Location::new(category, &Subgroup::parse(subgroup), identity)
    }

    /// The sequence of a ring, walked from `start` by following `next`.
    fn walk(nav: &NavMap, kind: RingKind, start: &Location) -> Vec<Location> {
        let mut seen = vec![start.clone()];
        let mut current = start.clone();
        while let Some(next) = nav.get(&current).unwrap().next(kind) {
            if next == start {
                break;
            }

            seen.push(next.clone());
            current = next.clone();
        }

        seen
    }

    fn sample() -> Vec<Item> {
        vec![
            item("songs", "album-x", "bravo", Some(2), "Bravo"),
            item("songs", "album-x", "alpha", None, "Alpha"),
            item("songs", "album-x", "charlie", Some(1), "Charlie"),
            item("songs", "album-y", "delta", Some(1), "Delta"),
            item("songs", "", "echo", None, "echo"),
            item("article", "", "foxtrot", Some(5), "Foxtrot"),
            item("article", "", "golf", Some(5), "golf"),
            item("photograph", "", "hotel", None, "Hotel"),
        ]
    }

    #[test]
    fn local_order_puts_unordered_last() {
        let items = sample();
        let nav = RingBuilder::new(&config(Boundary::NoWrap, &[])).build(&items);

        let charlie = loc("/songs/album-x/charlie/");
        let bravo = loc("/songs/album-x/bravo/");
        let alpha = loc("/songs/album-x/alpha/");

        assert_eq!(walk(&nav, RingKind::Local, &charlie), [charlie.clone(), bravo.clone(), alpha.clone()]);
        assert_eq!(nav.get(&charlie).unwrap().local_prev, None);
        assert_eq!(nav.get(&alpha).unwrap().local_next, None);
        assert_eq!(nav.get(&bravo).unwrap().local_prev.as_ref(), Some(&charlie));
        assert_eq!(nav.get(&bravo).unwrap().local_next.as_ref(), Some(&alpha));
    }

    #[test]
    fn category_ring_clusters_by_subgroup() {
        let items = sample();
        let nav = RingBuilder::new(&config(Boundary::NoWrap, &[])).build(&items);

        let order = walk(&nav, RingKind::Category, &loc("/songs/echo/"));
        let order: Vec<&str> = order.iter().map(|l| l.as_str()).collect();
        assert_eq!(order, [
            "/songs/echo/",
            "/songs/album-x/charlie/",
            "/songs/album-x/bravo/",
            "/songs/album-x/alpha/",
            "/songs/album-y/delta/",
        ]);
    }

    #[test]
    fn ties_break_on_identity() {
        let items = vec![
            item("article", "", "b-post", Some(1), "Same"),
            item("article", "", "a-post", Some(1), "same"),
            item("article", "", "c-post", Some(1), "SAME"),
        ];

        let nav = RingBuilder::new(&config(Boundary::NoWrap, &[])).build(&items);
        let order = walk(&nav, RingKind::Local, &loc("/article/a-post/"));
        let order: Vec<&str> = order.iter().map(|l| l.as_str()).collect();
        assert_eq!(order, ["/article/a-post/", "/article/b-post/", "/article/c-post/"]);
    }

    #[test]
    fn global_blocks_follow_configured_order() {
        let items = vec![
            item("b", "", "b1", Some(1), "B1"),
            item("a", "", "a2", Some(2), "A2"),
            item("b", "", "b2", Some(2), "B2"),
            item("a", "", "a1", Some(1), "A1"),
        ];

        let nav = RingBuilder::new(&config(Boundary::NoWrap, &["a", "b", "c"])).build(&items);
        let order = walk(&nav, RingKind::Global, &loc("/a/a1/"));
        let order: Vec<&str> = order.iter().map(|l| l.as_str()).collect();
        assert_eq!(order, ["/a/a1/", "/a/a2/", "/b/b1/", "/b/b2/"]);
        assert_eq!(nav.get(&loc("/a/a1/")).unwrap().global_prev, None);
        assert_eq!(nav.get(&loc("/b/b2/")).unwrap().global_next, None);
    }

    #[test]
    fn unlisted_categories_follow_in_first_seen_order() {
        let items = vec![
            item("z", "", "z1", None, "Z"),
            item("b", "", "b1", None, "B"),
            item("y", "", "y1", None, "Y"),
        ];

        let nav = RingBuilder::new(&config(Boundary::NoWrap, &["b"])).build(&items);
        let order = walk(&nav, RingKind::Global, &loc("/b/b1/"));
        let order: Vec<&str> = order.iter().map(|l| l.as_str()).collect();
        assert_eq!(order, ["/b/b1/", "/z/z1/", "/y/y1/"]);
    }

    #[test]
    fn no_wrap_leaves_ends_open() {
        let items = sample();
        let nav = RingBuilder::new(&config(Boundary::NoWrap, &["songs", "article", "photograph"])).build(&items);

        for kind in RingKind::ALL {
            let firsts = nav.iter().filter(|(_, links)| links.prev(kind).is_none()).count();
            let lasts = nav.iter().filter(|(_, links)| links.next(kind).is_none()).count();
            let rings = match kind {
                RingKind::Local => 5,
                RingKind::Category => 3,
                RingKind::Global => 1,
            };

            assert_eq!(firsts, rings, "{kind:?}");
            assert_eq!(lasts, rings, "{kind:?}");
        }

        let first = loc("/songs/echo/");
        let last = loc("/photograph/hotel/");
        assert_eq!(nav.get(&first).unwrap().global_prev, None);
        assert_eq!(nav.get(&last).unwrap().global_next, None);
        assert_eq!(walk(&nav, RingKind::Global, &first).len(), items.len());
    }

    #[test]
    fn wrap_closes_every_ring() {
        let items = sample();
        let nav = RingBuilder::new(&config(Boundary::Wrap, &["songs", "article", "photograph"])).build(&items);

        for (location, links) in nav.iter() {
            for kind in RingKind::ALL {
                assert!(links.prev(kind).is_some() && links.next(kind).is_some(), "{location} {kind:?}");
            }
        }

        let first = loc("/songs/echo/");
        let last = loc("/photograph/hotel/");
        assert_eq!(nav.get(&first).unwrap().global_prev.as_ref(), Some(&last));
        assert_eq!(nav.get(&last).unwrap().global_next.as_ref(), Some(&first));
    }

    #[test]
    fn single_item_rings() {
        let items = vec![item("photograph", "", "hotel", None, "Hotel")];
        let only = loc("/photograph/hotel/");

        let nav = RingBuilder::new(&config(Boundary::Wrap, &[])).build(&items);
        let links = nav.get(&only).unwrap();
        for kind in RingKind::ALL {
            assert_eq!(links.prev(kind), Some(&only));
            assert_eq!(links.next(kind), Some(&only));
        }

        let nav = RingBuilder::new(&config(Boundary::NoWrap, &[])).build(&items);
        assert!(nav.get(&only).unwrap().is_empty());
    }

    #[test]
    fn prev_and_next_are_inverse() {
        let items = sample();
        for boundary in [Boundary::Wrap, Boundary::NoWrap] {
            let nav = RingBuilder::new(&config(boundary, &["article"])).build(&items);
            assert_eq!(nav.len(), items.len());

            for (location, links) in nav.iter() {
                for kind in RingKind::ALL {
                    if let Some(prev) = links.prev(kind) {
                        assert_eq!(nav.get(prev).unwrap().next(kind), Some(location));
                    }

                    if let Some(next) = links.next(kind) {
                        assert_eq!(nav.get(next).unwrap().prev(kind), Some(location));
                    }
                }
            }
        }
    }

    #[test]
    fn input_order_does_not_matter() {
        let items = sample();
        let config = config(Boundary::Wrap, &["photograph", "songs", "article"]);
        let expected = RingBuilder::new(&config).build(&items);

        let mut reversed = items.clone();
        reversed.reverse();
        assert_eq!(RingBuilder::new(&config).build(&reversed), expected);

        let mut rotated = items.clone();
        rotated.rotate_left(3);
        assert_eq!(RingBuilder::new(&config).build(&rotated), expected);
        assert_eq!(RingBuilder::new(&config).build(&items), expected);
    }

    #[test]
    fn empty_input() {
        let nav = RingBuilder::new(&RingConfig::default()).build(&[]);
        assert!(nav.is_empty());
    }
}
