use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::taxonomy::Location;

/// What happens at the ends of a ring.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Boundary {
    /// The first item's predecessor is the last item and vice versa.
    Wrap,
    /// The first item has no predecessor; the last has no successor.
    #[default]
    NoWrap,
}

/// The three orderings every item takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingKind {
    /// Items sharing a category and subgroup.
    Local,
    /// All items of a category.
    Category,
    /// All items, category blocks in configured order.
    Global,
}

impl RingKind {
    pub const ALL: [RingKind; 3] = [RingKind::Local, RingKind::Category, RingKind::Global];

    pub fn prev_key(self) -> &'static str {
        match self {
            RingKind::Local => "local_prev",
            RingKind::Category => "category_prev",
            RingKind::Global => "global_prev",
        }
    }

    pub fn next_key(self) -> &'static str {
        match self {
            RingKind::Local => "local_next",
            RingKind::Category => "category_next",
            RingKind::Global => "global_next",
        }
    }
}

/// The neighbors of one item. Absent slots are skipped when serialized.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Links {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_prev: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_next: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_prev: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_next: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_prev: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_next: Option<Location>,
}

impl Links {
    pub fn prev(&self, kind: RingKind) -> Option<&Location> {
        match kind {
            RingKind::Local => self.local_prev.as_ref(),
            RingKind::Category => self.category_prev.as_ref(),
            RingKind::Global => self.global_prev.as_ref(),
        }
    }

    pub fn next(&self, kind: RingKind) -> Option<&Location> {
        match kind {
            RingKind::Local => self.local_next.as_ref(),
            RingKind::Category => self.category_next.as_ref(),
            RingKind::Global => self.global_next.as_ref(),
        }
    }

    pub(crate) fn set(&mut self, kind: RingKind, prev: Option<Location>, next: Option<Location>) {
        let (p, n) = match kind {
            RingKind::Local => (&mut self.local_prev, &mut self.local_next),
            RingKind::Category => (&mut self.category_prev, &mut self.category_next),
            RingKind::Global => (&mut self.global_prev, &mut self.global_next),
        };

        *p = prev;
        *n = next;
    }

    /// The present slots as `(name, location)`, in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Location)> {
        RingKind::ALL.into_iter().flat_map(move |kind| {
            let prev = self.prev(kind).map(|loc| (kind.prev_key(), loc));
            let next = self.next(kind).map(|loc| (kind.next_key(), loc));
            prev.into_iter().chain(next)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Every item's links, keyed by location.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavMap {
    map: BTreeMap<Location, Links>,
}

impl NavMap {
    pub fn get(&self, location: &Location) -> Option<&Links> {
        self.map.get(location)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Location, &Links)> {
        self.map.iter()
    }

    pub(crate) fn links_mut(&mut self, location: &Location) -> &mut Links {
        self.map.entry(location.clone()).or_default()
    }
}
