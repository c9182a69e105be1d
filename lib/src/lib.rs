#![doc = svgbobdoc::transform!(
//! Navigable static-site documents from spreadsheet rows.
//!
//! # Overview
//!
//! Wayfinder turns flat content rows into items addressed by _location_ and
//! links every item to its neighbors in three orderings, called _rings_:
//!
//! ```svgbob
//!  global:   +-----------------------------+   +-----------------+
//!            | category "photograph"       |-->| category "songs"|
//!            +-----------------------------+   +--------+--------+
//!                                                       |
//!  category:          +---------------------------------+
//!                     |                                 |
//!                +----+-----+                     +-----+----+
//!  local:        | album-x  |                     | album-y  |
//!                +----+-----+                     +-----+----+
//!                     |                                 |
//!           +-----+  +-----+  +-----+          +-----+  +-----+
//!           |  1  |->|  2  |->|  ?  |          |  1  |->|  ?  |
//!           +-----+  +-----+  +-----+          +-----+  +-----+
//! ```
//!
//!   * The **local** ring holds the items of one category and subgroup,
//!     sorted by explicit order (unordered items last), then title, then
//!     identity.
//!
//!   * The **category** ring holds all items of a category, clustered by
//!     subgroup.
//!
//!   * The **global** ring holds every item, one block per category in the
//!     configured order.
//!
//! Ring ends either wrap around or stay open, depending on the configured
//! [`Boundary`].
//!
//! ## Generating
//!
//! A run proceeds as follows:
//!
//! 1. Rows are normalized into [`Item`]s by a [`Normalizer`]. Rows with a
//!    missing or unknown category, duplicate rows, and rows colliding on a
//!    location are rejected with a [`RejectReason`].
//! 2. A [`Catalog`] computes the [`NavMap`] over all surviving items.
//! 3. Each item is rendered, in parallel, into a [`Document`] with front
//!    matter and a `nav` table of neighbor permalinks.
//! 4. Documents are written, and stale generated documents are [`prune`]d.
//!
//! [`Normalizer`]: normalize::Normalizer
//! [`RejectReason`]: normalize::RejectReason
//! [`Document`]: document::Document
//! [`prune`]: prune::prune
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod value;
pub mod taxonomy;
pub mod ring;
pub mod normalize;
pub mod document;
pub mod prune;

pub use taxonomy::*;
pub use ring::*;

pub use rayon;
