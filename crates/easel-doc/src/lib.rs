//! In-memory document tree for the Easel task pipeline.
//!
//! The host application owns the real document; this crate models the
//! same tree (layers containing items, groups containing items, groups
//! possibly clipping) so the pipeline and its support libraries can run
//! against it and be tested without a host.
//!
//! # Tree shape
//!
//! ```text
//! Document
//!   ├── Layer "Background"
//!   │     ├── PathItem
//!   │     └── GroupItem (clipped)
//!   │           ├── PathItem   ← mask (first child)
//!   │           └── PlacedItem ← masked content
//!   └── Layer "Panels"
//!         └── TextFrame
//! ```
//!
//! Items are arena-allocated and addressed by [`ItemId`]. Walking up a
//! `parent` chain always terminates at a typed [`Parent::Layer`] root;
//! there is no way to express a cycle.
//!
//! # Coordinates
//!
//! Host coordinate system: points, Y increasing upward, so a bounds
//! rectangle has `top > bottom`. See [`Bounds`].

pub mod bounds;
pub mod document;
pub mod geometry;
pub mod item;

pub use bounds::Bounds;
pub use document::{DocError, Document, Layer, LayerId};
pub use geometry::{mm_to_points, points_to_mm, GeometryPolicy, POINTS_PER_MM};
pub use item::{ItemId, ItemKind, Parent};
