//! ExtendScript library resolution and script templates.
//!
//! Scripts shipped to the panel are composed from a manifest of
//! interdependent fragments: the [`LibraryResolver`] expands a request
//! set to its transitive closure in dependency order, includes each
//! fragment exactly once, refuses cycles and exported-symbol
//! collisions, and caches resolved concatenations.
//!
//! The default fragment set is embedded at compile time (see
//! [`embedded`]); a directory of `.jsx` files plus `manifest.json` can
//! override it for development.

pub mod embedded;
pub mod manifest;
pub mod resolver;
pub mod templates;

pub use manifest::{LibraryEntry, LibraryManifest};
pub use resolver::{LibraryResolver, ResolveError};
pub use templates::js_string;
