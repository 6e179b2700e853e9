//! Support libraries consumed by collect/compute/apply callables.
//!
//! These mirror the script fragments shipped to the panel (see
//! `easel-scripts`): the pipeline's correctness properties depend on
//! them, so they live here, tested against the in-memory document.

pub mod assets;
pub mod layout;
pub mod order;
pub mod presets;
