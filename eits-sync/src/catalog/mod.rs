//! Catalog tree traversal
//!
//! The catalog is an owned tree of groups. Everything that needs a module
//! list (fetch dispatch, diff reconciliation) goes through `flatten` so both
//! see the same canonical order.

pub mod tree;

pub use tree::{flatten, flatten_all, measures_of, module_count, MeasureRef};
