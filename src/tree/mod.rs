//! Hierarchy traversal over the category/brand/model folder tree.

pub mod walker;

pub use walker::{derive_location, HierarchyWalker, WalkerConfig};
