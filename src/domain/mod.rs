//! Domain layer: records, the arena tree and its construction
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod items;

pub use arena::{PostOrderIterator, Siblings, Tree, TreeIterator, TreeNode};
pub use builder::TreeBuilder;
pub use entities::{JsonId, Record};
