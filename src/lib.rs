//! Build multi-root hierarchies from flat parent-linked records.
//!
//! Records carry an identifier and the identifier of their parent, like rows with a
//! foreign key. [`TreeBuilder`] links them into an arena-backed [`Tree`] regardless of
//! input order; the tree can then be walked ([`Tree::visit`]), queried
//! ([`Tree::get_node_by_id`]), pruned in place ([`Tree::filter`]) and turned back into
//! nested records ([`Tree::get_root_items`]).
//!
//! Extra items become virtual roots: they are listed and looked up like any root, but
//! never adopt children. Records naming a virtual root as parent stay top-level.
//!
//! ```
//! use flattree::{JsonId, TreeBuilder};
//! use serde_json::{json, Value};
//!
//! let tree = TreeBuilder::<Value>::new()
//!     .items(vec![
//!         json!({"id": 2, "parentId": 1}),
//!         json!({"id": 1}),
//!     ])
//!     .build();
//!
//! assert!(tree.get_node_by_id(&JsonId::from(2i64)).is_some());
//! assert_eq!(
//!     tree.get_root_items(),
//!     vec![json!({"id": 1, "children": [{"id": 2, "parentId": 1}]})]
//! );
//! ```

pub mod config;
pub mod domain;
pub mod errors;
pub mod tree_traits;
pub mod util;

pub use config::{RawTreeOptions, TreeOptions};
pub use domain::{JsonId, Record, Siblings, Tree, TreeBuilder, TreeNode};
pub use errors::{TreeError, TreeResult};
pub use tree_traits::TreeNodeConvert;
