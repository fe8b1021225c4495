//! Size Tree
//!
//! Nested representation of an archive listing: every path component is a
//! node, directories carry the summed apparent size of everything below them.

pub mod aggregate;
pub mod builder;
pub mod node;
pub mod path;

pub use aggregate::aggregate;
pub use builder::{BuildStats, Limits, Tree, TreeBuilder};
pub use node::{NodeKind, TreeNode};
pub use path::RootPolicy;
