//! Dependency resolution.
//!
//! Resolution is deliberately small: the store's "latest version" policy for
//! update decisions, a flattened depth-first transitive closure, and the
//! indented tree renderer behind `wharf list`. There is no version-range
//! algebra and no conflict resolution.

pub mod resolve;
pub mod tree;

pub use resolve::{DependencyResolver, ResolvedDependencySet, UpdateDecision};
pub use tree::DependencyTreePrinter;
