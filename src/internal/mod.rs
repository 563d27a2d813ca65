//! Internal implementation details.

pub(crate) mod dispose_bag;
pub(crate) mod resolution_path;

pub(crate) use dispose_bag::DisposeBag;
pub(crate) use resolution_path::{PathGuard, ResolutionPath};
