//! Internal layout: configuration, injected effects, conda plumbing, and the
//! install/uninstall/list workflows built on top of them.

pub(crate) mod conda;
pub(crate) mod config;
pub(crate) mod runtime;
pub(crate) mod tooling;
pub(crate) mod tools;
