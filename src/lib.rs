//! sitegraph - dependency tracking and rebuild ordering for static site builds.
//!
//! Two graphs answer the two questions an incremental build asks:
//!
//! - [`graph::DependencyMap`]: which templates does a changed file invalidate?
//! - [`graph::StageGraph`]: in which order must templates and collections be
//!   rendered so no collection is read before it is complete?
//!
//! [`reload`] turns filesystem changes into build cycles over those graphs;
//! [`cache`] persists the dependency map between runs.

pub mod cache;
pub mod cli;
pub mod config;
pub mod graph;
pub mod logger;
pub mod manifest;
pub mod reload;
pub mod state;
