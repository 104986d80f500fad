//! Command-line interface module.

mod args;
pub mod affected;
pub mod common;
pub mod deps;
pub mod order;
pub mod watch;

pub use args::{Cli, Commands};
