//! CLI subcommands.

pub mod check;
mod common;
pub mod show;
