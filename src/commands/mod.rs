//! CLI commands

pub mod add;
pub mod check;
pub mod display;
pub mod edit;
pub mod list;
pub mod remove;
pub mod reset;
pub mod share;
pub mod utils;
