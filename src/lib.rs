//! helix-sidekick library
//!
//! Core functionality of the Helix sidekick: deciding which project
//! configurations apply to a page, and when the sidekick helper is shown,
//! loaded or offered as a choice.

pub mod config;
pub mod sidekick;
