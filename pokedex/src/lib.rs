//! Pokedex TUI
//!
//! Catalog listing, name ordering, search and lazy detail resolution over
//! PokeAPI, plus the dispatch-driven terminal front end.

pub mod action;
pub mod api;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod effect;
pub mod error;
pub mod logging;
pub mod model;
pub mod reducer;
pub mod resolver;
pub mod search;
pub mod sort;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod ui;
