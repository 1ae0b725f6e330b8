//! LARS risk prediction page
//!
//! Serves a single interactive page that collects the eight clinical
//! inputs, runs the loaded classifier on demand and shows the result.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod page;
