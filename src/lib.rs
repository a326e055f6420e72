//! Vintage Booth library - photo booth capture sessions and collage export.
//!
//! This library exposes the core of the `booth` CLI for use in tests and
//! other front ends.
//!
//! # Modules
//!
//! - `style`: style axes, color registry and contrast validation
//! - `layout`: pure arrangement engine for the five collage layouts
//! - `session`: snapshots and the capture-to-collage handoff
//! - `capture`: tick-driven countdown and auto-snap controller
//! - `collage`: collage view with memoized arrangement
//! - `export`: render tree, rasterizer and download orchestration
//! - `config`: TOML configuration
//! - `output`: output mode abstraction (robot/human)
#![forbid(unsafe_code)]

pub mod capture;
pub mod cli;
pub mod collage;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod logging;
pub mod output;
pub mod session;
pub mod style;
pub mod theme;
