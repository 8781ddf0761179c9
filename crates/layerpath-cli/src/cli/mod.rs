//! CLI command implementations.
//!
//! This module contains the implementations for the various CLI subcommands:
//! - `print` - G-code for every part of a config file
//! - `layer` - One ordered layer as SVG or JSON
//! - `infill` - Inspect the infill pipeline stage by stage
//! - `preview` - PNG render of one ordered layer

pub mod common;
pub mod config;
pub mod gcode;
pub mod infill;
pub mod layer;
pub mod preview;
pub mod print;
