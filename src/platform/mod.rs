// jctlfmt - platform/mod.rs
//
// Platform abstraction layer: config directories and config.toml.
// Dependencies: standard library, directories crate.
// Must NOT depend on: core, app.

pub mod config;
