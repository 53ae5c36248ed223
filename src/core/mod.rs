// jctlfmt - core/mod.rs
//
// Core business logic layer: record model, parsing, formatting, rule sets.
// Must NOT depend on: app or platform. Writers are passed in by callers.

pub mod dedup;
pub mod export;
pub mod formatter;
pub mod model;
pub mod parser;
pub mod rules;
