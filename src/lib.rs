// jctlfmt - lib.rs
//
// Library entry point. The binaries in `main.rs` and `bin/` are thin
// wrappers around these modules; custom formatters can be built on the
// public `core::formatter::Formatter` trait.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
