// jctlfmt - app/mod.rs
//
// Application layer: the line-oriented stream driver and rule-set loading.
// Dependencies: core, util, standard library I/O.

pub mod rules_mgr;
pub mod stream;
