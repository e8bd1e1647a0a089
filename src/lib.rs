//! Tchitchen — mise en place for a kitchen brigade.
//!
//! Recipe yield scaling, consolidated procurement lists, a task board and an
//! activity journal, driven from the command line over a plain YAML file.

pub mod cli;
pub mod core;
pub mod journal;
