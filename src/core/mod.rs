//! Core kitchen logic — types, yield engine, parsing, storage, task board.

pub mod auth;
pub mod board;
pub mod config;
pub mod error;
pub mod parser;
pub mod store;
pub mod types;
pub mod yield_engine;
