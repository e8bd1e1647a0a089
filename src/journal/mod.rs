//! Journal — the brigade's activity history.

pub mod eventlog;
