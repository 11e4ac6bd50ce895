// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod detect;
pub mod export;
pub mod fetch;
pub mod model;
pub mod reconcile;
pub mod runs;
pub mod stats;
pub mod tables;
pub mod winrate;
