pub mod config;
pub mod error;
pub mod graph;
pub mod install;
pub mod pool;
pub mod roster;
pub mod schedule;
pub mod store;
pub mod sync;
