//! tabdash - Tabbed, self-refreshing terminal dashboard library.
//!
//! The building blocks:
//! - `engine` - the `Dashboard` handle, command queue and worker threads
//! - `log` - log tabs, the `Logger` facade and the background file writer
//! - `monitor` - monitor tabs showing live numeric watchers
//! - `term` - terminal access behind testable traits

pub mod engine;
pub mod log;
pub mod monitor;
pub mod tab;
pub mod term;
