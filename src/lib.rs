//! ARM CPU variant detection for container image platform matching
//!
//! Call [`hardware::init_variant`] once at startup, then read the cached
//! value anywhere with [`hardware::cpu_variant`].

pub mod config;
pub mod hardware;
