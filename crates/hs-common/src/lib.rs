//! Shared infrastructure for Homestead services.

pub mod logging;
