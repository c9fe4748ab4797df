//! Library parts of the `gtm-deploy` command.

pub mod config;
pub mod logging;
pub mod result;
pub mod summary;
