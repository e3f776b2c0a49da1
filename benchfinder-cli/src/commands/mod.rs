//! CLI command implementations.
//!
//! - [`config`] - Configuration inspection (show, path)
//! - [`init`] - Configuration initialization
//! - [`nearby`] - One-shot nearby query
//! - [`refresh`] - Dataset replacement
//! - [`serve`] - Scheduled refresh plus stdin query loop

pub mod common;
pub mod config;
pub mod init;
pub mod nearby;
pub mod refresh;
pub mod serve;
