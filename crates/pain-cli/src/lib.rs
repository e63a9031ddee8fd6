//! Command-line front end for the pain.001 generator.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
