//! Library side of the `tablec` binary: configuration loading, logging
//! setup and diagnostic report files.

pub mod config;
pub mod logging;
pub mod report;
