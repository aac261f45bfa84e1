//! Pastepath - paste clipboard images into the terminal as file paths
//!
//! This library exports the core modules for testing and potential reuse.

pub mod clipboard;
pub mod extract;
pub mod format;
pub mod host;
pub mod interceptor;
pub mod logging;
pub mod models;
pub mod process;
pub mod storage;
