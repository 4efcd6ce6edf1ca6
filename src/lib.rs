//! ringdef: editing core for tilted-ring model parameter files.
//!
//! Parses flat `KEY = v v v` `.def` files into ring-indexed parameter
//! series, drives pointer edits with undo/redo through a small state
//! machine, and merges edited series back into the original text without
//! disturbing anything else.

pub mod api;
pub mod core;
pub mod def_file;
pub mod error;
pub mod fit;
pub mod interaction;
pub mod telemetry;

pub use api::{EditorConfig, Session};
pub use error::{DefError, DefResult};
