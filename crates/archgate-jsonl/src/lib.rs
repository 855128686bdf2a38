//! Async JSON Lines persistence for archgate.
//!
//! The governance core keeps its audit trail in this format: one review event
//! per line, appended and never rewritten.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod append;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use append::append_jsonl;
pub use error::{Error, Result};
pub use reader::{read_jsonl_resilient, JsonlReader};
pub use warning::Warning;
pub use writer::JsonlWriter;
