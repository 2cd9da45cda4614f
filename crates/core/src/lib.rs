//! Domain types for the docsort job client.
//!
//! Everything in this crate is synchronous and I/O free: job status and
//! snapshot types as reported by the classifier backend, artifact kinds,
//! processing options, progress clamping and file-selection summaries.

pub mod artifacts;
pub mod error;
pub mod job;
pub mod options;
pub mod progress;
pub mod selection;
pub mod types;
