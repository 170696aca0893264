//! Domain layer for the ragline question answering pipeline
//!
//! This module contains the core models, errors and the ports that
//! adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{GenerationError, RagError, RagResult, StorageError};
