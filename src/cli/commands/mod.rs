//! CLI command implementations.

pub mod ask;
pub mod documents;
pub mod ingest;
pub mod init;
pub mod search;
pub mod status;
