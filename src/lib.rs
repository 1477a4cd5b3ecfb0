#![deny(missing_docs)]

//! Core library for the Docsum summarization server.

/// HTTP routing and REST handlers.
pub mod api;
/// Completion provider abstraction and adapters.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Text extraction from uploaded documents.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization metrics helpers.
pub mod metrics;
/// Chunked summarization pipeline.
pub mod pipeline;
