//! Shared data models for the quote clip service.
//!
//! This crate provides:
//! - The `/generate` request model and its defaulting rules
//! - Canvas, typography and encoding constants shared by the pipeline

pub mod encoding;
pub mod request;

pub use encoding::EncodingConfig;
pub use request::{QuoteRequest, RequestError, DEFAULT_AUTHOR, DEFAULT_QUOTE};
