//! Clients for the services the quote pipeline depends on.
//!
//! - [`PhotoClient`]: keyed photo search and download (Pexels API shape)
//! - [`SpeechClient`]: text-to-speech over the translate TTS endpoint
//!
//! Every call is bounded by a per-request timeout and never retried.

pub mod error;
pub mod photos;
pub mod speech;
pub mod types;

pub use error::{UpstreamError, UpstreamResult};
pub use photos::{PhotoClient, PhotoClientConfig};
pub use speech::{split_chunks, SpeechClient, SpeechClientConfig};
pub use types::{Photo, PhotoSources, SearchResponse};
