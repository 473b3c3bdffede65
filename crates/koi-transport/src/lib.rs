//! # koi-transport
//!
//! reqwest-backed implementations of the koi-core backend traits.
//! Each client maps transport failures onto `BackendError` so the
//! resilience shell can tell transient from permanent failures. Retries,
//! breakers, and per-call deadlines live in koi-resilience, not here.

pub mod client;
pub mod graph;
pub mod protocol;
pub mod similarity;
pub mod status;
pub mod vector;

pub use client::{build_client, HttpClientConfig};
pub use graph::HttpGraphClient;
pub use similarity::{ConfiguredSimilarity, HttpSimilarityClient};
pub use vector::HttpVectorClient;
