//! Chat Digest: daily topic summaries for group chats.
//!
//! Single-crate library: message storage, topic ranking and grouping,
//! tiered narrative generation, digest assembly and transport-sized
//! splitting, plus delivery to the chat platform.

// Foundation types
pub mod constants;
pub mod error;
pub mod message;
pub mod time_utils;

pub mod config;
pub mod tracing_init;

// Sub-systems
pub mod storage;
pub mod processing;
pub mod narrative;
pub mod digest;
pub mod delivery;

#[cfg(test)]
pub mod test_helpers;

// Re-exports for convenience
pub use error::{DigestError, DigestResult};
