//! Named mutation buffers held in the shared cache
//!
//! Each (entity kind, operation) pair has one buffer key. Services append
//! versioned envelopes to it; the matching flush worker snapshots the
//! buffer, applies it, and evicts exactly what it applied.

pub mod envelope;
pub mod keys;
pub mod mutation;

pub use envelope::{Envelope, SCHEMA_VERSION};
pub use keys::BufferKey;
pub use mutation::{Batch, BufferMode, MutationBuffer, Staged};
