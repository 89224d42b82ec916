//! Quire - deferred bulk writes for a fiction publishing backend
//!
//! Services validate a request, append the mutation to a buffer in a
//! shared cache, and answer right away with a pending receipt. One flush
//! worker per buffer periodically reads the whole buffer, applies it to
//! storage in a single unit of work, and evicts what it committed.

pub mod app;
pub mod buffer;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod ui;

pub use error::{QuireError, QuireResult};
