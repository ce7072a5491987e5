//! Storage abstraction and implementations for Questline.
//!
//! This crate provides a trait-based storage interface with a JSON
//! document-per-file reference implementation and an in-memory backend.

#![warn(missing_docs)]

pub mod json;
pub mod memory;
pub mod trait_;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use trait_::{Result, StorageError, Store};
