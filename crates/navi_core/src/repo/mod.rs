//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key/value contract every navigation collection is stored in.
//! - Provide whole-collection tree stores and the cursor/history memory.
//!
//! # Invariants
//! - Every mutation is one read-modify-write of a whole collection value.
//! - Repository APIs return semantic errors (`NotFound`, `HasChildren`) in
//!   addition to storage transport errors.

pub mod kv_repo;
pub mod nav_memory_repo;
pub mod tree_repo;
