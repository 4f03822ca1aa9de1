//! Navigation domain model.
//!
//! # Responsibility
//! - Define the Space and Journal node shapes shared by stores and axis views.
//! - Define the persisted dual-path cursor and history records.
//!
//! # Invariants
//! - Every node is identified by a stable, never reused `NodeId`.
//! - A Journal is always owned by exactly one Space.

pub mod cursor;
pub mod node;
pub mod template;
