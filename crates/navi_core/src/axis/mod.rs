//! Navigation-axis view models.
//!
//! # Responsibility
//! - Turn a flat node list plus a path into an active/siblings/children view.
//! - Own the sibling ordering and hierarchical numbering rules.
//!
//! # Invariants
//! - Builders are pure: no storage access, no retained state.
//! - Sibling ordering is a strict total order.

pub mod builder;
pub mod ordering;
