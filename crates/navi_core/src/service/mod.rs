//! Core use-case services.
//!
//! # Responsibility
//! - Sequence tree store mutations into navigation transitions.
//! - Keep presentation layers decoupled from storage details.

pub mod navigation_service;
pub mod session;
pub mod template_catalog;
