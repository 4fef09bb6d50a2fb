//! Integration test utilities for the realtime messaging core
//!
//! Provides a full in-process stack (in-memory repositories, memory
//! caches, local backplane) and fixtures for driving it through the
//! session and service layers.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
