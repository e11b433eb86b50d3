//! Utility functions: ID generation.

pub mod id;
