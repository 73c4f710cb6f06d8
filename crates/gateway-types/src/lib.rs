//! Common types module for the off-chain signature gateway.
//!
//! This module defines the core data types and structures shared by the
//! gateway components. It provides a centralized location for shared types
//! to ensure consistency across all crates in the workspace.

/// Signing domain and domain-separated digest computation.
pub mod domain;
/// Audit events produced by state-changing operations.
pub mod events;
/// Authorized message shapes and their struct hashes.
pub mod message;
/// Nonce keyspaces for replay protection.
pub mod nonce;
/// Roles consulted on recovered signers.
pub mod role;
/// Compact ECDSA signature payload.
pub mod signature;
/// Utility functions for hashing and encoding.
pub mod utils;

// Re-export all types for convenient access
pub use domain::*;
pub use events::*;
pub use message::*;
pub use nonce::*;
pub use role::*;
pub use signature::*;
