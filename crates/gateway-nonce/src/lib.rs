//! Nonce registry for the off-chain signature gateway.
//!
//! The registry owns two independent keyed counters: one per subject address
//! and one per opaque identity string. Counters are created implicitly at
//! zero on first reference, only ever move through [`NonceRegistry::consume`]
//! (check-then-increment), [`NonceRegistry::revert`] (same-request undo), or
//! the privileged [`NonceRegistry::admin_set`] override, and are never
//! deleted.

use alloy_primitives::Address;
use gateway_types::{EventLog, GatewayEvent, NonceKey};
use std::collections::HashMap;
use thiserror::Error;

/// A signature presented a nonce that does not match the live counter.
///
/// Covers both "already used" and "used out of order". Not retryable with the
/// same signature; the signer must produce a fresh one over the current
/// counter value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("nonce mismatch for {key}: presented {presented}, current {current}")]
pub struct ReplayError {
	/// The counter the request was checked against.
	pub key: NonceKey,
	/// Live counter value at verification time.
	pub current: u64,
	/// Value embedded in the rejected request.
	pub presented: u64,
}

/// Keyed monotonic counters backing replay protection.
#[derive(Debug, Default)]
pub struct NonceRegistry {
	by_address: HashMap<Address, u64>,
	by_identity: HashMap<String, u64>,
}

impl NonceRegistry {
	/// Creates an empty registry; every counter reads as zero.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current counter value for `key`, zero if never referenced.
	pub fn current(&self, key: &NonceKey) -> u64 {
		match key {
			NonceKey::Address(addr) => self.by_address.get(addr).copied().unwrap_or(0),
			NonceKey::Identity(id) => self.by_identity.get(id).copied().unwrap_or(0),
		}
	}

	/// Current counter for a subject address.
	pub fn current_by_address(&self, addr: &Address) -> u64 {
		self.by_address.get(addr).copied().unwrap_or(0)
	}

	/// Current counter for an opaque identity.
	pub fn current_by_identity(&self, id: &str) -> u64 {
		self.by_identity.get(id).copied().unwrap_or(0)
	}

	/// Atomically checks `current == expected` and increments by exactly one.
	///
	/// Called at most once per accepted request, before the side effect the
	/// request authorizes is committed. If a later step of the same request
	/// fails, the caller must undo the consumption via [`Self::revert`].
	pub fn consume(&mut self, key: &NonceKey, expected: u64) -> Result<(), ReplayError> {
		let slot = self.slot_mut(key);
		if *slot != expected {
			return Err(ReplayError {
				key: key.clone(),
				current: *slot,
				presented: expected,
			});
		}
		*slot += 1;
		tracing::debug!(%key, nonce = expected, "nonce consumed");
		Ok(())
	}

	/// Undoes the consumption made earlier in the same request.
	///
	/// Only valid between a successful [`Self::consume`] and the end of the
	/// request that performed it; the single-threaded execution model
	/// guarantees no other request observed the incremented value.
	pub fn revert(&mut self, key: &NonceKey) {
		let slot = self.slot_mut(key);
		*slot = slot.saturating_sub(1);
		tracing::debug!(%key, "nonce consumption reverted");
	}

	/// Privileged unconditional overwrite of a counter.
	///
	/// This is the designed mechanism to invalidate all outstanding
	/// unconsumed signatures for a subject or identity, e.g. after a key
	/// compromise. Records a [`GatewayEvent::NonceOverridden`] for audit.
	pub fn admin_set(&mut self, key: NonceKey, new_value: u64, events: &mut EventLog) {
		tracing::info!(%key, new_value, "nonce counter overridden");
		*self.slot_mut(&key) = new_value;
		events.record(GatewayEvent::NonceOverridden { key, new_value });
	}

	fn slot_mut(&mut self, key: &NonceKey) -> &mut u64 {
		match key {
			NonceKey::Address(addr) => self.by_address.entry(*addr).or_insert(0),
			NonceKey::Identity(id) => self.by_identity.entry(id.clone()).or_insert(0),
		}
	}
}
