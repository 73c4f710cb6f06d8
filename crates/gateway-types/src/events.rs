//! Audit events produced by state-changing operations.
//!
//! Events exist for observability: administrative overrides and successful
//! request executions are recorded so an embedder can audit what the gateway
//! did. Per-request failures are not events; they surface as errors on the
//! entry point that rejected the request.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::NonceKey;

/// Notification events emitted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayEvent {
	/// A nonce counter was administratively overwritten, invalidating all
	/// outstanding unconsumed signatures for that key.
	NonceOverridden {
		key: NonceKey,
		new_value: u64,
	},
	/// The signing domain was rotated to a new chain identifier.
	DomainRotated {
		new_chain_id: u64,
	},
	/// A signed call was verified and dispatched.
	CallForwarded {
		destination: Address,
		signer: Address,
		nonce: u64,
	},
	/// A permit was verified and the allowance overwritten.
	PermitApplied {
		owner: Address,
		spender: Address,
		value: U256,
		nonce: u64,
	},
	/// A threshold-approved call was verified and dispatched.
	ThresholdCallForwarded {
		destination: Address,
		approvals: Vec<Address>,
		nonce: u64,
	},
	/// The multi-signature owner set or threshold was rotated.
	OwnersUpdated {
		owners: Vec<Address>,
		threshold: usize,
	},
}

/// An append-only in-memory log of gateway events.
#[derive(Debug, Default)]
pub struct EventLog {
	entries: Vec<GatewayEvent>,
}

impl EventLog {
	/// Creates an empty log.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an event and traces it.
	pub fn record(&mut self, event: GatewayEvent) {
		tracing::debug!(?event, "gateway event");
		self.entries.push(event);
	}

	/// Returns the recorded events without consuming them.
	pub fn entries(&self) -> &[GatewayEvent] {
		&self.entries
	}

	/// Removes and returns all recorded events.
	pub fn drain(&mut self) -> Vec<GatewayEvent> {
		std::mem::take(&mut self.entries)
	}

	/// Number of events recorded so far. Used as a checkpoint by callers
	/// that must discard events when a request is rolled back.
	pub fn checkpoint(&self) -> usize {
		self.entries.len()
	}

	/// Discards every event recorded after `checkpoint`.
	pub fn truncate(&mut self, checkpoint: usize) {
		self.entries.truncate(checkpoint);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn records_and_drains() {
		let mut log = EventLog::new();
		log.record(GatewayEvent::DomainRotated { new_chain_id: 10 });
		assert_eq!(log.entries().len(), 1);
		let drained = log.drain();
		assert_eq!(drained.len(), 1);
		assert!(log.entries().is_empty());
	}
}
