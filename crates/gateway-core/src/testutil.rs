//! Shared helpers for the core component tests.

use alloy_primitives::{address, Address, Bytes, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use gateway_host::implementations::memory::{MemoryLedger, MemoryTrustRegistry};
use gateway_nonce::NonceRegistry;
use gateway_types::{CallMessage, EventLog, SignaturePayload, SigningDomain};

use crate::engine::HostContext;

pub const RELAY_SUBJECT: Address = address!("00000000000000000000000000000000000000d1");
pub const TARGET: Address = address!("00000000000000000000000000000000000000d2");
pub const CALLER: Address = address!("00000000000000000000000000000000000000d3");

/// Signs a digest and converts to the gateway payload form.
pub fn sign(signer: &PrivateKeySigner, digest: &B256) -> SignaturePayload {
	SignaturePayload::from(signer.sign_hash_sync(digest).unwrap())
}

/// Standard test domain bound to `verifying_contract`.
pub fn domain(verifying_contract: Address) -> SigningDomain {
	SigningDomain {
		name: "TransferGateway".to_string(),
		version: "1".to_string(),
		chain_id: 1,
		verifying_contract,
	}
}

/// A call message targeting the standard test target.
pub fn call_message() -> CallMessage {
	CallMessage {
		destination: TARGET,
		value: U256::ZERO,
		payload: Bytes::from(vec![0x01, 0x02]),
		executor: Address::ZERO,
		gas_limit: U256::from(100_000u64),
	}
}

/// Mutable state backing a [`HostContext`] in tests.
pub struct TestHost {
	pub trust: MemoryTrustRegistry,
	pub ledger: MemoryLedger,
	pub nonces: NonceRegistry,
	pub events: EventLog,
	pub now: u64,
}

impl TestHost {
	/// Fresh host with an echoing target registered.
	pub fn new() -> Self {
		let mut ledger = MemoryLedger::new("Token");
		ledger.register_target(TARGET, |req| Ok(req.payload.to_vec()));
		Self {
			trust: MemoryTrustRegistry::new(),
			ledger,
			nonces: NonceRegistry::new(),
			events: EventLog::new(),
			now: 1_700_000_000,
		}
	}

	pub fn context(&mut self) -> HostContext<'_, MemoryTrustRegistry, MemoryLedger> {
		HostContext {
			trust: &self.trust,
			ledger: &mut self.ledger,
			nonces: &mut self.nonces,
			events: &mut self.events,
			now: self.now,
		}
	}
}
