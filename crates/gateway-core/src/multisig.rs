//! Threshold-gated call executor.
//!
//! Generalizes the relayer: instead of one role-holding signer, a fixed owner
//! set must reach a configured approval threshold before a call is
//! dispatched. Signatures need not arrive in any particular order, and
//! redundant signatures from the same owner never inflate the approval
//! count.
//!
//! The owner set and threshold are themselves rotated only through a
//! threshold-met execution: a message whose destination is the executor's own
//! verifying identity carries an [`OwnerUpdate`] payload. This guards against
//! unilateral takeover.

use alloy_primitives::Address;
use gateway_crypto::recover_signer;
use gateway_host::{Ledger, TrustRegistry};
use gateway_nonce::ReplayError;
use gateway_types::{CallMessage, EventLog, GatewayEvent, NonceKey, SignaturePayload, SigningDomain};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::engine::HostContext;
use crate::{AuthorizationError, BuildError};

/// Self-administration payload: replaces the owner set and threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerUpdate {
	/// The replacement owner set.
	pub owners: Vec<Address>,
	/// The replacement approval threshold.
	pub threshold: usize,
}

/// Executes calls approved by a threshold of a fixed owner set.
pub struct MultiSigExecutor {
	domain: SigningDomain,
	owners: Vec<Address>,
	threshold: usize,
}

impl MultiSigExecutor {
	/// Creates an executor over `domain` with the given owner set and
	/// threshold.
	pub fn new(
		domain: SigningDomain,
		owners: Vec<Address>,
		threshold: usize,
	) -> Result<Self, BuildError> {
		validate_owner_set(&owners, threshold).map_err(BuildError::Config)?;
		Ok(Self {
			domain,
			owners,
			threshold,
		})
	}

	/// The live signing domain.
	pub fn domain(&self) -> &SigningDomain {
		&self.domain
	}

	/// The current owner set.
	pub fn owners(&self) -> &[Address] {
		&self.owners
	}

	/// The current approval threshold.
	pub fn threshold(&self) -> usize {
		self.threshold
	}

	/// Nonce key of the executor's global counter.
	pub fn subject_key(&self) -> NonceKey {
		NonceKey::Address(self.domain.verifying_contract)
	}

	/// Verifies a threshold of owner signatures over (message, nonce) and
	/// dispatches the call.
	///
	/// The nonce is caller-supplied and checked against the global counter
	/// before any signature work, so replays fail cheaply. A message
	/// targeting the executor's own verifying identity is a
	/// self-administration call whose payload must decode to an
	/// [`OwnerUpdate`].
	pub fn execute<T: TrustRegistry, L: Ledger>(
		&mut self,
		ctx: &mut HostContext<'_, T, L>,
		caller: Address,
		message: &CallMessage,
		nonce: u64,
		signatures: &[SignaturePayload],
	) -> Result<Vec<u8>, AuthorizationError> {
		let key = self.subject_key();
		let current = ctx.nonces.current(&key);
		if nonce != current {
			return Err(ReplayError {
				key,
				current,
				presented: nonce,
			}
			.into());
		}

		if message.executor != Address::ZERO && caller != message.executor {
			return Err(AuthorizationError::ExecutorMismatch {
				caller,
				executor: message.executor,
			});
		}

		let digest = self.domain.digest(&message.struct_hash(nonce));
		// Dedupe recovered signers before comparing against the threshold so
		// two copies of one owner's signature count once.
		let mut approvals: BTreeSet<Address> = BTreeSet::new();
		for signature in signatures {
			let signer = recover_signer(&digest, signature)?;
			if !self.owners.contains(&signer) {
				tracing::warn!(%signer, "signature from outside the owner set");
				return Err(AuthorizationError::UnauthorizedSigner { signer });
			}
			approvals.insert(signer);
		}
		if approvals.len() < self.threshold {
			return Err(AuthorizationError::ThresholdNotMet {
				approvals: approvals.len(),
				threshold: self.threshold,
			});
		}

		ctx.nonces.consume(&key, nonce)?;
		let outcome = if message.destination == self.domain.verifying_contract {
			self.apply_owner_update(&message.payload, ctx.events)
				.map(|()| Vec::new())
		} else {
			ctx.ledger
				.invoke(&message.request())
				.map_err(AuthorizationError::from)
		};

		match outcome {
			Ok(output) => {
				let approvals: Vec<Address> = approvals.into_iter().collect();
				tracing::info!(
					destination = %message.destination,
					nonce,
					approvals = approvals.len(),
					"threshold call dispatched"
				);
				ctx.events.record(GatewayEvent::ThresholdCallForwarded {
					destination: message.destination,
					approvals,
					nonce,
				});
				Ok(output)
			},
			Err(err) => {
				ctx.nonces.revert(&key);
				tracing::warn!(destination = %message.destination, error = %err, "threshold call failed");
				Err(err)
			},
		}
	}

	fn apply_owner_update(
		&mut self,
		payload: &[u8],
		events: &mut EventLog,
	) -> Result<(), AuthorizationError> {
		let update: OwnerUpdate = serde_json::from_slice(payload)
			.map_err(|e| AuthorizationError::InvalidOwnerSet(format!("undecodable payload: {e}")))?;
		validate_owner_set(&update.owners, update.threshold)
			.map_err(AuthorizationError::InvalidOwnerSet)?;
		tracing::info!(
			owners = update.owners.len(),
			threshold = update.threshold,
			"owner set rotated"
		);
		self.owners = update.owners.clone();
		self.threshold = update.threshold;
		events.record(GatewayEvent::OwnersUpdated {
			owners: update.owners,
			threshold: update.threshold,
		});
		Ok(())
	}
}

fn validate_owner_set(owners: &[Address], threshold: usize) -> Result<(), String> {
	if owners.is_empty() {
		return Err("owner set cannot be empty".to_string());
	}
	let distinct: HashSet<&Address> = owners.iter().collect();
	if distinct.len() != owners.len() {
		return Err("owner set contains duplicate addresses".to_string());
	}
	if threshold == 0 {
		return Err("threshold must be at least 1".to_string());
	}
	if threshold > owners.len() {
		return Err(format!(
			"threshold {} exceeds owner set size {}",
			threshold,
			owners.len()
		));
	}
	Ok(())
}
