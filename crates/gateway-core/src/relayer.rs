//! Generic signed-call relayer.
//!
//! A holder of a private key signs a [`CallMessage`] off-chain; any party may
//! submit it here. The relayer recovers the signer, checks the required role
//! against the trust registry, consumes the relevant nonce, and dispatches
//! the call through the host ledger. Two entry points share one algorithm
//! and differ only in nonce keyspace: [`Relayer::execute`] uses the fixed
//! relay subject (the relayer's own verifying identity), while
//! [`Relayer::execute_by_identity`] keys replay protection by an opaque
//! identity that survives controlling-address rotation.

use alloy_primitives::Address;
use gateway_crypto::recover_signer;
use gateway_host::{Ledger, TrustRegistry};
use gateway_nonce::{NonceRegistry, ReplayError};
use gateway_types::{
	CallMessage, EventLog, GatewayEvent, NonceKey, Role, SignaturePayload, SigningDomain,
};

use crate::engine::HostContext;
use crate::AuthorizationError;

/// Relays signed calls to the host ledger.
pub struct Relayer {
	domain: SigningDomain,
	required_role: Role,
	admin: Address,
}

impl Relayer {
	/// Creates a relayer verifying against `domain`, requiring signers to
	/// hold `required_role`, administered by `admin`.
	pub fn new(domain: SigningDomain, required_role: Role, admin: Address) -> Self {
		Self {
			domain,
			required_role,
			admin,
		}
	}

	/// The live signing domain.
	pub fn domain(&self) -> &SigningDomain {
		&self.domain
	}

	/// Nonce key of the fixed relay subject.
	pub fn subject_key(&self) -> NonceKey {
		NonceKey::Address(self.domain.verifying_contract)
	}

	/// Verifies and dispatches a signed call against the relay subject nonce.
	pub fn execute<T: TrustRegistry, L: Ledger>(
		&self,
		ctx: &mut HostContext<'_, T, L>,
		caller: Address,
		message: &CallMessage,
		signature: &SignaturePayload,
	) -> Result<Vec<u8>, AuthorizationError> {
		self.execute_inner(ctx, caller, message, signature, self.subject_key(), None)
	}

	/// Verifies and dispatches a signed call against an identity-keyed nonce.
	///
	/// The recovered signer must be the identity's currently registered
	/// controller, and the required role is checked on that controller.
	pub fn execute_by_identity<T: TrustRegistry, L: Ledger>(
		&self,
		ctx: &mut HostContext<'_, T, L>,
		caller: Address,
		identity: &str,
		message: &CallMessage,
		signature: &SignaturePayload,
	) -> Result<Vec<u8>, AuthorizationError> {
		let key = NonceKey::Identity(identity.to_string());
		self.execute_inner(ctx, caller, message, signature, key, Some(identity))
	}

	fn execute_inner<T: TrustRegistry, L: Ledger>(
		&self,
		ctx: &mut HostContext<'_, T, L>,
		caller: Address,
		message: &CallMessage,
		signature: &SignaturePayload,
		key: NonceKey,
		identity: Option<&str>,
	) -> Result<Vec<u8>, AuthorizationError> {
		let nonce = ctx.nonces.current(&key);
		let digest = self.domain.digest(&message.struct_hash(nonce));
		let signer = recover_signer(&digest, signature)?;

		if message.executor != Address::ZERO && caller != message.executor {
			return Err(AuthorizationError::ExecutorMismatch {
				caller,
				executor: message.executor,
			});
		}

		if !self.signer_authorized(ctx.trust, identity, &signer) {
			let rejection =
				self.classify_rejection(ctx.trust, message, signature, &key, nonce, identity, signer);
			tracing::warn!(%key, %signer, error = %rejection, "signed call rejected");
			return Err(rejection);
		}

		ctx.nonces.consume(&key, nonce)?;
		match ctx.ledger.invoke(&message.request()) {
			Ok(output) => {
				tracing::info!(
					%key,
					destination = %message.destination,
					%signer,
					nonce,
					"signed call dispatched"
				);
				ctx.events.record(GatewayEvent::CallForwarded {
					destination: message.destination,
					signer,
					nonce,
				});
				Ok(output)
			},
			Err(err) => {
				// Never leave a consumed nonce behind for a call that did
				// not execute.
				ctx.nonces.revert(&key);
				tracing::warn!(%key, destination = %message.destination, error = %err, "dispatch failed");
				Err(AuthorizationError::from(err))
			},
		}
	}

	fn signer_authorized<T: TrustRegistry>(
		&self,
		trust: &T,
		identity: Option<&str>,
		signer: &Address,
	) -> bool {
		match identity {
			None => trust.has_role(signer, self.required_role),
			Some(id) => match trust.identity_controller(id) {
				Some(controller) => {
					controller == *signer && trust.has_role(&controller, self.required_role)
				},
				None => false,
			},
		}
	}

	/// Distinguishes a consumed signature from an unauthorized signer.
	///
	/// The relayer's nonce is implicit, so a stale signature surfaces as a
	/// recovery mismatch. Probing the digest over the previous counter value
	/// identifies the signature that was valid and already consumed.
	fn classify_rejection<T: TrustRegistry>(
		&self,
		trust: &T,
		message: &CallMessage,
		signature: &SignaturePayload,
		key: &NonceKey,
		nonce: u64,
		identity: Option<&str>,
		signer: Address,
	) -> AuthorizationError {
		if let Some(previous) = nonce.checked_sub(1) {
			let probe = self.domain.digest(&message.struct_hash(previous));
			if let Ok(previous_signer) = recover_signer(&probe, signature) {
				if self.signer_authorized(trust, identity, &previous_signer) {
					return ReplayError {
						key: key.clone(),
						current: nonce,
						presented: previous,
					}
					.into();
				}
			}
		}
		AuthorizationError::UnauthorizedSigner { signer }
	}

	/// Rotates the signing domain to a new chain identifier.
	///
	/// Admin-only. Takes effect immediately, with no grace period: every
	/// signature produced under the old domain stops verifying.
	pub fn rotate_domain(
		&mut self,
		events: &mut EventLog,
		caller: Address,
		new_chain_id: u64,
	) -> Result<(), AuthorizationError> {
		if caller != self.admin {
			return Err(AuthorizationError::NotAdmin(caller));
		}
		tracing::info!(
			old_chain_id = self.domain.chain_id,
			new_chain_id,
			"signing domain rotated"
		);
		self.domain.chain_id = new_chain_id;
		events.record(GatewayEvent::DomainRotated { new_chain_id });
		Ok(())
	}

	/// Administratively overwrites a nonce counter.
	pub fn override_nonce(
		&self,
		nonces: &mut NonceRegistry,
		events: &mut EventLog,
		caller: Address,
		key: NonceKey,
		new_value: u64,
	) -> Result<(), AuthorizationError> {
		if caller != self.admin {
			return Err(AuthorizationError::NotAdmin(caller));
		}
		nonces.admin_set(key, new_value, events);
		Ok(())
	}
}
