//! Signed spending allowances.
//!
//! A narrow relayer specialization: the authorized action is fixed to
//! "overwrite an allowance" rather than an arbitrary call. The combined
//! [`PermitAuthorizer::transfer_with_permit`] entry point tolerates a
//! front-runner who submitted the identical signature first: the allowance
//! the front-run set is exactly the allowance the legitimate caller needed,
//! so the transfer proceeds against current state.
//!
//! The permit domain's display name is read from the live ledger on every
//! hashing call. Clients re-fetch the current name before signing, so a name
//! change invalidates exactly the signatures produced under the old name.

use alloy_primitives::{Address, U256};
use gateway_crypto::recover_signer;
use gateway_host::{Ledger, TrustRegistry};
use gateway_nonce::ReplayError;
use gateway_types::{GatewayEvent, NonceKey, PermitMessage, SignaturePayload, SigningDomain};

use crate::engine::HostContext;
use crate::AuthorizationError;

/// Applies signed spending allowances to the host ledger.
pub struct PermitAuthorizer {
	version: String,
	chain_id: u64,
	verifying_contract: Address,
}

impl PermitAuthorizer {
	/// Creates an authorizer for the token at `verifying_contract`.
	pub fn new(version: String, chain_id: u64, verifying_contract: Address) -> Self {
		Self {
			version,
			chain_id,
			verifying_contract,
		}
	}

	/// The signing domain as of right now, with the name fetched from the
	/// ledger.
	pub fn live_domain<L: Ledger>(&self, ledger: &L) -> SigningDomain {
		SigningDomain {
			name: ledger.token_name(),
			version: self.version.clone(),
			chain_id: self.chain_id,
			verifying_contract: self.verifying_contract,
		}
	}

	/// Verifies a signed permit and overwrites the allowance.
	///
	/// Consumes the owner's by-address nonce. A zero value is valid: it
	/// zeroes the allowance and still consumes a nonce.
	pub fn permit<T: TrustRegistry, L: Ledger>(
		&self,
		ctx: &mut HostContext<'_, T, L>,
		message: &PermitMessage,
		signature: &SignaturePayload,
	) -> Result<(), AuthorizationError> {
		if ctx.now > message.deadline {
			return Err(AuthorizationError::ExpiredDeadline {
				deadline: message.deadline,
				now: ctx.now,
			});
		}

		let key = NonceKey::Address(message.owner);
		let nonce = ctx.nonces.current(&key);
		let domain = self.live_domain(ctx.ledger);
		let digest = domain.digest(&message.struct_hash(nonce));
		let signer = recover_signer(&digest, signature)?;

		if signer != message.owner {
			// A signature that verifies over the previous counter value was
			// valid and already consumed, by this caller or a front-runner.
			if let Some(previous) = nonce.checked_sub(1) {
				let probe = domain.digest(&message.struct_hash(previous));
				if recover_signer(&probe, signature).ok() == Some(message.owner) {
					return Err(ReplayError {
						key,
						current: nonce,
						presented: previous,
					}
					.into());
				}
			}
			tracing::warn!(owner = %message.owner, recovered = %signer, "permit signer mismatch");
			return Err(AuthorizationError::InvalidSigner {
				expected: message.owner,
				recovered: signer,
			});
		}

		ctx.nonces.consume(&key, nonce)?;
		ctx.ledger
			.set_allowance(message.owner, message.spender, message.value);
		tracing::info!(
			owner = %message.owner,
			spender = %message.spender,
			value = %message.value,
			nonce,
			"permit applied"
		);
		ctx.events.record(GatewayEvent::PermitApplied {
			owner: message.owner,
			spender: message.spender,
			value: message.value,
			nonce,
		});
		Ok(())
	}

	/// Applies a permit naming the caller as spender, then transfers against
	/// the resulting allowance.
	///
	/// Only the "signature already consumed" outcome falls through to the
	/// existing allowance; every other permit failure aborts the request.
	/// The whole request is all-or-nothing: if the transfer step fails after
	/// an in-request permit succeeded, the permit is rolled back too.
	pub fn transfer_with_permit<T: TrustRegistry, L: Ledger>(
		&self,
		ctx: &mut HostContext<'_, T, L>,
		caller: Address,
		owner: Address,
		recipient: Address,
		value: U256,
		deadline: u64,
		signature: &SignaturePayload,
	) -> Result<(), AuthorizationError> {
		let message = PermitMessage {
			owner,
			spender: caller,
			value,
			deadline,
		};
		let key = NonceKey::Address(owner);
		let prior_allowance = ctx.ledger.allowance(&owner, &caller);
		let checkpoint = ctx.events.checkpoint();

		let permitted = match self.permit(ctx, &message, signature) {
			Ok(()) => true,
			Err(AuthorizationError::Replay(err)) => {
				tracing::debug!(%err, "permit already consumed, using the existing allowance");
				false
			},
			Err(other) => return Err(other),
		};

		let rollback = |ctx: &mut HostContext<'_, T, L>| {
			if permitted {
				ctx.nonces.revert(&key);
				ctx.ledger.set_allowance(owner, caller, prior_allowance);
				ctx.events.truncate(checkpoint);
			}
		};

		let allowance = ctx.ledger.allowance(&owner, &caller);
		if allowance < value {
			rollback(ctx);
			return Err(AuthorizationError::InsufficientAllowance {
				needed: value,
				available: allowance,
			});
		}

		if let Err(err) = ctx.ledger.transfer_from(&caller, &owner, &recipient, value) {
			rollback(ctx);
			return Err(err.into());
		}

		tracing::info!(%owner, %recipient, %value, "transfer with permit completed");
		Ok(())
	}
}
