//! Gateway engine wiring the authorization components together.
//!
//! The engine owns the only mutable shared state in the system (the nonce
//! registry, the event log, and the host collaborators) and hands each
//! request a [`HostContext`] borrowing exactly what the verification routine
//! needs. Requests run to completion with no interleaving; the context
//! carries the execution-time clock so component logic stays testable
//! without one.

use alloy_primitives::{Address, U256};
use gateway_host::{Ledger, TrustRegistry};
use gateway_nonce::NonceRegistry;
use gateway_types::{
	CallMessage, EventLog, GatewayEvent, NonceKey, PermitMessage, SignaturePayload,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::multisig::MultiSigExecutor;
use crate::permit::PermitAuthorizer;
use crate::relayer::Relayer;
use crate::AuthorizationError;

/// Everything one request is allowed to touch.
///
/// The nonce registry is passed by reference rather than held as ambient
/// state so all mutation funnels through its atomic check-then-increment.
pub struct HostContext<'a, T: TrustRegistry, L: Ledger> {
	/// Role lookup for recovered signers.
	pub trust: &'a T,
	/// The balance/allowance ledger and dispatch capability.
	pub ledger: &'a mut L,
	/// Replay-protection counters.
	pub nonces: &'a mut NonceRegistry,
	/// Audit event sink.
	pub events: &'a mut EventLog,
	/// Execution-time clock, seconds since the unix epoch.
	pub now: u64,
}

/// Current unix timestamp in seconds.
pub fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or(Duration::ZERO)
		.as_secs()
}

/// The assembled gateway: shared state plus the three entry-point components.
pub struct Gateway<T: TrustRegistry, L: Ledger> {
	trust: T,
	ledger: L,
	nonces: NonceRegistry,
	events: EventLog,
	relayer: Relayer,
	multisig: MultiSigExecutor,
	permit: PermitAuthorizer,
}

impl<T: TrustRegistry, L: Ledger> Gateway<T, L> {
	/// Assembles a gateway from its components. Prefer
	/// [`GatewayBuilder`](crate::GatewayBuilder) when starting from
	/// configuration.
	pub fn new(
		relayer: Relayer,
		multisig: MultiSigExecutor,
		permit: PermitAuthorizer,
		trust: T,
		ledger: L,
	) -> Self {
		Self {
			trust,
			ledger,
			nonces: NonceRegistry::new(),
			events: EventLog::new(),
			relayer,
			multisig,
			permit,
		}
	}

	/// Verifies and dispatches a signed call against the fixed relay subject.
	pub fn execute(
		&mut self,
		caller: Address,
		message: &CallMessage,
		signature: &SignaturePayload,
	) -> Result<Vec<u8>, AuthorizationError> {
		let Self {
			trust,
			ledger,
			nonces,
			events,
			relayer,
			..
		} = self;
		let mut ctx = HostContext {
			trust,
			ledger,
			nonces,
			events,
			now: unix_now(),
		};
		relayer.execute(&mut ctx, caller, message, signature)
	}

	/// Verifies and dispatches a signed call against an identity-keyed nonce.
	pub fn execute_by_identity(
		&mut self,
		caller: Address,
		identity: &str,
		message: &CallMessage,
		signature: &SignaturePayload,
	) -> Result<Vec<u8>, AuthorizationError> {
		let Self {
			trust,
			ledger,
			nonces,
			events,
			relayer,
			..
		} = self;
		let mut ctx = HostContext {
			trust,
			ledger,
			nonces,
			events,
			now: unix_now(),
		};
		relayer.execute_by_identity(&mut ctx, caller, identity, message, signature)
	}

	/// Verifies a threshold of owner signatures and dispatches the call.
	pub fn execute_multisig(
		&mut self,
		caller: Address,
		message: &CallMessage,
		nonce: u64,
		signatures: &[SignaturePayload],
	) -> Result<Vec<u8>, AuthorizationError> {
		let Self {
			trust,
			ledger,
			nonces,
			events,
			multisig,
			..
		} = self;
		let mut ctx = HostContext {
			trust,
			ledger,
			nonces,
			events,
			now: unix_now(),
		};
		multisig.execute(&mut ctx, caller, message, nonce, signatures)
	}

	/// Applies a signed spending allowance.
	pub fn permit(
		&mut self,
		message: &PermitMessage,
		signature: &SignaturePayload,
	) -> Result<(), AuthorizationError> {
		let Self {
			trust,
			ledger,
			nonces,
			events,
			permit,
			..
		} = self;
		let mut ctx = HostContext {
			trust,
			ledger,
			nonces,
			events,
			now: unix_now(),
		};
		permit.permit(&mut ctx, message, signature)
	}

	/// Applies a permit (tolerating a front-run of the same signature) and
	/// transfers against the resulting allowance in one request.
	pub fn transfer_with_permit(
		&mut self,
		caller: Address,
		owner: Address,
		recipient: Address,
		value: U256,
		deadline: u64,
		signature: &SignaturePayload,
	) -> Result<(), AuthorizationError> {
		let Self {
			trust,
			ledger,
			nonces,
			events,
			permit,
			..
		} = self;
		let mut ctx = HostContext {
			trust,
			ledger,
			nonces,
			events,
			now: unix_now(),
		};
		permit.transfer_with_permit(&mut ctx, caller, owner, recipient, value, deadline, signature)
	}

	/// Rotates the relayer signing domain to a new chain identifier,
	/// invalidating every signature produced under the old domain.
	pub fn rotate_domain(
		&mut self,
		caller: Address,
		new_chain_id: u64,
	) -> Result<(), AuthorizationError> {
		self.relayer
			.rotate_domain(&mut self.events, caller, new_chain_id)
	}

	/// Administratively overwrites a nonce counter, invalidating all
	/// outstanding unconsumed signatures for that key.
	pub fn override_nonce(
		&mut self,
		caller: Address,
		key: NonceKey,
		new_value: u64,
	) -> Result<(), AuthorizationError> {
		self.relayer
			.override_nonce(&mut self.nonces, &mut self.events, caller, key, new_value)
	}

	/// Current counter value for `key`.
	pub fn current_nonce(&self, key: &NonceKey) -> u64 {
		self.nonces.current(key)
	}

	/// Removes and returns the audit events recorded so far.
	pub fn drain_events(&mut self) -> Vec<GatewayEvent> {
		self.events.drain()
	}

	/// The relayer component.
	pub fn relayer(&self) -> &Relayer {
		&self.relayer
	}

	/// The multi-signature executor component.
	pub fn multisig(&self) -> &MultiSigExecutor {
		&self.multisig
	}

	/// The trust registry collaborator.
	pub fn trust(&self) -> &T {
		&self.trust
	}

	/// Mutable access to the trust registry collaborator.
	pub fn trust_mut(&mut self) -> &mut T {
		&mut self.trust
	}

	/// The ledger collaborator.
	pub fn ledger(&self) -> &L {
		&self.ledger
	}

	/// Mutable access to the ledger collaborator.
	pub fn ledger_mut(&mut self) -> &mut L {
		&mut self.ledger
	}
}
