//! Core authorization engine for the off-chain signature gateway.
//!
//! This crate composes the leaf components (domain hashing, signer recovery,
//! the nonce registry, and the host collaborators) into the three entry
//! points the system exposes: the generic [`Relayer`], the threshold-gated
//! [`MultiSigExecutor`], and the allowance-granting [`PermitAuthorizer`].
//! The [`Gateway`] engine owns the shared state and wires the components the
//! way an embedder consumes them.
//!
//! Execution is strictly single-threaded and transactional per request:
//! verification, nonce consumption, and dispatch form one unit, and any
//! failure after the nonce was consumed rolls the consumption back. No
//! request ever leaves partial state behind.

use alloy_primitives::{Address, U256};
use gateway_crypto::SignatureError;
use gateway_host::LedgerError;
use gateway_nonce::ReplayError;
use thiserror::Error;

pub mod builder;
pub mod engine;
pub mod multisig;
pub mod permit;
pub mod relayer;

#[cfg(test)]
mod testutil;

pub use builder::GatewayBuilder;
pub use engine::{Gateway, HostContext};
pub use multisig::{MultiSigExecutor, OwnerUpdate};
pub use permit::PermitAuthorizer;
pub use relayer::Relayer;

/// Errors that can occur while constructing gateway components.
#[derive(Debug, Error)]
pub enum BuildError {
	/// The supplied configuration is internally inconsistent.
	#[error("configuration error: {0}")]
	Config(String),
}

/// Request-level failure taxonomy.
///
/// Every failure names the invariant it violated precisely enough for a
/// client to decide whether re-signing helps (deadline, nonce) or not
/// (wrong signer, missing role, insufficient funds). No variant leaves
/// partial state behind.
#[derive(Debug, Error)]
pub enum AuthorizationError {
	/// The signature is structurally invalid; re-signing clears it.
	#[error("malformed signature: {0}")]
	MalformedSignature(#[from] SignatureError),
	/// The embedded nonce does not match the live counter; the caller must
	/// re-sign over the current value.
	#[error(transparent)]
	Replay(#[from] ReplayError),
	/// The recovered signer does not hold the required role, or does not
	/// control the identity it signed for.
	#[error("recovered signer {signer} is not authorized")]
	UnauthorizedSigner { signer: Address },
	/// The submitter does not match the executor the signer pinned.
	#[error("caller {caller} does not match the executor restriction {executor}")]
	ExecutorMismatch { caller: Address, executor: Address },
	/// The recovered signer is not the owner the permit names.
	#[error("recovered signer {recovered} is not the permit owner {expected}")]
	InvalidSigner { expected: Address, recovered: Address },
	/// The permit deadline lies in the past.
	#[error("deadline {deadline} has passed (now {now})")]
	ExpiredDeadline { deadline: u64, now: u64 },
	/// Fewer distinct owner approvals than the configured threshold.
	#[error("threshold not met: {approvals} distinct owner approvals, {threshold} required")]
	ThresholdNotMet { approvals: usize, threshold: usize },
	/// A proposed owner set or threshold is unusable.
	#[error("invalid owner update: {0}")]
	InvalidOwnerSet(String),
	/// The allowance cannot cover the requested transfer.
	#[error("insufficient allowance: needed {needed}, available {available}")]
	InsufficientAllowance { needed: U256, available: U256 },
	/// The owner's balance cannot cover the requested transfer.
	#[error("insufficient funds: needed {needed}, available {available}")]
	InsufficientFunds { needed: U256, available: U256 },
	/// The dispatched call failed; carries the underlying reason verbatim.
	#[error("dispatch reverted: {0}")]
	DispatchReverted(String),
	/// An administrative operation was attempted by a non-admin caller.
	#[error("caller {0} is not the gateway administrator")]
	NotAdmin(Address),
}

impl From<LedgerError> for AuthorizationError {
	fn from(err: LedgerError) -> Self {
		match err {
			LedgerError::InsufficientAllowance { needed, available } => {
				AuthorizationError::InsufficientAllowance { needed, available }
			},
			LedgerError::InsufficientBalance { needed, available } => {
				AuthorizationError::InsufficientFunds { needed, available }
			},
			other => AuthorizationError::DispatchReverted(other.to_string()),
		}
	}
}
