//! Host collaborator interfaces for the off-chain signature gateway.
//!
//! The gateway core authorizes operations; the state those operations act on
//! belongs to the embedding host. This crate defines the two capabilities the
//! host must supply, a role-based trust registry and a balance/allowance
//! ledger with a narrow invoke capability, plus in-memory implementations
//! used by tests and by embedders that run without a chain.

use alloy_primitives::{Address, U256};
use gateway_types::{CallRequest, Role, RoleSet};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors surfaced by ledger operations.
///
/// These propagate to gateway clients verbatim; no partial state survives a
/// failed operation.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// The owner's balance cannot cover the transfer.
	#[error("insufficient balance: needed {needed}, available {available}")]
	InsufficientBalance { needed: U256, available: U256 },
	/// The spender's allowance cannot cover the transfer.
	#[error("insufficient allowance: needed {needed}, available {available}")]
	InsufficientAllowance { needed: U256, available: U256 },
	/// Nothing invocable lives at the requested destination.
	#[error("no invocable target at {0}")]
	UnknownTarget(Address),
	/// The dispatched target rejected the call.
	#[error("target reverted: {0}")]
	Reverted(String),
}

/// Role lookup consulted before dispatching signed calls.
pub trait TrustRegistry {
	/// Roles currently held by `address`; empty when unknown.
	fn roles_of(&self, address: &Address) -> RoleSet;

	/// The address currently controlling an opaque identity, if the identity
	/// is registered. Identities survive controller rotation; the binding
	/// reflects only the present controller.
	fn identity_controller(&self, identity: &str) -> Option<Address>;

	/// Whether `address` currently holds `role`.
	fn has_role(&self, address: &Address, role: Role) -> bool {
		self.roles_of(address).contains(&role)
	}
}

/// Balance and allowance ledger, plus the single dispatch capability.
pub trait Ledger {
	/// Current display name of the token; read fresh on every call because
	/// the name participates in permit domain hashing.
	fn token_name(&self) -> String;

	/// Balance of `owner`.
	fn balance_of(&self, owner: &Address) -> U256;

	/// Remaining allowance granted by `owner` to `spender`.
	fn allowance(&self, owner: &Address, spender: &Address) -> U256;

	/// Overwrites the allowance granted by `owner` to `spender`.
	fn set_allowance(&mut self, owner: Address, spender: Address, value: U256);

	/// Moves `value` from `owner` to `recipient`, spending `spender`'s
	/// allowance. Decrements the allowance on success.
	fn transfer_from(
		&mut self,
		spender: &Address,
		owner: &Address,
		recipient: &Address,
		value: U256,
	) -> Result<(), LedgerError>;

	/// Dispatches an opaque call. The gateway never interprets the payload;
	/// gas enforcement is the host's concern.
	fn invoke(&mut self, request: &CallRequest) -> Result<Vec<u8>, LedgerError>;
}
