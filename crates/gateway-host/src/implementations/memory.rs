//! In-memory host implementations.
//!
//! This module provides memory-backed implementations of the host traits,
//! useful for tests and for embedders that run the gateway without a chain.

use crate::{Ledger, LedgerError, TrustRegistry};
use alloy_primitives::{Address, U256};
use gateway_types::{CallRequest, Role, RoleSet};
use std::collections::HashMap;

/// In-memory trust registry.
#[derive(Debug, Default)]
pub struct MemoryTrustRegistry {
	roles: HashMap<Address, RoleSet>,
	controllers: HashMap<String, Address>,
}

impl MemoryTrustRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Grants `role` to `address`.
	pub fn grant_role(&mut self, address: Address, role: Role) {
		self.roles.entry(address).or_default().insert(role);
	}

	/// Revokes `role` from `address`.
	pub fn revoke_role(&mut self, address: &Address, role: Role) {
		if let Some(set) = self.roles.get_mut(address) {
			set.remove(&role);
		}
	}

	/// Binds an identity to its current controlling address, replacing any
	/// previous binding (controller rotation).
	pub fn bind_identity(&mut self, identity: impl Into<String>, controller: Address) {
		self.controllers.insert(identity.into(), controller);
	}
}

impl TrustRegistry for MemoryTrustRegistry {
	fn roles_of(&self, address: &Address) -> RoleSet {
		self.roles.get(address).cloned().unwrap_or_default()
	}

	fn identity_controller(&self, identity: &str) -> Option<Address> {
		self.controllers.get(identity).copied()
	}
}

type CallHandler = Box<dyn FnMut(&CallRequest) -> Result<Vec<u8>, String>>;

/// In-memory token ledger with programmable call targets.
///
/// Call targets are closures registered per destination address, so tests can
/// exercise dispatch success, revert, and unknown-target paths without a
/// chain.
#[derive(Default)]
pub struct MemoryLedger {
	name: String,
	balances: HashMap<Address, U256>,
	allowances: HashMap<(Address, Address), U256>,
	targets: HashMap<Address, CallHandler>,
}

impl MemoryLedger {
	/// Creates an empty ledger with the given token display name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// Credits `value` to `owner`.
	pub fn mint(&mut self, owner: Address, value: U256) {
		let balance = self.balances.entry(owner).or_default();
		*balance += value;
	}

	/// Changes the token display name. Outstanding permit signatures hashed
	/// against the old name stop verifying.
	pub fn set_token_name(&mut self, name: impl Into<String>) {
		self.name = name.into();
	}

	/// Registers an invocable target at `destination`.
	pub fn register_target<F>(&mut self, destination: Address, handler: F)
	where
		F: FnMut(&CallRequest) -> Result<Vec<u8>, String> + 'static,
	{
		self.targets.insert(destination, Box::new(handler));
	}
}

impl Ledger for MemoryLedger {
	fn token_name(&self) -> String {
		self.name.clone()
	}

	fn balance_of(&self, owner: &Address) -> U256 {
		self.balances.get(owner).copied().unwrap_or(U256::ZERO)
	}

	fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
		self.allowances
			.get(&(*owner, *spender))
			.copied()
			.unwrap_or(U256::ZERO)
	}

	fn set_allowance(&mut self, owner: Address, spender: Address, value: U256) {
		self.allowances.insert((owner, spender), value);
	}

	fn transfer_from(
		&mut self,
		spender: &Address,
		owner: &Address,
		recipient: &Address,
		value: U256,
	) -> Result<(), LedgerError> {
		let allowance = self.allowance(owner, spender);
		if allowance < value {
			return Err(LedgerError::InsufficientAllowance {
				needed: value,
				available: allowance,
			});
		}
		let balance = self.balance_of(owner);
		if balance < value {
			return Err(LedgerError::InsufficientBalance {
				needed: value,
				available: balance,
			});
		}
		self.allowances.insert((*owner, *spender), allowance - value);
		self.balances.insert(*owner, balance - value);
		let credited = self.balance_of(recipient) + value;
		self.balances.insert(*recipient, credited);
		Ok(())
	}

	fn invoke(&mut self, request: &CallRequest) -> Result<Vec<u8>, LedgerError> {
		let handler = self
			.targets
			.get_mut(&request.destination)
			.ok_or(LedgerError::UnknownTarget(request.destination))?;
		handler(request).map_err(LedgerError::Reverted)
	}
}
