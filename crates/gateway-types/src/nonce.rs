//! Nonce keyspaces for replay protection.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key into one of the two independent nonce namespaces.
///
/// Address keys track the subject of a signed message (a token owner, or the
/// fixed relay subject). Identity keys track an opaque, off-chain-assigned
/// identity whose controlling address may rotate without resetting replay
/// protection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NonceKey {
	/// Counter keyed by a subject address.
	Address(Address),
	/// Counter keyed by an opaque identity string.
	Identity(String),
}

impl fmt::Display for NonceKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NonceKey::Address(addr) => write!(f, "address:{addr}"),
			NonceKey::Identity(id) => write!(f, "identity:{id}"),
		}
	}
}
