//! Signing domain types for domain-separated message hashing.
//!
//! A [`SigningDomain`] binds a signature to a specific deployment: display
//! name, version, chain identifier, and the identity of the verifying
//! component. The verifying identity is passed in explicitly (never derived
//! from ambient context) so the same code is testable outside any live
//! deployment.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::utils::eip712::{compute_domain_hash, compute_final_digest};

/// The domain a message is signed against.
///
/// The separator is recomputed on every call rather than cached: the `name`
/// field tracks mutable external state (a token's display name), and a stale
/// cached separator would accept signatures produced under a name that is no
/// longer live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
	/// Human-readable name of the signing domain.
	pub name: String,
	/// Version string of the signing domain.
	pub version: String,
	/// Chain identifier the signature is valid on.
	pub chain_id: u64,
	/// Stable identity of the verifying component.
	pub verifying_contract: Address,
}

impl SigningDomain {
	/// Computes the domain separator from the current field values.
	pub fn separator(&self) -> B256 {
		compute_domain_hash(
			&self.name,
			&self.version,
			self.chain_id,
			&self.verifying_contract,
		)
	}

	/// Combines the domain separator with a message struct hash into the
	/// final 32-byte signing digest.
	pub fn digest(&self, struct_hash: &B256) -> B256 {
		compute_final_digest(&self.separator(), struct_hash)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn domain() -> SigningDomain {
		SigningDomain {
			name: "Gateway".to_string(),
			version: "1".to_string(),
			chain_id: 1,
			verifying_contract: address!("4444444444444444444444444444444444444444"),
		}
	}

	#[test]
	fn separator_tracks_live_name() {
		let mut d = domain();
		let before = d.separator();
		d.name = "Renamed".to_string();
		assert_ne!(before, d.separator());
	}

	#[test]
	fn digest_changes_with_chain_id() {
		let mut d = domain();
		let struct_hash = B256::repeat_byte(0x42);
		let before = d.digest(&struct_hash);
		d.chain_id = 137;
		assert_ne!(before, d.digest(&struct_hash));
	}
}
