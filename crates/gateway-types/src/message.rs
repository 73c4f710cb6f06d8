//! Authorized message shapes and their struct hashes.
//!
//! Two message types exist: a generic call authorization and a spending
//! permit. Field order and types are fixed per message type; reordering or
//! retyping any field changes the hash and breaks all previously-generated
//! signatures.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::utils::eip712::{Eip712AbiEncoder, CALL_AUTHORIZATION_TYPE, PERMIT_TYPE};

/// A signed authorization for an arbitrary call.
///
/// The nonce is not part of this struct: it is read from the registry at
/// verification time and mixed into the struct hash by [`CallMessage::struct_hash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMessage {
	/// Target of the dispatched call.
	pub destination: Address,
	/// Native value forwarded with the call.
	pub value: U256,
	/// Opaque calldata; the gateway never inspects it.
	pub payload: Bytes,
	/// Submitter restriction. The zero address leaves submission open;
	/// any other value pins execution to that one caller.
	pub executor: Address,
	/// Gas ceiling carried through to the host dispatcher.
	pub gas_limit: U256,
}

impl CallMessage {
	/// Computes the struct hash over (destination, value, keccak(payload),
	/// nonce, executor, gasLimit).
	pub fn struct_hash(&self, nonce: u64) -> B256 {
		let type_hash = keccak256(CALL_AUTHORIZATION_TYPE.as_bytes());
		let payload_hash = keccak256(&self.payload);
		let mut enc = Eip712AbiEncoder::new();
		enc.push_b256(&type_hash);
		enc.push_address(&self.destination);
		enc.push_u256(self.value);
		enc.push_b256(&payload_hash);
		enc.push_u256(U256::from(nonce));
		enc.push_address(&self.executor);
		enc.push_u256(self.gas_limit);
		keccak256(enc.finish())
	}

	/// Extracts the dispatch command for the host ledger.
	pub fn request(&self) -> CallRequest {
		CallRequest {
			destination: self.destination,
			value: self.value,
			payload: self.payload.clone(),
			gas_limit: self.gas_limit,
		}
	}
}

/// The command handed to the host ledger's invoke capability.
///
/// The payload stays opaque end to end; gas accounting is the host's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
	/// Target of the call.
	pub destination: Address,
	/// Native value forwarded with the call.
	pub value: U256,
	/// Opaque calldata.
	pub payload: Bytes,
	/// Gas ceiling for the call.
	pub gas_limit: U256,
}

/// A signed spending allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitMessage {
	/// The account granting the allowance; must be the signer.
	pub owner: Address,
	/// The account allowed to spend.
	pub spender: Address,
	/// Allowance amount; zero is valid and zeroes the allowance.
	pub value: U256,
	/// Absolute unix timestamp after which the signature is rejected.
	pub deadline: u64,
}

impl PermitMessage {
	/// Computes the struct hash over (owner, spender, value, nonce, deadline).
	pub fn struct_hash(&self, nonce: u64) -> B256 {
		let type_hash = keccak256(PERMIT_TYPE.as_bytes());
		let mut enc = Eip712AbiEncoder::new();
		enc.push_b256(&type_hash);
		enc.push_address(&self.owner);
		enc.push_address(&self.spender);
		enc.push_u256(self.value);
		enc.push_u256(U256::from(nonce));
		enc.push_u256(U256::from(self.deadline));
		keccak256(enc.finish())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn call_message() -> CallMessage {
		CallMessage {
			destination: address!("5555555555555555555555555555555555555555"),
			value: U256::from(10u64),
			payload: Bytes::from(vec![0xde, 0xad]),
			executor: Address::ZERO,
			gas_limit: U256::from(100_000u64),
		}
	}

	#[test]
	fn call_hash_binds_nonce() {
		let msg = call_message();
		assert_ne!(msg.struct_hash(0), msg.struct_hash(1));
	}

	#[test]
	fn call_hash_binds_payload_content() {
		let msg = call_message();
		let mut other = call_message();
		other.payload = Bytes::from(vec![0xbe, 0xef]);
		assert_ne!(msg.struct_hash(0), other.struct_hash(0));
	}

	#[test]
	fn permit_hash_binds_every_field() {
		let base = PermitMessage {
			owner: address!("6666666666666666666666666666666666666666"),
			spender: address!("7777777777777777777777777777777777777777"),
			value: U256::from(100u64),
			deadline: 1_700_000_000,
		};
		let hash = base.struct_hash(0);

		let mut m = base.clone();
		m.spender = address!("8888888888888888888888888888888888888888");
		assert_ne!(hash, m.struct_hash(0));

		let mut m = base.clone();
		m.value = U256::from(101u64);
		assert_ne!(hash, m.struct_hash(0));

		let mut m = base.clone();
		m.deadline += 1;
		assert_ne!(hash, m.struct_hash(0));

		assert_ne!(hash, base.struct_hash(1));
	}
}
