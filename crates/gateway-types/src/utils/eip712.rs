//! Generic EIP-712 utilities shared across the gateway.
//!
//! These helpers provide:
//! - Domain hash computation
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - A minimal ABI encoder for static EIP-712 field types used commonly

use alloy_primitives::{keccak256, Address, B256, U256};

// EIP-712 type strings used across the gateway
pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
pub const CALL_AUTHORIZATION_TYPE: &str = "CallAuthorization(address destination,uint256 value,bytes32 payloadHash,uint256 nonce,address executor,uint256 gasLimit)";
pub const PERMIT_TYPE: &str =
	"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

/// Compute the EIP-712 domain hash
/// (keccak256(abi.encode(typeHash, nameHash, versionHash, chainId, verifyingContract))).
///
/// The name is taken as a parameter rather than captured at construction so
/// callers can feed the live value on every hashing call.
pub fn compute_domain_hash(
	name: &str,
	version: &str,
	chain_id: u64,
	verifying_contract: &Address,
) -> B256 {
	let domain_type_hash = keccak256(DOMAIN_TYPE.as_bytes());
	let name_hash = keccak256(name.as_bytes());
	let version_hash = keccak256(version.as_bytes());
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&domain_type_hash);
	enc.push_b256(&name_hash);
	enc.push_b256(&version_hash);
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: keccak256(0x19 || 0x01 || domainHash || structHash).
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Minimal ABI encoder for static types used in EIP-712 struct hashing.
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Default for Eip712AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn encoder_emits_whole_words() {
		let mut enc = Eip712AbiEncoder::new();
		enc.push_address(&address!("1111111111111111111111111111111111111111"));
		enc.push_u256(U256::from(7u64));
		let out = enc.finish();
		assert_eq!(out.len(), 64);
		// Addresses are left-padded to 32 bytes
		assert_eq!(&out[..12], &[0u8; 12]);
		assert_eq!(out[63], 7);
	}

	#[test]
	fn domain_hash_binds_every_field() {
		let contract = address!("2222222222222222222222222222222222222222");
		let base = compute_domain_hash("Gateway", "1", 1, &contract);
		assert_ne!(base, compute_domain_hash("Other", "1", 1, &contract));
		assert_ne!(base, compute_domain_hash("Gateway", "2", 1, &contract));
		assert_ne!(base, compute_domain_hash("Gateway", "1", 5, &contract));
		assert_ne!(
			base,
			compute_domain_hash(
				"Gateway",
				"1",
				1,
				&address!("3333333333333333333333333333333333333333")
			)
		);
	}

	#[test]
	fn final_digest_is_prefix_bound() {
		let domain = B256::repeat_byte(0xaa);
		let struct_hash = B256::repeat_byte(0xbb);
		let digest = compute_final_digest(&domain, &struct_hash);
		// Swapping the inputs must not commute
		assert_ne!(digest, compute_final_digest(&struct_hash, &domain));
	}
}
