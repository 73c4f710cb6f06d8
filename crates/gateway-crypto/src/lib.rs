//! Signer recovery for the off-chain signature gateway.
//!
//! This crate provides the one cryptographic primitive the gateway needs:
//! recovering the signing address from a 32-byte digest and an (r, s, v)
//! signature. Structural validation happens before any point arithmetic so
//! malformed payloads are rejected with a precise reason.
//!
//! Recovery has no notion of a "wrong" signer: for every well-formed input it
//! yields *some* address. Comparing that address against an expected signer
//! or a role registry is the caller's responsibility.

use alloy_primitives::{b256, Address, Signature, B256, U256};
use gateway_types::SignaturePayload;
use thiserror::Error;

/// Upper bound for the `s` scalar: secp256k1 curve order divided by two.
/// Signatures above this bound are malleable and rejected outright.
const SECP256K1N_HALF: B256 =
	b256!("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0");

/// Errors raised while recovering a signer.
///
/// Every variant describes a structurally invalid signature. Callers fold
/// them into their own "malformed signature" class; re-signing always clears
/// the condition.
#[derive(Debug, Error)]
pub enum SignatureError {
	/// The recovery id is outside the 27/28 convention.
	#[error("invalid recovery id {0}, expected 27 or 28")]
	InvalidV(u8),
	/// One of the signature scalars is zero.
	#[error("signature scalar {0} is zero")]
	ZeroScalar(&'static str),
	/// The `s` scalar is in the upper half of the curve order.
	#[error("signature s is in the upper half of the curve order")]
	HighS,
	/// The scalars do not describe a recoverable curve point.
	#[error("point recovery failed: {0}")]
	Recovery(String),
}

/// Recovers the address that signed `digest`.
///
/// Validates the payload structurally (v range, non-zero scalars, low-s),
/// then performs ECDSA public key recovery and derives the address.
pub fn recover_signer(
	digest: &B256,
	payload: &SignaturePayload,
) -> Result<Address, SignatureError> {
	if payload.v != 27 && payload.v != 28 {
		return Err(SignatureError::InvalidV(payload.v));
	}
	let r = U256::from_be_bytes(payload.r.0);
	let s = U256::from_be_bytes(payload.s.0);
	if r.is_zero() {
		return Err(SignatureError::ZeroScalar("r"));
	}
	if s.is_zero() {
		return Err(SignatureError::ZeroScalar("s"));
	}
	if s > U256::from_be_bytes(SECP256K1N_HALF.0) {
		return Err(SignatureError::HighS);
	}

	let signature = Signature::new(r, s, payload.v == 28);
	signature
		.recover_address_from_prehash(digest)
		.map_err(|e| SignatureError::Recovery(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::keccak256;
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;

	fn signed_digest() -> (PrivateKeySigner, B256, SignaturePayload) {
		let signer = PrivateKeySigner::random();
		let digest = keccak256(b"gateway test message");
		let sig = signer.sign_hash_sync(&digest).unwrap();
		(signer, digest, SignaturePayload::from(sig))
	}

	#[test]
	fn recovers_the_signing_address() {
		let (signer, digest, payload) = signed_digest();
		let recovered = recover_signer(&digest, &payload).unwrap();
		assert_eq!(recovered, signer.address());
	}

	#[test]
	fn different_digest_recovers_different_address() {
		let (signer, _, payload) = signed_digest();
		let other = keccak256(b"a different message");
		let recovered = recover_signer(&other, &payload).unwrap();
		assert_ne!(recovered, signer.address());
	}

	#[test]
	fn rejects_bad_recovery_id() {
		let (_, digest, mut payload) = signed_digest();
		payload.v = 2;
		assert!(matches!(
			recover_signer(&digest, &payload),
			Err(SignatureError::InvalidV(2))
		));
	}

	#[test]
	fn rejects_zero_scalars() {
		let (_, digest, payload) = signed_digest();
		let mut zero_r = payload;
		zero_r.r = B256::ZERO;
		assert!(matches!(
			recover_signer(&digest, &zero_r),
			Err(SignatureError::ZeroScalar("r"))
		));
		let mut zero_s = payload;
		zero_s.s = B256::ZERO;
		assert!(matches!(
			recover_signer(&digest, &zero_s),
			Err(SignatureError::ZeroScalar("s"))
		));
	}

	#[test]
	fn rejects_high_s() {
		let (_, digest, mut payload) = signed_digest();
		payload.s = B256::repeat_byte(0xff);
		assert!(matches!(
			recover_signer(&digest, &payload),
			Err(SignatureError::HighS)
		));
	}
}
