//! Compact ECDSA signature payload.
//!
//! The payload is treated as opaque until verified; it is never trusted
//! before the digest it claims to sign has been recomputed.

use alloy_primitives::{Signature, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when raw bytes cannot be split into (r, s, v).
#[derive(Debug, Error)]
pub enum SignatureParseError {
	/// The input is not the expected 65 bytes.
	#[error("signature must be 65 bytes (r || s || v), got {0}")]
	Length(usize),
}

/// An (r, s, v)-style ECDSA signature.
///
/// `v` uses the 27/28 convention. Structural validation (v range, low-s)
/// happens at recovery time, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePayload {
	/// Recovery id, 27 or 28.
	pub v: u8,
	/// First half of the signature.
	pub r: B256,
	/// Second half of the signature.
	pub s: B256,
}

impl SignaturePayload {
	/// Splits a 65-byte `r || s || v` blob into its components.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureParseError> {
		if bytes.len() != 65 {
			return Err(SignatureParseError::Length(bytes.len()));
		}
		Ok(Self {
			v: bytes[64],
			r: B256::from_slice(&bytes[..32]),
			s: B256::from_slice(&bytes[32..64]),
		})
	}

	/// Serializes back to the 65-byte `r || s || v` form.
	pub fn to_bytes(&self) -> [u8; 65] {
		let mut out = [0u8; 65];
		out[..32].copy_from_slice(self.r.as_slice());
		out[32..64].copy_from_slice(self.s.as_slice());
		out[64] = self.v;
		out
	}
}

impl From<Signature> for SignaturePayload {
	fn from(sig: Signature) -> Self {
		Self {
			v: 27 + sig.v() as u8,
			r: B256::from(sig.r()),
			s: B256::from(sig.s()),
		}
	}
}
