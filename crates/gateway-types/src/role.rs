//! Roles consulted on recovered signers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error raised when a role name cannot be parsed.
#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// A capability a trust registry can attach to an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// May be the target of signed call authorizations.
	Issuer,
	/// Operational role for day-to-day administration.
	Agent,
}

/// The set of roles held by one address.
pub type RoleSet = BTreeSet<Role>;

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Issuer => write!(f, "issuer"),
			Role::Agent => write!(f, "agent"),
		}
	}
}

impl FromStr for Role {
	type Err = UnknownRole;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"issuer" => Ok(Role::Issuer),
			"agent" => Ok(Role::Agent),
			other => Err(UnknownRole(other.to_string())),
		}
	}
}
