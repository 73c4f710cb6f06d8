//! Configuration module for the off-chain signature gateway.
//!
//! This module provides structures and utilities for managing gateway
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set before any component is constructed from them.

use alloy_primitives::Address;
use gateway_types::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the gateway.
///
/// Contains all sections required to stand the gateway up: instance identity,
/// the relayer signing domain and policy, the multi-signature executor owner
/// set, and the permit authorizer parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the gateway instance.
	pub gateway: GatewayConfig,
	/// Signing domain for the relayer and multi-signature executor.
	pub domain: DomainConfig,
	/// Relayer authorization policy.
	pub relayer: RelayerConfig,
	/// Multi-signature executor owner set.
	pub multisig: MultisigConfig,
	/// Permit authorizer parameters.
	pub permit: PermitConfig,
}

/// Configuration specific to the gateway instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
	/// Unique identifier for this gateway instance.
	pub id: String,
}

/// Signing domain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
	/// Human-readable domain name.
	pub name: String,
	/// Domain version string.
	pub version: String,
	/// Chain identifier signatures are bound to.
	pub chain_id: u64,
	/// Identity of the verifying component.
	pub verifying_contract: Address,
}

/// Relayer authorization policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayerConfig {
	/// Role a recovered signer must hold for its calls to be dispatched.
	#[serde(default = "default_required_role")]
	pub required_role: Role,
	/// Address allowed to rotate the domain and override nonce counters.
	pub admin: Address,
}

/// Returns the default role required of call signers.
fn default_required_role() -> Role {
	Role::Issuer
}

/// Multi-signature executor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MultisigConfig {
	/// Identity of the executor; self-targeted calls rotate the owner set.
	pub verifying_contract: Address,
	/// Ordered set of authorized signer addresses.
	pub owners: Vec<Address>,
	/// Number of distinct owner signatures required per execution.
	pub threshold: usize,
}

/// Permit authorizer configuration.
///
/// The permit domain's display name is not configured here: it is read from
/// the live ledger on every hashing call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PermitConfig {
	/// Permit domain version string.
	pub version: String,
	/// Identity of the token the permits act on.
	pub verifying_contract: Address,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment variables
	/// and validating the result.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		raw.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// - Gateway id and domain name/version must be non-empty
	/// - Chain id must be non-zero
	/// - The owner set must be non-empty and free of duplicates
	/// - The threshold must satisfy 1 <= threshold <= owners.len()
	fn validate(&self) -> Result<(), ConfigError> {
		if self.gateway.id.is_empty() {
			return Err(ConfigError::Validation("Gateway ID cannot be empty".into()));
		}

		if self.domain.name.is_empty() {
			return Err(ConfigError::Validation("Domain name cannot be empty".into()));
		}
		if self.domain.version.is_empty() {
			return Err(ConfigError::Validation(
				"Domain version cannot be empty".into(),
			));
		}
		if self.domain.chain_id == 0 {
			return Err(ConfigError::Validation("Chain id cannot be zero".into()));
		}

		if self.multisig.owners.is_empty() {
			return Err(ConfigError::Validation(
				"Multisig owner set cannot be empty".into(),
			));
		}
		let distinct: HashSet<&Address> = self.multisig.owners.iter().collect();
		if distinct.len() != self.multisig.owners.len() {
			return Err(ConfigError::Validation(
				"Multisig owner set contains duplicate addresses".into(),
			));
		}
		if self.multisig.threshold == 0 {
			return Err(ConfigError::Validation(
				"Multisig threshold must be at least 1".into(),
			));
		}
		if self.multisig.threshold > self.multisig.owners.len() {
			return Err(ConfigError::Validation(format!(
				"Multisig threshold {} exceeds owner set size {}",
				self.multisig.threshold,
				self.multisig.owners.len()
			)));
		}

		if self.permit.version.is_empty() {
			return Err(ConfigError::Validation(
				"Permit version cannot be empty".into(),
			));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is automatically
/// validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
