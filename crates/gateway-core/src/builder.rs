//! Gateway construction from validated configuration.
//!
//! The builder turns a [`Config`] plus the host collaborator implementations
//! into a ready [`Gateway`]. Configuration validation catches malformed
//! values at parse time; the builder enforces the cross-field invariants the
//! components require.

use gateway_config::Config;
use gateway_host::{Ledger, TrustRegistry};
use gateway_types::SigningDomain;

use crate::engine::Gateway;
use crate::multisig::MultiSigExecutor;
use crate::permit::PermitAuthorizer;
use crate::relayer::Relayer;
use crate::BuildError;

/// Builds a [`Gateway`] from configuration.
pub struct GatewayBuilder {
	config: Config,
}

impl GatewayBuilder {
	/// Creates a builder over a validated configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Assembles the gateway with the supplied collaborators.
	pub fn build<T: TrustRegistry, L: Ledger>(
		self,
		trust: T,
		ledger: L,
	) -> Result<Gateway<T, L>, BuildError> {
		let config = self.config;

		let relayer_domain = SigningDomain {
			name: config.domain.name.clone(),
			version: config.domain.version.clone(),
			chain_id: config.domain.chain_id,
			verifying_contract: config.domain.verifying_contract,
		};
		let relayer = Relayer::new(
			relayer_domain,
			config.relayer.required_role,
			config.relayer.admin,
		);

		let multisig_domain = SigningDomain {
			name: config.domain.name.clone(),
			version: config.domain.version.clone(),
			chain_id: config.domain.chain_id,
			verifying_contract: config.multisig.verifying_contract,
		};
		let multisig = MultiSigExecutor::new(
			multisig_domain,
			config.multisig.owners.clone(),
			config.multisig.threshold,
		)?;

		let permit = PermitAuthorizer::new(
			config.permit.version.clone(),
			config.domain.chain_id,
			config.permit.verifying_contract,
		);

		tracing::info!(
			gateway_id = %config.gateway.id,
			chain_id = config.domain.chain_id,
			owners = config.multisig.owners.len(),
			threshold = config.multisig.threshold,
			"gateway assembled"
		);
		Ok(Gateway::new(relayer, multisig, permit, trust, ledger))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::sign;
	use crate::AuthorizationError;
	use alloy_primitives::{address, Address, Bytes, U256};
	use alloy_signer_local::PrivateKeySigner;
	use gateway_host::implementations::memory::{MemoryLedger, MemoryTrustRegistry};
	use gateway_types::{CallMessage, GatewayEvent, PermitMessage, Role, SigningDomain};

	const TARGET: Address = address!("00000000000000000000000000000000000000f0");
	const CALLER: Address = address!("00000000000000000000000000000000000000f5");

	fn config() -> Config {
		r#"
[gateway]
id = "gateway-e2e"

[domain]
name = "TransferGateway"
version = "1"
chain_id = 1
verifying_contract = "0x2000000000000000000000000000000000000001"

[relayer]
required_role = "issuer"
admin = "0x2000000000000000000000000000000000000002"

[multisig]
verifying_contract = "0x2000000000000000000000000000000000000003"
owners = [
    "0x2000000000000000000000000000000000000011",
    "0x2000000000000000000000000000000000000012",
]
threshold = 2

[permit]
version = "1"
verifying_contract = "0x2000000000000000000000000000000000000004"
"#
		.parse()
		.unwrap()
	}

	#[test]
	fn builds_a_working_gateway_from_config() {
		let config = config();
		let issuer = PrivateKeySigner::random();
		let owner = PrivateKeySigner::random();

		let mut trust = MemoryTrustRegistry::new();
		trust.grant_role(issuer.address(), Role::Issuer);
		let mut ledger = MemoryLedger::new("Token");
		ledger.mint(owner.address(), U256::from(1000u64));
		ledger.register_target(TARGET, |req| Ok(req.payload.to_vec()));

		let mut gateway = GatewayBuilder::new(config.clone())
			.build(trust, ledger)
			.unwrap();

		// Relay a signed call
		let message = CallMessage {
			destination: TARGET,
			value: U256::ZERO,
			payload: Bytes::from(vec![0xaa]),
			executor: Address::ZERO,
			gas_limit: U256::from(50_000u64),
		};
		let digest = gateway.relayer().domain().digest(&message.struct_hash(0));
		let sig = sign(&issuer, &digest);
		let output = gateway.execute(CALLER, &message, &sig).unwrap();
		assert_eq!(output, vec![0xaa]);

		// Apply a permit against the live token name
		let permit_domain = SigningDomain {
			name: gateway.ledger().token_name(),
			version: config.permit.version.clone(),
			chain_id: config.domain.chain_id,
			verifying_contract: config.permit.verifying_contract,
		};
		let deadline = crate::engine::unix_now() + 3600;
		let permit_message = PermitMessage {
			owner: owner.address(),
			spender: CALLER,
			value: U256::from(250u64),
			deadline,
		};
		let permit_sig = sign(&owner, &permit_domain.digest(&permit_message.struct_hash(0)));
		gateway.permit(&permit_message, &permit_sig).unwrap();
		assert_eq!(
			gateway.ledger().allowance(&owner.address(), &CALLER),
			U256::from(250u64)
		);

		let events = gateway.drain_events();
		assert!(events
			.iter()
			.any(|e| matches!(e, GatewayEvent::CallForwarded { .. })));
		assert!(events
			.iter()
			.any(|e| matches!(e, GatewayEvent::PermitApplied { .. })));
	}

	#[test]
	fn admin_operations_are_gated_end_to_end() {
		let config = config();
		let admin = config.relayer.admin;
		let mut gateway = GatewayBuilder::new(config)
			.build(MemoryTrustRegistry::new(), MemoryLedger::new("Token"))
			.unwrap();

		let err = gateway.rotate_domain(CALLER, 137).unwrap_err();
		assert!(matches!(err, AuthorizationError::NotAdmin(_)));
		gateway.rotate_domain(admin, 137).unwrap();
		assert_eq!(gateway.relayer().domain().chain_id, 137);

		let key = gateway.relayer().subject_key();
		gateway.override_nonce(admin, key.clone(), 42).unwrap();
		assert_eq!(gateway.current_nonce(&key), 42);
	}
}
