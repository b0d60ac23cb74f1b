//! Signed-token identity implementation.
//!
//! Issues compact bearer tokens of the form
//! `{subject}.{role}.{expires}.{signature}` where the signature is a
//! keyed SHA3-256 digest over the payload. Verification recomputes the
//! digest with the configured secret and checks the expiry.

use crate::{IdentityError, IdentityFactory, IdentityInterface, IdentityRegistry, Role};
use async_trait::async_trait;
use serde::Deserialize;
use sha3::{Digest, Sha3_256};
use storefront_types::{
	current_timestamp, ConfigSchema, Field, FieldType, Identity, ImplementationRegistry, Schema,
	SecretString, ValidationError,
};

/// Default token lifetime of one day.
const DEFAULT_TTL_SECONDS: u64 = 86_400;

/// Configuration for the signed-token identity implementation.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedTokenConfig {
	/// Signing secret. Tokens signed with a different secret are rejected.
	pub secret: SecretString,
	/// Token lifetime in seconds.
	#[serde(default = "default_ttl")]
	pub token_ttl_seconds: u64,
}

fn default_ttl() -> u64 {
	DEFAULT_TTL_SECONDS
}

impl ConfigSchema for SignedTokenConfig {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("secret", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(s) if !s.is_empty() => Ok(()),
					Some(_) => Err("secret cannot be empty".to_string()),
					None => Err("secret must be a string".to_string()),
				}
			})],
			vec![Field::new(
				"token_ttl_seconds",
				FieldType::Integer {
					min: Some(1),
					max: None,
				},
			)],
		);
		schema.validate(config)
	}
}

/// Signed-token identity implementation.
pub struct SignedTokenIdentity {
	config: SignedTokenConfig,
}

impl SignedTokenIdentity {
	/// Creates a new signed-token identity provider from the given
	/// configuration.
	pub fn new(config: SignedTokenConfig) -> Self {
		Self { config }
	}

	fn signature(&self, subject: &str, role: &str, expires: u64) -> String {
		let mut hasher = Sha3_256::new();
		hasher.update(self.config.secret.expose_secret().as_bytes());
		hasher.update(b".");
		hasher.update(subject.as_bytes());
		hasher.update(b".");
		hasher.update(role.as_bytes());
		hasher.update(b".");
		hasher.update(expires.to_string().as_bytes());
		hex::encode(hasher.finalize())
	}

	fn token_at(&self, subject: &str, role: Role, expires: u64) -> String {
		let sig = self.signature(subject, role.as_str(), expires);
		format!("{}.{}.{}.{}", subject, role.as_str(), expires, sig)
	}
}

/// Compares the two signatures by digest so the comparison time does not
/// depend on how long a matching prefix the attacker supplied.
fn signatures_match(expected: &str, presented: &str) -> bool {
	Sha3_256::digest(expected.as_bytes()) == Sha3_256::digest(presented.as_bytes())
}

#[async_trait]
impl IdentityInterface for SignedTokenIdentity {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(self.config.clone())
	}

	fn issue_token(&self, subject: &str, role: Role) -> Result<String, IdentityError> {
		if subject.is_empty() {
			return Err(IdentityError::InvalidToken(
				"subject cannot be empty".to_string(),
			));
		}
		let expires = current_timestamp() + self.config.token_ttl_seconds;
		Ok(self.token_at(subject, role, expires))
	}

	async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError> {
		// The subject may itself contain dots, so split from the right:
		// the last three segments are signature, expiry, and role.
		let mut parts = token.rsplitn(4, '.');
		let sig = parts.next();
		let expires = parts.next();
		let role = parts.next();
		let subject = parts.next();

		let (Some(sig), Some(expires), Some(role), Some(subject)) = (sig, expires, role, subject)
		else {
			return Err(IdentityError::InvalidToken(
				"malformed token".to_string(),
			));
		};

		let expires: u64 = expires
			.parse()
			.map_err(|_| IdentityError::InvalidToken("malformed expiry".to_string()))?;
		let role = Role::parse(role)
			.ok_or_else(|| IdentityError::InvalidToken(format!("unknown role: {}", role)))?;

		let expected = self.signature(subject, role.as_str(), expires);
		if !signatures_match(&expected, sig) {
			tracing::warn!("Rejected token with bad signature");
			return Err(IdentityError::InvalidToken(
				"signature mismatch".to_string(),
			));
		}
		if expires < current_timestamp() {
			return Err(IdentityError::Expired);
		}

		let id = subject.to_string();
		Ok(match role {
			Role::Customer => Identity::Customer { id },
			Role::Owner => Identity::Owner { id },
		})
	}
}

/// Registry for the signed-token identity implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "signed_token";
	type Factory = IdentityFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn IdentityInterface>, IdentityError> {
			let identity_config: SignedTokenConfig = config
				.clone()
				.try_into()
				.map_err(|e| IdentityError::Configuration(format!("Invalid identity config: {}", e)))?;
			identity_config
				.validate(config)
				.map_err(|e| IdentityError::Configuration(e.to_string()))?;

			Ok(Box::new(SignedTokenIdentity::new(identity_config)))
		}
	}
}

impl IdentityRegistry for Registry {}
