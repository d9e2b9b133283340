//! Identity provider instances, limited to the organization-related settings.
//!
//! The full representation is large and version dependent, so unknown fields are
//! kept verbatim and written back on update.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, client::KeycloakClient};

/// Config key holding the organization domain an identity provider serves.
pub const ORG_DOMAIN_KEY: &str = "kc.org.domain";
/// Config key enabling redirects for users whose email matches the domain.
pub const ORG_REDIRECT_EMAIL_MATCHES_KEY: &str = "kc.org.broker.redirect.mode.email-matches";

/// Identity provider as exchanged with `/identity-provider/instances/{alias}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProvider {
	/// Unique alias.
	pub alias: String,
	/// Provider implementation (`oidc`, `saml`, ...).
	#[serde(default)]
	pub provider_id: String,
	/// Provider is usable for login.
	#[serde(default)]
	pub enabled: bool,
	/// Provider specific settings.
	#[serde(default)]
	pub config: BTreeMap<String, Value>,
	/// Remaining fields, preserved for round trips.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl IdentityProvider {
	/// Organization domain, or `""` when unset.
	pub fn org_domain(&self) -> &str {
		self.config.get(ORG_DOMAIN_KEY).and_then(Value::as_str).unwrap_or("")
	}

	/// Sets the organization domain.
	pub fn set_org_domain(&mut self, domain: impl Into<String>) {
		self.config.insert(ORG_DOMAIN_KEY.into(), Value::String(domain.into()));
	}

	/// Whether email-domain redirects are enabled; stored as a quoted boolean.
	pub fn org_redirect_email_matches(&self) -> bool {
		match self.config.get(ORG_REDIRECT_EMAIL_MATCHES_KEY) {
			Some(Value::String(raw)) => raw.eq_ignore_ascii_case("true"),
			Some(Value::Bool(flag)) => *flag,
			_ => false,
		}
	}

	/// Sets the email-domain redirect flag.
	pub fn set_org_redirect_email_matches(&mut self, enabled: bool) {
		self.config
			.insert(ORG_REDIRECT_EMAIL_MATCHES_KEY.into(), Value::String(enabled.to_string()));
	}
}

impl KeycloakClient {
	/// Fetches an identity provider by alias.
	pub async fn get_identity_provider(
		&self,
		realm_id: &str,
		alias: &str,
	) -> Result<IdentityProvider> {
		self.get(&identity_provider_path(realm_id, alias)).await
	}

	/// Replaces an identity provider.
	pub async fn update_identity_provider(
		&self,
		realm_id: &str,
		identity_provider: &IdentityProvider,
	) -> Result<()> {
		let path = identity_provider_path(realm_id, &identity_provider.alias);

		self.put(&path, identity_provider).await
	}
}

fn identity_provider_path(realm_id: &str, alias: &str) -> String {
	format!("/realms/{realm_id}/identity-provider/instances/{alias}")
}
