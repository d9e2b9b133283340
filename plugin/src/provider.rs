//! Provider block, admin client construction, and the resource registry.

// crates.io
use terraform_provider_keycloak::{
	config::{ClientConfig, ClientConfigBuilder},
	error::ConfigError,
};
use tf_provider::{DynamicDataSource, DynamicResource, Provider};
use time::Duration;
// self
use crate::{
	_prelude::*,
	data_sources::GroupsDataSource,
	resources::{
		OpenIdScriptProtocolMapperResource, OpenidClientAuthorizationRolePolicyResource,
		OrganizationIdentityProviderResource, OrganizationResource,
		RealmKeystoreRsaEncGeneratedResource, SamlHardcodedAttributeProtocolMapperResource,
		SamlUserSessionNoteProtocolMapperResource,
	},
	schema::{optional, sensitive, string_map},
	value::{non_empty, text_map},
};

/// Admin client shared by the provider and every resource it hands out.
///
/// Terraform asks for the resource registry before it sends the provider block, so
/// resources hold the slot and look the client up on each call.
#[derive(Clone, Default)]
pub struct ClientSlot(Arc<RwLock<Option<Arc<KeycloakClient>>>>);
impl ClientSlot {
	/// Slot that already holds `client`.
	pub fn with_client(client: KeycloakClient) -> Self {
		let slot = Self::default();

		slot.set(client);

		slot
	}

	/// Installs the configured client.
	pub fn set(&self, client: KeycloakClient) {
		*self.0.write() = Some(Arc::new(client));
	}

	/// Returns `true` once a client is installed.
	pub fn is_configured(&self) -> bool {
		self.0.read().is_some()
	}

	/// Configured client; reports an error while the provider is unconfigured.
	pub fn get(&self, diags: &mut Diagnostics) -> Option<Arc<KeycloakClient>> {
		let client = self.0.read().clone();

		if client.is_none() {
			diags.report(ConfigError::NotConfigured.into());
		}

		client
	}
}
impl Debug for ClientSlot {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientSlot").field("configured", &self.is_configured()).finish()
	}
}

/// `provider "keycloak"` block.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig<'a> {
	#[serde(borrow = "'a")]
	pub client_id: ValueString<'a>,
	pub client_secret: ValueString<'a>,
	pub username: ValueString<'a>,
	pub password: ValueString<'a>,
	pub access_token: ValueString<'a>,
	pub realm: ValueString<'a>,
	pub url: ValueString<'a>,
	pub base_path: ValueString<'a>,
	pub initial_login: ValueBool,
	pub client_timeout: ValueNumber,
	pub root_ca_certificate: ValueString<'a>,
	pub tls_insecure_skip_verify: ValueBool,
	pub red_hat_sso: ValueBool,
	pub additional_headers: ValueMap<'a, ValueString<'a>>,
}
impl ProviderConfig<'_> {
	/// Builds the client configuration, falling back to `KEYCLOAK_*` variables for unset
	/// attributes.
	pub fn client_config(&self) -> Result<ClientConfig> {
		let builder = ClientConfigBuilder::from_env().map_err(ConfigError::from)?;

		self.client_config_with(builder)
	}

	/// Applies the configured attributes on top of `builder`.
	pub fn client_config_with(&self, mut builder: ClientConfigBuilder) -> Result<ClientConfig> {
		if let Some(url) = non_empty(&self.url) {
			builder = builder.url(url);
		}
		if let Some(base_path) = non_empty(&self.base_path) {
			builder = builder.base_path(base_path);
		}
		if let Some(realm) = non_empty(&self.realm) {
			builder = builder.realm(realm);
		}
		if let Some(client_id) = non_empty(&self.client_id) {
			builder = builder.client_id(client_id);
		}
		if let Some(client_secret) = non_empty(&self.client_secret) {
			builder = builder.client_secret(client_secret);
		}
		if let Some(username) = non_empty(&self.username) {
			builder = builder.username(username);
		}
		if let Some(password) = non_empty(&self.password) {
			builder = builder.password(password);
		}
		if let Some(access_token) = non_empty(&self.access_token) {
			builder = builder.access_token(access_token);
		}
		if let Some(root_ca_certificate) = non_empty(&self.root_ca_certificate) {
			builder = builder.root_ca_certificate(root_ca_certificate);
		}
		if let Some(skip) = self.tls_insecure_skip_verify.as_option() {
			builder = builder.tls_insecure_skip_verify(skip);
		}
		if let Some(initial_login) = self.initial_login.as_option() {
			builder = builder.initial_login(initial_login);
		}
		if let Some(seconds) = self.client_timeout.as_option() {
			builder = builder.client_timeout(Duration::seconds(seconds));
		}
		if let Some(red_hat_sso) = self.red_hat_sso.as_option() {
			builder = builder.red_hat_sso(red_hat_sso);
		}

		for (name, value) in text_map(&self.additional_headers) {
			builder = builder.additional_header(name, value);
		}

		builder.build().map_err(|e| ConfigError::from(e).into())
	}
}

/// Keycloak provider served to Terraform.
#[derive(Clone, Debug, Default)]
pub struct KeycloakProvider {
	client: ClientSlot,
}
impl KeycloakProvider {
	/// Provider whose resources share `client`.
	pub fn with_client_slot(client: ClientSlot) -> Self {
		Self { client }
	}

	/// Client slot handed to every resource and data source.
	pub fn client_slot(&self) -> &ClientSlot {
		&self.client
	}
}
#[async_trait]
impl Provider for KeycloakProvider {
	type Config<'a> = ProviderConfig<'a>;
	type MetaState<'a> = ValueEmpty;

	fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
		let string = || AttributeType::String;

		Some(crate::schema::schema(
			"Manage Keycloak realms, clients, and organizations through the admin REST API.",
			map! {
				"client_id" => optional(
					string(),
					"Client used to authenticate against the admin API.",
				),
				"client_secret" => sensitive(optional(string(), "Secret of the admin client.")),
				"username" => optional(string(), "User for the password grant."),
				"password" => sensitive(optional(string(), "Password for the password grant.")),
				"access_token" => sensitive(optional(
					string(),
					"Pre-issued bearer token used instead of a grant.",
				)),
				"realm" => optional(string(), "Realm of the admin client. Defaults to master."),
				"url" => optional(string(), "The base URL of the Keycloak instance."),
				"base_path" => optional(string(), "Legacy path prefix such as /auth."),
				"initial_login" => optional(
					AttributeType::Bool,
					"Whether or not to login to Keycloak instance on provider init.",
				),
				"client_timeout" => optional(
					AttributeType::Number,
					"Timeout (in seconds) of the Keycloak client.",
				),
				"root_ca_certificate" => optional(string(), "Extra PEM root certificate to trust."),
				"tls_insecure_skip_verify" => optional(
					AttributeType::Bool,
					"Skip TLS certificate verification.",
				),
				"red_hat_sso" => optional(
					AttributeType::Bool,
					"Interpret server versions as Red Hat SSO releases.",
				),
				"additional_headers" => optional(string_map(), "Headers sent with every request."),
			},
			HashMap::new(),
		))
	}

	async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
		if let Some(seconds) = config.client_timeout.as_option().filter(|seconds| *seconds <= 0) {
			diags.error_short(
				format!("client_timeout must be positive, got {seconds}"),
				AttributePath::new("client_timeout"),
			);
		}

		Some(())
	}

	async fn configure<'a>(
		&self,
		diags: &mut Diagnostics,
		terraform_version: String,
		config: Self::Config<'a>,
	) -> Option<()> {
		let client_config = config.client_config().or_report(diags)?;
		let client = KeycloakClient::connect(client_config).await.or_report(diags)?;

		#[cfg(feature = "tracing")]
		tracing::debug!(?client, terraform_version, "Provider configured.");
		#[cfg(not(feature = "tracing"))]
		let _ = terraform_version;

		self.client.set(client);

		Some(())
	}

	fn get_resources(
		&self,
		_diags: &mut Diagnostics,
	) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
		let client = &self.client;

		Some(map! {
			"organization" => OrganizationResource::new(client.clone()),
			"organization_identity_provider" =>
				OrganizationIdentityProviderResource::new(client.clone()),
			"realm_keystore_rsa_enc_generated" =>
				RealmKeystoreRsaEncGeneratedResource::new(client.clone()),
			"saml_hardcoded_attribute_protocol_mapper" =>
				SamlHardcodedAttributeProtocolMapperResource::new(client.clone()),
			"saml_user_session_note_protocol_mapper" =>
				SamlUserSessionNoteProtocolMapperResource::new(client.clone()),
			"openid_script_protocol_mapper" =>
				OpenIdScriptProtocolMapperResource::new(client.clone()),
			"openid_client_authorization_role_policy" =>
				OpenidClientAuthorizationRolePolicyResource::new(client.clone()),
		})
	}

	fn get_data_sources(
		&self,
		_diags: &mut Diagnostics,
	) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
		Some(map! {
			"groups" => GroupsDataSource::new(self.client.clone()),
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config(url: &str) -> ProviderConfig<'static> {
		ProviderConfig {
			url: url.to_owned().into(),
			client_id: "terraform".into(),
			client_secret: "secret".into(),
			..Default::default()
		}
	}

	#[test]
	fn registries_expose_every_type() {
		let provider = KeycloakProvider::default();
		let mut diags = Diagnostics::default();
		let mut resources = provider
			.get_resources(&mut diags)
			.expect("Resources should be listed.")
			.into_keys()
			.collect::<Vec<_>>();

		resources.sort();

		assert_eq!(resources.len(), 7);
		assert_eq!(resources[0], "openid_client_authorization_role_policy");
		assert_eq!(
			provider
				.get_data_sources(&mut diags)
				.expect("Data sources should be listed.")
				.into_keys()
				.collect::<Vec<_>>(),
			vec!["groups".to_owned()]
		);
		assert!(diags.errors.is_empty());
	}

	#[test]
	fn provider_block_overrides_builder_defaults() {
		let config = ProviderConfig {
			base_path: "auth".into(),
			realm: "master".into(),
			initial_login: false.into(),
			client_timeout: 30.into(),
			tls_insecure_skip_verify: true.into(),
			additional_headers: ValueMap::from(BTreeMap::from([(
				Cow::from("X-Tenant"),
				ValueString::from("acme"),
			)])),
			..config("https://sso.example.com")
		}
		.client_config_with(ClientConfigBuilder::new(""))
		.expect("Provider block should produce a valid configuration.");

		assert_eq!(config.base_path, "/auth");
		assert_eq!(config.client_timeout, Duration::seconds(30));
		assert!(!config.initial_login);
		assert!(config.tls_insecure_skip_verify);
		assert_eq!(config.additional_headers.get("X-Tenant").map(String::as_str), Some("acme"));
		assert_eq!(config.credentials.client_id(), Some("terraform"));
	}

	#[test]
	fn unset_attributes_keep_the_seeded_values() {
		let seeded = ClientConfigBuilder::new("https://env.example.com")
			.realm("tenant")
			.client_id("env-client")
			.client_secret("env-secret");
		let config = ProviderConfig::default()
			.client_config_with(seeded)
			.expect("Seeded values should be enough.");

		assert_eq!(config.realm, "tenant");
		assert_eq!(config.url.as_str(), "https://env.example.com/");
		assert!(config.initial_login);
	}

	#[tokio::test]
	async fn non_positive_timeouts_are_rejected() {
		let provider = KeycloakProvider::default();
		let mut diags = Diagnostics::default();
		let config = ProviderConfig { client_timeout: 0.into(), ..config("https://kc") };

		provider.validate(&mut diags, config).await;

		assert_eq!(diags.errors.len(), 1);
		assert_eq!(diags.errors[0].attribute, AttributePath::new("client_timeout"));
	}

	#[test]
	fn slot_reports_missing_configuration() {
		let slot = ClientSlot::default();
		let mut diags = Diagnostics::default();

		assert!(slot.get(&mut diags).is_none());
		assert_eq!(
			diags.errors[0].summary,
			"Provider must be configured before resources can be managed."
		);
		assert_eq!(format!("{slot:?}"), "ClientSlot { configured: false }");
	}
}
