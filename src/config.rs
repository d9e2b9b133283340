//! Admin client configuration, credential selection, and environment fallbacks.
//!
//! [`ClientConfig`] values are assembled through [`ClientConfigBuilder`] so every
//! client receives a validated URL, a single credential mode, and sane transport
//! defaults. [`ClientConfigBuilder::from_env`] seeds the builder from the same
//! `KEYCLOAK_*` variables the Terraform provider block falls back to.

// crates.io
use reqwest::header::{HeaderName, HeaderValue};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Environment variable holding the server root URL.
pub const ENV_URL: &str = "KEYCLOAK_URL";
/// Environment variable holding the legacy base path (for example `/auth`).
pub const ENV_BASE_PATH: &str = "KEYCLOAK_BASE_PATH";
/// Environment variable holding the realm of the admin client.
pub const ENV_REALM: &str = "KEYCLOAK_REALM";
/// Environment variable holding the admin client identifier.
pub const ENV_CLIENT_ID: &str = "KEYCLOAK_CLIENT_ID";
/// Environment variable holding the admin client secret.
pub const ENV_CLIENT_SECRET: &str = "KEYCLOAK_CLIENT_SECRET";
/// Environment variable holding the admin username for the password grant.
pub const ENV_USER: &str = "KEYCLOAK_USER";
/// Environment variable holding the admin password for the password grant.
pub const ENV_PASSWORD: &str = "KEYCLOAK_PASSWORD";
/// Environment variable holding a pre-issued bearer token.
pub const ENV_ACCESS_TOKEN: &str = "KEYCLOAK_ACCESS_TOKEN";
/// Environment variable holding the HTTP timeout in seconds.
pub const ENV_CLIENT_TIMEOUT: &str = "KEYCLOAK_CLIENT_TIMEOUT";
/// Environment variable toggling TLS verification.
pub const ENV_TLS_INSECURE_SKIP_VERIFY: &str = "KEYCLOAK_TLS_INSECURE_SKIP_VERIFY";

/// Errors raised while constructing or validating client configuration.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// No server URL was supplied.
	#[error("The Keycloak URL is required.")]
	MissingUrl,
	/// Server URL cannot be parsed.
	#[error("The Keycloak URL `{url}` is invalid.")]
	InvalidUrl {
		/// URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Server URL uses a scheme other than HTTP(S).
	#[error("The Keycloak URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// Client identifier is required for every grant.
	#[error("The client_id is required unless an access_token is supplied.")]
	MissingClientId,
	/// Username and password must be supplied together.
	#[error("The username and password must be supplied together.")]
	IncompletePasswordCredentials,
	/// No usable credential mode could be derived.
	#[error(
		"Must specify client_secret for the client credentials grant, username and password for the password grant, or an access_token."
	)]
	MissingCredentials,
	/// Timeout must be positive.
	#[error("The client_timeout must be a positive number of seconds.")]
	NonPositiveTimeout,
	/// Additional header is not a valid HTTP header.
	#[error("The additional header `{name}` is not a valid HTTP header.")]
	InvalidHeader {
		/// Header name that failed validation.
		name: String,
	},
	/// Environment variable holds a value of the wrong type.
	#[error("Environment variable {var} holds an invalid value `{value}`.")]
	InvalidEnv {
		/// Variable name.
		var: &'static str,
		/// Raw value.
		value: String,
	},
}

/// Grant used to obtain admin tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
	/// `client_credentials` grant with a confidential client.
	ClientCredentials {
		/// Client identifier.
		client_id: String,
		/// Client secret.
		client_secret: TokenSecret,
	},
	/// `password` grant on behalf of an admin user.
	Password {
		/// Client identifier (usually `admin-cli`).
		client_id: String,
		/// Optional client secret for confidential clients.
		client_secret: Option<TokenSecret>,
		/// Admin username.
		username: String,
		/// Admin password.
		password: TokenSecret,
	},
	/// Pre-issued bearer token that is never refreshed.
	AccessToken {
		/// Bearer token value.
		token: TokenSecret,
	},
}
impl Credentials {
	/// Returns the client identifier used at the token endpoint, if any.
	pub fn client_id(&self) -> Option<&str> {
		match self {
			Self::ClientCredentials { client_id, .. } | Self::Password { client_id, .. } =>
				Some(client_id),
			Self::AccessToken { .. } => None,
		}
	}
}

/// Validated configuration consumed by [`KeycloakClient`](crate::client::KeycloakClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Server root URL.
	pub url: Url,
	/// Path prefix between the root URL and `/realms` or `/admin`.
	pub base_path: String,
	/// Realm that hosts the admin client.
	pub realm: String,
	/// Credential mode.
	pub credentials: Credentials,
	/// Whether [`KeycloakClient::connect`](crate::client::KeycloakClient::connect) logs in eagerly.
	pub initial_login: bool,
	/// Timeout applied to every HTTP request.
	pub client_timeout: Duration,
	/// Disables certificate verification.
	pub tls_insecure_skip_verify: bool,
	/// Extra PEM-encoded root certificate trusted by the client.
	pub root_ca_certificate: Option<String>,
	/// Custom `User-Agent` header.
	pub user_agent: Option<String>,
	/// Server reports Red Hat SSO version numbers.
	pub red_hat_sso: bool,
	/// Headers attached to every admin request.
	pub additional_headers: BTreeMap<String, String>,
}
impl ClientConfig {
	/// Creates a new builder for the provided server root URL.
	pub fn builder(url: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(url)
	}

	/// Builds a configuration purely from the `KEYCLOAK_*` environment variables.
	pub fn from_env() -> Result<Self, ClientConfigError> {
		ClientConfigBuilder::from_env()?.build()
	}

	/// Builds a configuration from an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		ClientConfigBuilder::from_lookup(lookup)?.build()
	}

	/// Realm token endpoint used for every grant.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		let raw = format!("{}/realms/{}/protocol/openid-connect/token", self.root(), self.realm);

		Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { url: raw, source })
	}

	/// Absolute admin API URL for `path`.
	pub fn admin_url(&self, path: &str) -> Result<Url, ConfigError> {
		let raw = format!("{}/admin{path}", self.root());

		Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { url: raw, source })
	}

	fn root(&self) -> String {
		format!("{}{}", self.url.as_str().trim_end_matches('/'), self.base_path)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	url: String,
	base_path: String,
	realm: String,
	client_id: Option<String>,
	client_secret: Option<String>,
	username: Option<String>,
	password: Option<String>,
	access_token: Option<String>,
	initial_login: bool,
	client_timeout: Duration,
	tls_insecure_skip_verify: bool,
	root_ca_certificate: Option<String>,
	user_agent: Option<String>,
	red_hat_sso: bool,
	additional_headers: BTreeMap<String, String>,
}
impl ClientConfigBuilder {
	const DEFAULT_REALM: &'static str = "master";
	const DEFAULT_TIMEOUT: Duration = Duration::seconds(15);

	/// Creates a builder seeded with defaults and the provided server URL.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			base_path: String::new(),
			realm: Self::DEFAULT_REALM.into(),
			client_id: None,
			client_secret: None,
			username: None,
			password: None,
			access_token: None,
			initial_login: true,
			client_timeout: Self::DEFAULT_TIMEOUT,
			tls_insecure_skip_verify: false,
			root_ca_certificate: None,
			user_agent: None,
			red_hat_sso: false,
			additional_headers: BTreeMap::new(),
		}
	}

	/// Seeds a builder from the process environment.
	pub fn from_env() -> Result<Self, ClientConfigError> {
		Self::from_lookup(|var| std::env::var(var).ok())
	}

	/// Seeds a builder from an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |var: &str| lookup(var).filter(|value| !value.is_empty());
		let mut builder = Self::new(read(ENV_URL).unwrap_or_default());

		if let Some(base_path) = read(ENV_BASE_PATH) {
			builder = builder.base_path(base_path);
		}
		if let Some(realm) = read(ENV_REALM) {
			builder = builder.realm(realm);
		}

		builder.client_id = read(ENV_CLIENT_ID);
		builder.client_secret = read(ENV_CLIENT_SECRET);
		builder.username = read(ENV_USER);
		builder.password = read(ENV_PASSWORD);
		builder.access_token = read(ENV_ACCESS_TOKEN);

		if let Some(raw) = read(ENV_CLIENT_TIMEOUT) {
			let seconds = raw
				.parse::<i64>()
				.map_err(|_| ClientConfigError::InvalidEnv {
					var: ENV_CLIENT_TIMEOUT,
					value: raw,
				})?;

			builder = builder.client_timeout(Duration::seconds(seconds));
		}
		if let Some(raw) = read(ENV_TLS_INSECURE_SKIP_VERIFY) {
			let skip = raw.parse::<bool>().map_err(|_| ClientConfigError::InvalidEnv {
				var: ENV_TLS_INSECURE_SKIP_VERIFY,
				value: raw,
			})?;

			builder = builder.tls_insecure_skip_verify(skip);
		}

		Ok(builder)
	}

	/// Overrides the server URL.
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();

		self
	}

	/// Sets the legacy base path; a missing leading slash is added.
	pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
		let base_path = base_path.into();
		let trimmed = base_path.trim_end_matches('/');

		self.base_path = if trimmed.is_empty() || trimmed.starts_with('/') {
			trimmed.to_owned()
		} else {
			format!("/{trimmed}")
		};

		self
	}

	/// Sets the realm hosting the admin client.
	pub fn realm(mut self, realm: impl Into<String>) -> Self {
		self.realm = realm.into();

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Sets the username for the password grant.
	pub fn username(mut self, username: impl Into<String>) -> Self {
		self.username = Some(username.into());

		self
	}

	/// Sets the password for the password grant.
	pub fn password(mut self, password: impl Into<String>) -> Self {
		self.password = Some(password.into());

		self
	}

	/// Supplies a pre-issued bearer token, bypassing the token endpoint.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(token.into());

		self
	}

	/// Toggles eager login during connect.
	pub fn initial_login(mut self, initial_login: bool) -> Self {
		self.initial_login = initial_login;

		self
	}

	/// Overrides the HTTP timeout (defaults to 15 seconds).
	pub fn client_timeout(mut self, timeout: Duration) -> Self {
		self.client_timeout = timeout;

		self
	}

	/// Disables TLS certificate verification.
	pub fn tls_insecure_skip_verify(mut self, skip: bool) -> Self {
		self.tls_insecure_skip_verify = skip;

		self
	}

	/// Adds a PEM-encoded root certificate.
	pub fn root_ca_certificate(mut self, pem: impl Into<String>) -> Self {
		self.root_ca_certificate = Some(pem.into());

		self
	}

	/// Sets a custom `User-Agent`.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Marks the server as Red Hat SSO.
	pub fn red_hat_sso(mut self, red_hat_sso: bool) -> Self {
		self.red_hat_sso = red_hat_sso;

		self
	}

	/// Adds a header sent with every admin request.
	pub fn additional_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.additional_headers.insert(name.into(), value.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		if self.url.is_empty() {
			return Err(ClientConfigError::MissingUrl);
		}

		let url = Url::parse(&self.url)
			.map_err(|source| ClientConfigError::InvalidUrl { url: self.url.clone(), source })?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(ClientConfigError::UnsupportedScheme { url: self.url });
		}
		if !self.client_timeout.is_positive() {
			return Err(ClientConfigError::NonPositiveTimeout);
		}

		for (name, value) in &self.additional_headers {
			if HeaderName::from_bytes(name.as_bytes()).is_err()
				|| HeaderValue::from_str(value).is_err()
			{
				return Err(ClientConfigError::InvalidHeader { name: name.clone() });
			}
		}

		let credentials = select_credentials(
			self.client_id,
			self.client_secret,
			self.username,
			self.password,
			self.access_token,
		)?;

		Ok(ClientConfig {
			url,
			base_path: self.base_path,
			realm: self.realm,
			credentials,
			initial_login: self.initial_login,
			client_timeout: self.client_timeout,
			tls_insecure_skip_verify: self.tls_insecure_skip_verify,
			root_ca_certificate: self.root_ca_certificate,
			user_agent: self.user_agent,
			red_hat_sso: self.red_hat_sso,
			additional_headers: self.additional_headers,
		})
	}
}

fn select_credentials(
	client_id: Option<String>,
	client_secret: Option<String>,
	username: Option<String>,
	password: Option<String>,
	access_token: Option<String>,
) -> Result<Credentials, ClientConfigError> {
	let non_empty = |value: Option<String>| value.filter(|value| !value.is_empty());

	if let Some(token) = non_empty(access_token) {
		return Ok(Credentials::AccessToken { token: TokenSecret::new(token) });
	}

	let client_id = non_empty(client_id).ok_or(ClientConfigError::MissingClientId)?;
	let client_secret = non_empty(client_secret).map(TokenSecret::new);

	match (non_empty(username), non_empty(password)) {
		(Some(username), Some(password)) => Ok(Credentials::Password {
			client_id,
			client_secret,
			username,
			password: TokenSecret::new(password),
		}),
		(Some(_), None) | (None, Some(_)) => Err(ClientConfigError::IncompletePasswordCredentials),
		(None, None) => match client_secret {
			Some(client_secret) => Ok(Credentials::ClientCredentials { client_id, client_secret }),
			None => Err(ClientConfigError::MissingCredentials),
		},
	}
}
