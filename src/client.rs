//! Authenticated Keycloak admin REST client.
//!
//! [`KeycloakClient`] owns the HTTP transport, the cached admin token, and the
//! server version. Token handling lives in [`login`], request plumbing in
//! [`request`], and version probing in [`version`]; the resource adapters in
//! [`crate::api`] are implemented as further `impl KeycloakClient` blocks.

pub mod login;
pub mod request;
pub mod version;

mod metrics;

pub use metrics::ClientMetrics;
pub use request::id_from_location;
pub use version::Version;

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	config::{ClientConfig, Credentials},
	http::ReqwestHttpClient,
	oauth::TokenFacade,
};

/// Admin client bound to one Keycloak server and one set of credentials.
///
/// The client is cheap to share behind an [`Arc`]; every method takes `&self`.
/// Concurrent callers that find the cached token stale queue on a single login
/// guard so only one token request is in flight at a time.
pub struct KeycloakClient {
	config: ClientConfig,
	http_client: ReqwestHttpClient,
	facade: Option<TokenFacade>,
	token: RwLock<Option<TokenRecord>>,
	login_guard: AsyncMutex<()>,
	server_version: RwLock<Option<Version>>,
	metrics: ClientMetrics,
}
impl KeycloakClient {
	/// Builds a client without performing any I/O.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(&config)?;

		Self::with_http_client(config, http_client)
	}

	/// Builds a client around a caller-provided transport.
	pub fn with_http_client(config: ClientConfig, http_client: ReqwestHttpClient) -> Result<Self> {
		let facade = match &config.credentials {
			Credentials::ClientCredentials { client_id, client_secret } => Some(TokenFacade::new(
				&config.token_endpoint()?,
				client_id,
				Some(client_secret),
				http_client.clone(),
			)?),
			Credentials::Password { client_id, client_secret, .. } => Some(TokenFacade::new(
				&config.token_endpoint()?,
				client_id,
				client_secret.as_ref(),
				http_client.clone(),
			)?),
			Credentials::AccessToken { .. } => None,
		};

		Ok(Self {
			config,
			http_client,
			facade,
			token: RwLock::new(None),
			login_guard: AsyncMutex::new(()),
			server_version: RwLock::new(None),
			metrics: ClientMetrics::default(),
		})
	}

	/// Builds a client and logs in when `initial_login` is enabled.
	pub async fn connect(config: ClientConfig) -> Result<Self> {
		let client = Self::new(config)?;

		if client.config.initial_login {
			client.login().await?;
		}

		Ok(client)
	}

	/// Configuration the client was built from.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Counters describing token activity.
	pub fn metrics(&self) -> &ClientMetrics {
		&self.metrics
	}

	/// Returns a copy of the cached token record, if any.
	pub fn cached_token(&self) -> Option<TokenRecord> {
		self.token.read().clone()
	}
}
impl Debug for KeycloakClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeycloakClient")
			.field("url", &self.config.url.as_str())
			.field("realm", &self.config.realm)
			.field("client_id", &self.config.credentials.client_id())
			.field("token_cached", &self.token.read().is_some())
			.field("server_version", &*self.server_version.read())
			.finish()
	}
}
