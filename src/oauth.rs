//! Token endpoint facade built on the `oauth2` crate.
//!
//! Keycloak issues admin tokens from the realm token endpoint through three grants:
//! `client_credentials`, `password`, and `refresh_token`. [`TokenFacade`] wraps a
//! token-only [`BasicClient`] and turns responses into [`TokenRecord`] values,
//! while failures are classified into [`Error::InvalidGrant`],
//! [`Error::InvalidClient`], or transient/transport errors.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RefreshToken, RequestTokenError, ResourceOwnerPassword, ResourceOwnerUsername, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{TokenRecord, TokenSecret},
	error::{ConfigError, TransientError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// OAuth 2.0 grants used to obtain admin tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Client Credentials grant for service-account admin clients.
	ClientCredentials,
	/// Resource Owner Password grant for admin users.
	Password,
	/// Refresh Token grant.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::ClientCredentials => "client_credentials",
			GrantType::Password => "password",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Canonical token error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenErrorKind {
	/// The grant (password or refresh token) was rejected.
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Failure is temporary.
	Transient,
}

/// Classifies a token endpoint error by OAuth error code, then by HTTP status.
pub fn classify_token_error(oauth_error: Option<&str>, status: Option<u16>) -> TokenErrorKind {
	if let Some(kind) = oauth_error.and_then(match_oauth_error) {
		return kind;
	}

	match status {
		Some(400) => TokenErrorKind::InvalidGrant,
		Some(401 | 403) => TokenErrorKind::InvalidClient,
		_ => TokenErrorKind::Transient,
	}
}

fn match_oauth_error(value: &str) -> Option<TokenErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(TokenErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(TokenErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(TokenErrorKind::Transient)
	} else {
		None
	}
}

/// Token-endpoint client bound to one realm and one OAuth client.
pub(crate) struct TokenFacade {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
}
impl TokenFacade {
	pub(crate) fn new(
		token_url: &Url,
		client_id: &str,
		client_secret: Option<&TokenSecret>,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let token_url = TokenUrl::new(token_url.to_string()).map_err(|source| {
			ConfigError::InvalidEndpoint { url: token_url.to_string(), source }
		})?;
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		if let Some(secret) = client_secret {
			oauth_client =
				oauth_client.set_client_secret(ClientSecret::new(secret.expose().into()));
		}

		Ok(Self { oauth_client, http_client })
	}

	pub(crate) async fn exchange_client_credentials(&self) -> Result<TokenRecord> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::ClientCredentials, meta.take(), err))?;

		map_token_response(response, None)
	}

	pub(crate) async fn exchange_password(
		&self,
		username: &str,
		password: &TokenSecret,
	) -> Result<TokenRecord> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let username = ResourceOwnerUsername::new(username.to_owned());
		let password = ResourceOwnerPassword::new(password.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_password(&username, &password)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::Password, meta.take(), err))?;

		map_token_response(response, None)
	}

	/// Exchanges `refresh_token`; the old secret is kept when no rotation happens.
	pub(crate) async fn refresh_token(&self, refresh_token: &TokenSecret) -> Result<TokenRecord> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::RefreshToken, meta.take(), err))?;

		map_token_response(response, Some(refresh_token))
	}
}

fn map_token_response(
	response: BasicTokenResponse,
	previous_refresh: Option<&TokenSecret>,
) -> Result<TokenRecord> {
	let expires_in = response.expires_in().ok_or(ConfigError::MissingExpiresIn)?.as_secs();
	let expires_in = i64::try_from(expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn.into());
	}

	let mut builder = TokenRecord::builder()
		.access_token(response.access_token().secret().to_owned())
		.issued_at(OffsetDateTime::now_utc())
		.expires_in(Duration::seconds(expires_in));

	match (response.refresh_token(), previous_refresh) {
		(Some(refresh), _) => builder = builder.refresh_token(refresh.secret().to_owned()),
		(None, Some(previous)) => builder = builder.refresh_token(previous.expose()),
		(None, None) => {},
	}

	if let Some(scopes) = response.scopes() {
		let scope = scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ");

		builder = builder.scope(scope);
	}

	builder.build().map_err(|err| ConfigError::from(err).into())
}

fn map_request_error(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(grant, response, meta_ref),
		RequestTokenError::Request(error) => map_transport_error(meta_ref, error),
		RequestTokenError::Parse(error, _body) =>
			TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
				.into(),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint {
			message: format!("{grant} grant failed: {message}"),
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	grant: GrantType,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let code = response.error().as_ref().to_string();
	let message = match response.error_description() {
		Some(description) => format!("{grant} grant failed with {code}: {description}"),
		None => format!("{grant} grant failed with {code}"),
	};

	match classify_token_error(Some(&code), meta_status(meta)) {
		TokenErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		TokenErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		TokenErrorKind::Transient => TransientError::TokenEndpoint {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_transport_error(
	meta: Option<&ResponseMetadata>,
	err: HttpClientError<ReqwestError>,
) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransientError::TokenEndpoint {
			message: format!("HTTP client error occurred while calling the token endpoint: {message}"),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
		_ => TransientError::TokenEndpoint {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

/// Maps a reqwest failure raised outside of any HTTP response.
pub(crate) fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::TokenEndpoint {
			message: "Request timed out while calling Keycloak".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_error_codes_take_precedence_over_status() {
		assert_eq!(
			classify_token_error(Some("invalid_grant"), Some(401)),
			TokenErrorKind::InvalidGrant
		);
		assert_eq!(
			classify_token_error(Some("unauthorized_client"), Some(400)),
			TokenErrorKind::InvalidClient
		);
		assert_eq!(
			classify_token_error(Some("server_error"), Some(400)),
			TokenErrorKind::Transient
		);
	}

	#[test]
	fn unknown_codes_fall_back_to_status() {
		assert_eq!(classify_token_error(Some("weird"), Some(400)), TokenErrorKind::InvalidGrant);
		assert_eq!(classify_token_error(None, Some(401)), TokenErrorKind::InvalidClient);
		assert_eq!(classify_token_error(None, Some(503)), TokenErrorKind::Transient);
		assert_eq!(classify_token_error(None, None), TokenErrorKind::Transient);
	}

	#[test]
	fn builds_facade_with_and_without_secret() {
		let url = Url::parse("https://kc.example.com/realms/master/protocol/openid-connect/token")
			.expect("Token URL fixture should parse.");
		let secret = TokenSecret::new("secret");

		assert!(
			TokenFacade::new(&url, "terraform", Some(&secret), ReqwestHttpClient::default()).is_ok()
		);
		assert!(TokenFacade::new(&url, "admin-cli", None, ReqwestHttpClient::default()).is_ok());
	}
}
