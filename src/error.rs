//! Crate-level error types shared by the admin client, API adapters, and provider binding.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure at the token endpoint.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Admin API answered with a non-success status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Admin API payload could not be encoded or decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Token endpoint rejected the grant (bad password or refresh token).
	#[error("Keycloak rejected the grant: {reason}.")]
	InvalidGrant {
		/// Server- or client-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Server- or client-supplied reason string.
		reason: String,
	},
	/// Resource values were rejected before any request was sent.
	#[error("validation error: {message}")]
	Validation {
		/// Human readable description of the rejected value.
		message: String,
	},
	/// Import identifier does not match the expected layout.
	#[error("invalid import. Supported format: {format}")]
	InvalidImport {
		/// Accepted import identifier layout.
		format: &'static str,
	},
	/// Server version is too old for the requested feature.
	#[error("{feature} requires Keycloak {required} or newer, but the server runs {actual}.")]
	Unsupported {
		/// Feature label.
		feature: &'static str,
		/// Minimum supported version.
		required: String,
		/// Version reported by the server.
		actual: String,
	},
}
impl Error {
	/// Builds a [`Error::Validation`] from any displayable message.
	pub fn validation(message: impl Into<String>) -> Self {
		Self::Validation { message: message.into() }
	}

	/// Returns `true` when the admin API reported that the addressed object does not exist.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::Api(ApiError { status: 404, .. }))
	}

	/// Returns the HTTP status code attached to the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(e) => Some(e.status),
			Self::Transient(TransientError::TokenEndpoint { status, .. })
			| Self::Transient(TransientError::TokenResponseParse { status, .. }) => *status,
			_ => None,
		}
	}
}

/// Configuration and validation failures raised before talking to Keycloak.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Client configuration failed validation.
	#[error(transparent)]
	Client(#[from] crate::config::ClientConfigError),
	/// A derived endpoint URL could not be parsed.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidEndpoint {
		/// Offending URL.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token record builder validation failed.
	#[error("Unable to build token record.")]
	TokenBuild(#[from] crate::auth::TokenRecordBuilderError),
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Provider has not been configured yet.
	#[error("Provider must be configured before resources can be managed.")]
	NotConfigured,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants raised by the token endpoint.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Token endpoint returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Server- or client-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling Keycloak.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling Keycloak.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Non-success answer from the admin REST API.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{method} {path} returned {status}: {message}.")]
pub struct ApiError {
	/// HTTP method of the failing request.
	pub method: String,
	/// Admin path of the failing request, relative to the admin base URL.
	pub path: String,
	/// HTTP status code.
	pub status: u16,
	/// Server-supplied error message or a truncated body preview.
	pub message: String,
}

/// Payload encoding and decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body did not match the expected JSON shape.
	#[error("Response from `{path}` does not match the expected shape.")]
	Json {
		/// Admin path the body came from.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request body could not be serialized.
	#[error("Request body for `{path}` could not be serialized.")]
	Encode {
		/// Admin path the body was meant for.
		path: String,
		/// Serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Create call returned no `Location` header to read the new identifier from.
	#[error("Response from `{path}` is missing a Location header.")]
	MissingLocation {
		/// Admin path of the create call.
		path: String,
	},
	/// Component config entry holds a value of the wrong kind.
	#[error("Component config `{key}` holds an invalid value `{value}`.")]
	ComponentConfig {
		/// Config key.
		key: String,
		/// Raw config value.
		value: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn api_error(status: u16) -> Error {
		ApiError {
			method: "GET".into(),
			path: "/realms/test/organizations/1".into(),
			status,
			message: "Could not find organization".into(),
		}
		.into()
	}

	#[test]
	fn not_found_is_detected_from_status() {
		assert!(api_error(404).is_not_found());
		assert!(!api_error(409).is_not_found());
		assert!(!Error::validation("name is required").is_not_found());
		assert_eq!(api_error(409).status(), Some(409));
	}

	#[test]
	fn messages_match_keycloak_provider_wording() {
		assert_eq!(
			Error::validation("one of ClientId or ClientScopeId must be set").to_string(),
			"validation error: one of ClientId or ClientScopeId must be set"
		);
		assert_eq!(
			Error::InvalidImport { format: "{{realm}}/{{organizationId}}" }.to_string(),
			"invalid import. Supported format: {{realm}}/{{organizationId}}"
		);
		assert_eq!(
			api_error(404).to_string(),
			"GET /realms/test/organizations/1 returned 404: Could not find organization."
		);
	}
}
