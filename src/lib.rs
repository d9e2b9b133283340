//! Keycloak admin REST API client for the Terraform provider: token-managed sessions and
//! typed resource adapters.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;

#[cfg(test)]
use terraform_provider_keycloak as _;

#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use reqwest::redirect::Policy;
	// self
	use crate::{
		client::KeycloakClient,
		config::{ClientConfig, ClientConfigBuilder},
		http::ReqwestHttpClient,
	};

	/// Client identifier used by the test helpers.
	pub const TEST_CLIENT_ID: &str = "terraform";
	/// Client secret used by the test helpers.
	pub const TEST_CLIENT_SECRET: &str = "secret";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Client credentials configuration pointing at `url` with lazy login.
	pub fn test_client_config_builder(url: &str) -> ClientConfigBuilder {
		ClientConfig::builder(url)
			.client_id(TEST_CLIENT_ID)
			.client_secret(TEST_CLIENT_SECRET)
			.initial_login(false)
	}

	/// Admin client bound to `url` using the insecure test transport.
	pub fn build_test_client(url: &str) -> KeycloakClient {
		build_test_client_with(test_client_config_builder(url))
	}

	/// Admin client built from a caller-tuned configuration builder.
	pub fn build_test_client_with(builder: ClientConfigBuilder) -> KeycloakClient {
		let config = builder.build().expect("Test client configuration should be valid.");

		KeycloakClient::with_http_client(config, test_reqwest_http_client())
			.expect("Test client should build.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
