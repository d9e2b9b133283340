//! Admin token acquisition with caching, preemptive refresh, and singleflight guards.
//!
//! [`KeycloakClient::access_token`] hands out the cached token while it is active
//! and outside its preemptive window (`min(10s, lifetime / 2)`). Otherwise the
//! caller takes the login guard, re-checks the cache (another caller may have
//! refreshed in the meantime), and runs [`KeycloakClient::refresh`]. Refreshing
//! prefers the refresh token and falls back to a full login when Keycloak rejects
//! it with `invalid_grant` or when no refresh token is cached.

// self
use crate::{
	_prelude::*,
	auth::{TokenRecord, TokenSecret},
	client::KeycloakClient,
	config::Credentials,
	error::ConfigError,
	obs::{self, RequestKind, RequestOutcome, RequestSpan},
	oauth::TokenFacade,
};

impl KeycloakClient {
	/// Returns a bearer token that is valid for the next admin request.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		if let Credentials::AccessToken { token } = &self.config.credentials {
			return Ok(token.clone());
		}
		if let Some(token) = self.fresh_token(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.login_guard.lock().await;

		if let Some(token) = self.fresh_token(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		Ok(self.refresh_locked().await?.access_token)
	}

	/// Runs the configured grant and caches the resulting token.
	pub async fn login(&self) -> Result<TokenRecord> {
		let _singleflight = self.login_guard.lock().await;

		self.login_locked().await
	}

	/// Refreshes the cached token, falling back to [`KeycloakClient::login`] when needed.
	pub async fn refresh(&self) -> Result<TokenRecord> {
		let _singleflight = self.login_guard.lock().await;

		self.refresh_locked().await
	}

	/// Marks the cached access token as unusable; the refresh token stays available.
	pub fn invalidate_token(&self) {
		if let Some(record) = self.token.write().as_mut() {
			record.revoke(OffsetDateTime::now_utc());
		}
	}

	pub(crate) fn has_static_token(&self) -> bool {
		matches!(self.config.credentials, Credentials::AccessToken { .. })
	}

	fn fresh_token(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		self.token
			.read()
			.as_ref()
			.filter(|record| !record.should_refresh_at(now))
			.map(|record| record.access_token.clone())
	}

	async fn login_locked(&self) -> Result<TokenRecord> {
		const KIND: RequestKind = RequestKind::Login;

		let span = RequestSpan::new(KIND, "login");

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);

		let result: Result<TokenRecord> = span
			.instrument(async {
				let facade = self.facade()?;
				let record = match &self.config.credentials {
					Credentials::Password { username, password, .. } =>
						facade.exchange_password(username, password).await?,
					_ => facade.exchange_client_credentials().await?,
				};

				self.metrics.record_login();
				*self.token.write() = Some(record.clone());

				Ok(record)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	async fn refresh_locked(&self) -> Result<TokenRecord> {
		const KIND: RequestKind = RequestKind::Refresh;

		let cached = self
			.token
			.read()
			.as_ref()
			.filter(|record| record.can_refresh())
			.and_then(|record| record.refresh_token.clone());
		let Some(refresh_token) = cached else {
			return self.login_locked().await;
		};
		let span = RequestSpan::new(KIND, "refresh");

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);

		let result = span.instrument(self.facade()?.refresh_token(&refresh_token)).await;

		obs::record_result(KIND, &result);

		match result {
			Ok(record) => {
				self.metrics.record_refresh();
				*self.token.write() = Some(record.clone());

				Ok(record)
			},
			Err(Error::InvalidGrant { .. }) => {
				#[cfg(feature = "tracing")]
				tracing::debug!("Refresh token rejected; logging in again.");

				self.login_locked().await
			},
			Err(err) => Err(err),
		}
	}

	fn facade(&self) -> Result<&TokenFacade> {
		self.facade.as_ref().ok_or_else(|| {
			Error::from(ConfigError::Client(crate::config::ClientConfigError::MissingCredentials))
		})
	}
}
