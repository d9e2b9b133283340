//! Token records issued by the realm token endpoint, with lifecycle helpers and builders.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Current lifecycle status for a token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is not yet valid because the issued-at instant is in the future.
	Pending,
	/// Token is currently valid.
	Active,
	/// Token exceeded its expiry instant.
	Expired,
	/// Token was invalidated locally, usually after the admin API answered 401.
	Revoked,
}

/// Errors produced by [`TokenRecordBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenRecordBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Admin token pair cached by [`KeycloakClient`](crate::client::KeycloakClient).
#[derive(Serialize, Deserialize, Clone)]
pub struct TokenRecord {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the grant issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Space-delimited scope string echoed by the token endpoint.
	pub scope: Option<String>,
	/// Issued-at instant recorded when the response arrived.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from issued_at plus expires_in or absolute expiry.
	pub expires_at: OffsetDateTime,
	/// Invalidation instant if the record has been revoked.
	pub revoked_at: Option<OffsetDateTime>,
}
impl TokenRecord {
	/// Upper bound of the preemptive refresh window.
	pub const MAX_PREEMPTIVE_WINDOW: Duration = Duration::seconds(10);

	/// Returns a builder for constructing records.
	pub fn builder() -> TokenRecordBuilder {
		TokenRecordBuilder::default()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if self.revoked_at.is_some() {
			return TokenStatus::Revoked;
		}
		if instant < self.issued_at {
			return TokenStatus::Pending;
		}
		if instant >= self.expires_at {
			return TokenStatus::Expired;
		}

		TokenStatus::Active
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the record is currently active.
	pub fn is_active(&self) -> bool {
		matches!(self.status(), TokenStatus::Active)
	}

	/// Returns `true` if the record has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Returns `true` if the record has been revoked.
	pub fn is_revoked(&self) -> bool {
		self.revoked_at.is_some()
	}

	/// Marks the record as revoked.
	pub fn revoke(&mut self, instant: OffsetDateTime) {
		self.revoked_at = Some(instant);
	}

	/// Total lifetime granted by the token endpoint.
	pub fn lifetime(&self) -> Duration {
		self.expires_at - self.issued_at
	}

	/// Window before expiry in which the record is refreshed early.
	///
	/// Short-lived tokens would otherwise be refreshed on every call, so the window
	/// never exceeds half of the lifetime.
	pub fn preemptive_window(&self) -> Duration {
		let half = self.lifetime() / 2;

		if half < Self::MAX_PREEMPTIVE_WINDOW { half } else { Self::MAX_PREEMPTIVE_WINDOW }
	}

	/// Determines whether the record should be refreshed before use.
	pub fn should_refresh_at(&self, now: OffsetDateTime) -> bool {
		match self.status_at(now) {
			TokenStatus::Active => self.expires_at - now <= self.preemptive_window(),
			TokenStatus::Pending => false,
			TokenStatus::Expired | TokenStatus::Revoked => true,
		}
	}

	/// Returns `true` when a refresh token is available.
	///
	/// Revocation only covers the access token, so a revoked record can still be refreshed.
	pub fn can_refresh(&self) -> bool {
		self.refresh_token.is_some()
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("revoked_at", &self.revoked_at)
			.finish()
	}
}

/// Builder for [`TokenRecord`].
#[derive(Clone, Debug, Default)]
pub struct TokenRecordBuilder {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	scope: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl TokenRecordBuilder {
	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Records the scope string returned with the token.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Consumes the builder and produces a [`TokenRecord`].
	pub fn build(self) -> Result<TokenRecord, TokenRecordBuilderError> {
		let access_token = self.access_token.ok_or(TokenRecordBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(TokenRecordBuilderError::MissingExpiry),
		};

		Ok(TokenRecord {
			access_token,
			refresh_token: self.refresh_token,
			scope: self.scope,
			issued_at,
			expires_at,
			revoked_at: None,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn record(lifetime: Duration) -> TokenRecord {
		TokenRecord::builder()
			.access_token("access")
			.refresh_token("refresh")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(lifetime)
			.build()
			.expect("Token record fixture should build.")
	}

	#[test]
	fn status_transitions_cover_all_states() {
		let mut record = record(Duration::hours(1));

		assert_eq!(record.status_at(macros::datetime!(2024-12-31 23:59 UTC)), TokenStatus::Pending);
		assert_eq!(record.status_at(macros::datetime!(2025-01-01 00:30 UTC)), TokenStatus::Active);
		assert_eq!(record.status_at(macros::datetime!(2025-01-01 01:00 UTC)), TokenStatus::Expired);

		record.revoke(macros::datetime!(2025-01-01 00:10 UTC));

		assert_eq!(record.status_at(macros::datetime!(2025-01-01 00:30 UTC)), TokenStatus::Revoked);
		assert!(record.can_refresh());
	}

	#[test]
	fn preemptive_window_is_capped_and_halved() {
		assert_eq!(record(Duration::minutes(5)).preemptive_window(), Duration::seconds(10));
		assert_eq!(record(Duration::seconds(8)).preemptive_window(), Duration::seconds(4));
	}

	#[test]
	fn refresh_is_requested_inside_the_window() {
		let record = record(Duration::minutes(5));

		assert!(!record.should_refresh_at(macros::datetime!(2025-01-01 00:04:49 UTC)));
		assert!(record.should_refresh_at(macros::datetime!(2025-01-01 00:04:50 UTC)));
		assert!(record.should_refresh_at(macros::datetime!(2025-01-01 00:06 UTC)));
	}

	#[test]
	fn builder_requires_token_and_expiry() {
		assert_eq!(
			TokenRecord::builder().expires_in(Duration::minutes(1)).build().unwrap_err(),
			TokenRecordBuilderError::MissingAccessToken
		);
		assert_eq!(
			TokenRecord::builder().access_token("a").build().unwrap_err(),
			TokenRecordBuilderError::MissingExpiry
		);
	}
}
